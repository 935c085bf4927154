//! Renderer collaborator boundary.
//!
//! The world never touches GPU objects. It hands finished [`MeshData`] to a
//! [`MeshRenderer`] and keeps the opaque [`MeshHandle`] it gets back, which it
//! later passes to `draw` or `dispose`. [`HeadlessRenderer`] implements the
//! trait without a device, recording what it was asked to do.

use std::collections::{HashMap, HashSet};

use crate::engine_state::voxels::chunk::ChunkPosition;
use crate::error::{Result, VoxelError};

use super::meshing::MeshData;

/// Opaque reference to a mesh owned by the renderer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(u64);

impl MeshHandle {
    pub const fn new(id: u64) -> Self {
        MeshHandle(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }
}

/// The rendering side of the pipeline. Only ever called from the thread that
/// drives [`World::update`](crate::engine_state::voxels::world::World::update).
pub trait MeshRenderer {
    /// Creates GPU resources for `data` and returns their handle.
    fn upload(&mut self, position: ChunkPosition, data: MeshData) -> Result<MeshHandle>;

    /// Releases the resources behind `handle`. Unknown handles are ignored.
    fn dispose(&mut self, handle: MeshHandle);

    /// Issues the draw for `handle`.
    fn draw(&mut self, handle: MeshHandle);
}

#[derive(Clone, Debug)]
struct LiveMesh {
    position: ChunkPosition,
    faces: usize,
}

/// Device-less renderer that keeps books instead of buffers.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    next_id: u64,
    live: HashMap<MeshHandle, LiveMesh>,
    rejected: HashSet<ChunkPosition>,
    uploads: usize,
    disposals: usize,
    draws: usize,
    uploaded_faces: usize,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every future upload for `position` fail, to simulate a device error.
    pub fn reject_uploads_for(&mut self, position: ChunkPosition) {
        self.rejected.insert(position);
    }

    /// Number of meshes currently alive.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, handle: MeshHandle) -> bool {
        self.live.contains_key(&handle)
    }

    /// Chunk position a live handle was uploaded for.
    pub fn position_of(&self, handle: MeshHandle) -> Option<ChunkPosition> {
        self.live.get(&handle).map(|mesh| mesh.position)
    }

    /// Total faces across all live meshes.
    pub fn live_faces(&self) -> usize {
        self.live.values().map(|mesh| mesh.faces).sum()
    }

    pub fn uploads(&self) -> usize {
        self.uploads
    }

    pub fn disposals(&self) -> usize {
        self.disposals
    }

    pub fn draws(&self) -> usize {
        self.draws
    }

    /// Faces uploaded over the renderer's lifetime, disposed meshes included.
    pub fn uploaded_faces(&self) -> usize {
        self.uploaded_faces
    }
}

impl MeshRenderer for HeadlessRenderer {
    fn upload(&mut self, position: ChunkPosition, data: MeshData) -> Result<MeshHandle> {
        if self.rejected.contains(&position) {
            return Err(VoxelError::Upload {
                position,
                reason: "upload rejected by renderer".to_string(),
            });
        }

        self.next_id += 1;
        let handle = MeshHandle::new(self.next_id);
        let faces = data.face_count();

        self.live.insert(handle, LiveMesh { position, faces });
        self.uploads += 1;
        self.uploaded_faces += faces;
        Ok(handle)
    }

    fn dispose(&mut self, handle: MeshHandle) {
        if self.live.remove(&handle).is_some() {
            self.disposals += 1;
        } else {
            log::debug!("Ignoring dispose of unknown mesh {}", handle.id());
        }
    }

    fn draw(&mut self, handle: MeshHandle) {
        if self.live.contains_key(&handle) {
            self.draws += 1;
        }
    }
}
