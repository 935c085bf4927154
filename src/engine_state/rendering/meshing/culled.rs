//! # Culled Meshing
//!
//! Emits one quad per visible block face. A face is visible when the block it
//! looks at is absent or inactive; blocks across the chunk boundary are read
//! from the neighbor chunks, and a missing neighbor chunk counts as empty.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::engine_state::voxels::{
    block::{block_bank::BlockBank, block_side::BlockSide, block_type::BlockType, Block, BlockTypeId},
    chunk::{world_origin, Chunk, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH},
};

use super::{Face, MeshData, Mesher, NeighborLookup, QUAD_INDICES};

/// Floor for the face estimate, about one exposed chunk side.
const MIN_FACE_ESTIMATE: usize = CHUNK_WIDTH * CHUNK_DEPTH;

/// Neighbor-aware face-culling mesher.
pub struct CulledMesher {
    /// Face count of the last chunk meshed, used to pre-size the next buffers.
    face_estimate: AtomicUsize,
    /// Unregistered type ids already reported.
    warned_types: Mutex<HashSet<BlockTypeId>>,
}

impl Default for CulledMesher {
    fn default() -> Self {
        Self::new()
    }
}

impl CulledMesher {
    pub fn new() -> Self {
        CulledMesher {
            face_estimate: AtomicUsize::new(MIN_FACE_ESTIMATE),
            warned_types: Mutex::new(HashSet::new()),
        }
    }

    /// Resolves the block one step across `side` from local `(x, y, z)`.
    ///
    /// # Returns
    /// `None` when the position falls in a neighbor chunk that does not exist.
    fn adjacent_block(
        chunk: &Chunk,
        neighbors: &dyn NeighborLookup,
        x: i32,
        y: i32,
        z: i32,
        side: BlockSide,
    ) -> Option<Block> {
        let offset = side.offset();
        let (nx, ny, nz) = (x + offset.x, y + offset.y, z + offset.z);
        if Chunk::in_bounds(nx, ny, nz) {
            return Some(chunk.get(nx, ny, nz));
        }

        neighbors.neighbor_block(
            side,
            nx.rem_euclid(CHUNK_WIDTH as i32) as usize,
            ny.rem_euclid(CHUNK_HEIGHT as i32) as usize,
            nz.rem_euclid(CHUNK_DEPTH as i32) as usize,
        )
    }

    fn resolve_type<'b>(&self, block: Block, bank: &'b BlockBank) -> Option<&'b BlockType> {
        let block_type = bank.type_of(block);
        if block_type.is_none() {
            let mut warned = self.warned_types.lock().unwrap_or_else(PoisonError::into_inner);
            if warned.insert(block.type_id()) {
                log::warn!(
                    "Block type {} is not registered, its faces are skipped",
                    block.type_id()
                );
            }
        }
        block_type
    }

    fn push_face(data: &mut MeshData, face: &Face, block_type: &BlockType) {
        let first = data.vertex_count() as u32;
        let normal = face.block_side.normal();
        let color = block_type.color().to_array();
        let uvs = block_type
            .region_for(face.block_side)
            .map(|region| region.uvs)
            .unwrap_or([[0.0; 2]; 4]);

        for (corner, uv) in face.corners().into_iter().zip(uvs) {
            data.positions.extend_from_slice(&[corner.x, corner.y, corner.z]);
            data.normals.extend_from_slice(&normal);
            data.uvs.extend_from_slice(&uv);
            data.colors.extend_from_slice(&color);
        }
        data.indices.extend(QUAD_INDICES.iter().map(|i| first + i));
    }
}

impl Mesher for CulledMesher {
    fn generate(
        &self,
        chunk: &Chunk,
        neighbors: &dyn NeighborLookup,
        bank: &BlockBank,
    ) -> Option<MeshData> {
        let active = chunk.active_count();
        if active == 0 {
            return None;
        }

        let estimate = self.face_estimate.load(Ordering::Relaxed).max(MIN_FACE_ESTIMATE);
        let mut data = MeshData::with_face_capacity(estimate.min(active * 6));
        let origin = world_origin(chunk.position());

        for (local, block) in chunk.iter_active() {
            let Some(block_type) = self.resolve_type(block, bank) else {
                continue;
            };
            let (x, y, z) = (local.x as i32, local.y as i32, local.z as i32);

            for side in BlockSide::all() {
                let occluded = Self::adjacent_block(chunk, neighbors, x, y, z, side)
                    .is_some_and(Block::active);
                if occluded {
                    continue;
                }

                let face = Face::new(
                    (origin.x + x) as f32,
                    (origin.y + y) as f32,
                    (origin.z + z) as f32,
                    side,
                );
                Self::push_face(&mut data, &face, block_type);
            }
        }

        self.face_estimate.store(data.face_count(), Ordering::Relaxed);

        if data.is_empty() {
            None
        } else {
            Some(data)
        }
    }

    fn name(&self) -> &'static str {
        "culled"
    }
}
