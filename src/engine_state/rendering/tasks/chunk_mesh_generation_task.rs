//! Task for generating mesh data for chunks in a background thread.
//!
//! The task reads the chunk through a shared read guard and its neighbors
//! through a boundary snapshot captured when the task was created, so the
//! worker never locks more than the one chunk it meshes.

use std::sync::Arc;

use crate::{
    core::MtResource,
    engine_state::{
        rendering::meshing::{ChunkNeighborhood, MeshData, Mesher},
        task_management::task::{Task, TaskResult},
        voxels::{
            block::block_bank::BlockBank,
            chunk::{Chunk, ChunkPosition},
            world::World,
        },
    },
};

/// A task that generates mesh data for a chunk in a background thread.
pub struct ChunkMeshGenerationTask {
    /// The chunk that needs mesh generation
    chunk: MtResource<Chunk>,
    position: ChunkPosition,
    /// Chunk stamp and mesh revision at the time the task was created
    stamp: u64,
    revision: u64,
    neighborhood: ChunkNeighborhood,
    mesher: Arc<dyn Mesher>,
    bank: Arc<BlockBank>,
}

impl ChunkMeshGenerationTask {
    /// Creates a task for `chunk`, capturing its neighbors' boundary planes now.
    pub fn new(chunk: MtResource<Chunk>, mesher: Arc<dyn Mesher>, bank: Arc<BlockBank>) -> Self {
        let (position, stamp, revision, neighborhood) = {
            let guard = chunk.get();
            (
                guard.position(),
                guard.stamp,
                guard.mesh_revision,
                ChunkNeighborhood::capture(&guard),
            )
        };

        ChunkMeshGenerationTask {
            chunk,
            position,
            stamp,
            revision,
            neighborhood,
            mesher,
            bank,
        }
    }
}

impl Task for ChunkMeshGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let mesh = self
            .mesher
            .generate(&self.chunk.get(), &self.neighborhood, &self.bank);

        Box::new(ChunkMeshGenerationTaskResult {
            position: self.position,
            stamp: self.stamp,
            revision: self.revision,
            mesh,
        })
    }
}

/// Mesh data for one chunk, tagged with the stamps it was computed against.
pub struct ChunkMeshGenerationTaskResult {
    position: ChunkPosition,
    stamp: u64,
    revision: u64,
    mesh: Option<MeshData>,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    fn apply(self: Box<Self>, world: &mut World) {
        let ChunkMeshGenerationTaskResult {
            position,
            stamp,
            revision,
            mesh,
        } = *self;
        world.accept_mesh(position, stamp, revision, mesh);
    }
}
