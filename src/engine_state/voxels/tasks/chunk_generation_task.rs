//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which runs a generator for one
//! chunk position. The task only produces the chunk; inserting it into the
//! world, linking neighbors and queueing meshes happens when the result is
//! applied on the world's thread.

use std::sync::Arc;

use crate::{
    engine_state::{
        task_management::task::{Task, TaskResult},
        voxels::{
            block::block_bank::BlockBank,
            chunk::{Chunk, ChunkPosition},
            generation::Generator,
            world::World,
        },
    },
    error::Result,
};

/// A task that generates chunk data off the world's thread.
pub struct ChunkGenerationTask {
    /// The position of the chunk to generate (in chunk coordinates)
    position: ChunkPosition,
    /// Identifies this request; the world ignores results whose ticket it no longer expects
    ticket: u64,
    generator: Arc<dyn Generator>,
    bank: Arc<BlockBank>,
}

impl ChunkGenerationTask {
    pub fn new(
        position: ChunkPosition,
        ticket: u64,
        generator: Arc<dyn Generator>,
        bank: Arc<BlockBank>,
    ) -> Self {
        ChunkGenerationTask {
            position,
            ticket,
            generator,
            bank,
        }
    }
}

impl Task for ChunkGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        Box::new(ChunkGenerationTaskResult {
            position: self.position,
            ticket: self.ticket,
            chunk: self.generator.generate_chunk_at(self.position, &self.bank),
        })
    }
}

/// The result of a chunk generation task.
pub struct ChunkGenerationTaskResult {
    position: ChunkPosition,
    ticket: u64,
    chunk: Result<Chunk>,
}

impl TaskResult for ChunkGenerationTaskResult {
    fn apply(self: Box<Self>, world: &mut World) {
        let ChunkGenerationTaskResult {
            position,
            ticket,
            chunk,
        } = *self;
        world.insert_generated(position, ticket, chunk);
    }
}
