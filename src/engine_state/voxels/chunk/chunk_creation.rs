//! # Chunk Creation Module
//!
//! This module provides a builder for populating a chunk in one pass. Generators
//! push blocks in storage order and the builder keeps track of the local position
//! of the next slot, so they never have to compute indices themselves.

use cgmath::Point3;

use crate::engine_state::voxels::block::Block;

use super::{Chunk, ChunkPosition, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_SIZE, CHUNK_WIDTH};

/// A builder for efficiently creating and populating chunks.
///
/// Blocks are pushed in the same order the chunk stores them: X varies fastest,
/// then Z, then Y. Slots that are never pushed stay [`Block::NIL`].
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_world::{Block, ChunkBuilder};
///
/// let mut builder = ChunkBuilder::new(Point3::new(0, 0, 0));
/// while let Some(local) = builder.next_position() {
///     builder.push_block(Block::new(1, local.y <= local.x));
/// }
/// let chunk = builder.return_chunk();
/// assert!(chunk.get(3, 2, 0).active());
/// ```
pub struct ChunkBuilder {
    /// The chunk position of the chunk being created
    position: ChunkPosition,
    /// Blocks pushed so far, in storage order
    blocks: Vec<Block>,
    /// Local position of the next slot
    local_x: usize,
    local_y: usize,
    local_z: usize,
}

impl ChunkBuilder {
    /// Creates a new builder for a chunk at the given chunk position.
    pub fn new(position: ChunkPosition) -> Self {
        ChunkBuilder {
            position,
            blocks: Vec::with_capacity(CHUNK_SIZE),
            local_x: 0,
            local_y: 0,
            local_z: 0,
        }
    }

    /// The chunk position of the chunk being built.
    pub fn position(&self) -> ChunkPosition {
        self.position
    }

    /// Local position the next pushed block will land on, or `None` once the chunk is full.
    pub fn next_position(&self) -> Option<Point3<usize>> {
        if self.blocks.len() >= CHUNK_SIZE {
            return None;
        }
        Some(Point3::new(self.local_x, self.local_y, self.local_z))
    }

    /// Adds a block at the current position and advances the position.
    ///
    /// # Returns
    /// `false` if the chunk is already full and the block was dropped.
    pub fn push_block(&mut self, block: Block) -> bool {
        if self.blocks.len() >= CHUNK_SIZE {
            return false;
        }
        self.blocks.push(block);

        self.local_x += 1;
        if self.local_x == CHUNK_WIDTH {
            self.local_x = 0;
            self.local_z += 1;

            if self.local_z == CHUNK_DEPTH {
                self.local_z = 0;
                self.local_y += 1;
                debug_assert!(self.local_y <= CHUNK_HEIGHT);
            }
        }
        true
    }

    /// Finalizes the chunk creation and returns the constructed `Chunk`.
    pub fn return_chunk(self) -> Chunk {
        Chunk::from_blocks(self.position, self.blocks.into_boxed_slice())
    }
}
