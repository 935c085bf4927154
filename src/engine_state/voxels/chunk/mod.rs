//! # Chunk Module
//!
//! This module provides the `Chunk` struct and related functionality for managing
//! 16x16x16 blocks of voxel data: addressing, bounds-checked access, the links to
//! the six adjacent chunks, and the per-chunk pipeline state the world drives.
//!
//! ## Addressing
//!
//! Blocks are stored in a flat array in row-major order with X varying fastest,
//! then Z, then Y:
//!
//! ```text
//! index = x + z * CHUNK_WIDTH + y * CHUNK_PLANE_SIZE
//! ```
//!
//! Any coordinate outside the chunk reads back as [`Block::NIL`]. The mesher relies
//! on this to treat the chunk edge like any other empty neighbor.
//!
//! ## Coordinates
//!
//! Chunk positions are in chunk-grid units. The world-space origin of a chunk is
//! `position * chunk dimension`, and a world position maps back to its chunk with
//! floor division, so `-0.5` lands in chunk `-1`, not chunk `0`.

use cgmath::Point3;

use super::block::{block_side::BlockSide, Block};
use crate::engine_state::rendering::{meshing::MeshData, renderer::MeshHandle};

mod chunk_creation;
pub mod chunk_iteration;
mod neighbors;

pub use chunk_creation::ChunkBuilder;
pub use chunk_iteration::ChunkBlockIterator;
pub use neighbors::{attach_neighbors, detach_neighbors, ChunkNeighbors};

/// Number of blocks along the X axis.
pub const CHUNK_WIDTH: usize = 16;
/// Number of blocks along the Y axis.
pub const CHUNK_HEIGHT: usize = 16;
/// Number of blocks along the Z axis.
pub const CHUNK_DEPTH: usize = 16;
/// The number of blocks in a single horizontal (XZ) plane of a chunk.
pub const CHUNK_PLANE_SIZE: usize = CHUNK_WIDTH * CHUNK_DEPTH;
/// The total number of blocks in a chunk.
pub const CHUNK_SIZE: usize = CHUNK_PLANE_SIZE * CHUNK_HEIGHT;

/// Integer triple identifying a chunk in chunk-grid units.
pub type ChunkPosition = Point3<i32>;

/// Maps a continuous world-space position to the chunk containing it.
///
/// Uses floor division on every axis so negative coordinates land in the chunk
/// below zero rather than being truncated toward the origin.
pub fn chunk_position_of(world_position: Point3<f32>) -> ChunkPosition {
    Point3::new(
        (world_position.x / CHUNK_WIDTH as f32).floor() as i32,
        (world_position.y / CHUNK_HEIGHT as f32).floor() as i32,
        (world_position.z / CHUNK_DEPTH as f32).floor() as i32,
    )
}

/// The world-space block coordinate of a chunk's `(0, 0, 0)` corner.
pub fn world_origin(position: ChunkPosition) -> Point3<i32> {
    Point3::new(
        position.x * CHUNK_WIDTH as i32,
        position.y * CHUNK_HEIGHT as i32,
        position.z * CHUNK_DEPTH as i32,
    )
}

/// The position of the chunk adjacent to `position` across `side`.
pub fn neighbor_position(position: ChunkPosition, side: BlockSide) -> ChunkPosition {
    position + side.offset()
}

/// Where a chunk is in the generate → mesh → upload pipeline.
///
/// A chunk that has been removed from the world has no state of its own: its
/// mesh handle sits in the world's unload queue until the next update disposes it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChunkState {
    /// Voxels populated, no mesh requested or the last mesh came back empty.
    Generated,
    /// Queued for (re)meshing.
    MeshPending,
    /// Mesh data computed and waiting for an upload slot.
    MeshReady,
    /// Uploaded and drawable.
    Renderable,
}

/// Represents a 16x16x16 collection of voxel blocks in the world.
///
/// Besides the voxels a chunk carries the opaque handle of its uploaded mesh,
/// mesh data waiting for upload, weak links to its six neighbors, and the stamps
/// the world uses to discard stale results from worker tasks.
pub struct Chunk {
    position: ChunkPosition,
    blocks: Box<[Block]>,
    pub(crate) mesh: Option<MeshHandle>,
    pub(crate) pending_mesh_data: Option<MeshData>,
    pub(crate) neighbors: ChunkNeighbors,
    pub(crate) state: ChunkState,
    /// Identifies this chunk instance; a chunk regenerated at the same position gets a new stamp.
    pub(crate) stamp: u64,
    /// Bumped every time the chunk is queued for meshing.
    pub(crate) mesh_revision: u64,
}

impl Chunk {
    /// Creates a chunk with every block set to [`Block::NIL`].
    pub fn new(position: ChunkPosition) -> Self {
        Self::from_blocks(position, vec![Block::NIL; CHUNK_SIZE].into_boxed_slice())
    }

    /// Wraps an already populated block array.
    ///
    /// Arrays of the wrong length are padded with nil blocks or truncated.
    pub(crate) fn from_blocks(position: ChunkPosition, blocks: Box<[Block]>) -> Self {
        let blocks = if blocks.len() == CHUNK_SIZE {
            blocks
        } else {
            let mut resized = blocks.into_vec();
            resized.resize(CHUNK_SIZE, Block::NIL);
            resized.into_boxed_slice()
        };

        Chunk {
            position,
            blocks,
            mesh: None,
            pending_mesh_data: None,
            neighbors: ChunkNeighbors::default(),
            state: ChunkState::Generated,
            stamp: 0,
            mesh_revision: 0,
        }
    }

    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub fn position(&self) -> ChunkPosition {
        self.position
    }

    /// Linearizes a local coordinate. Callers must pass in-range coordinates.
    #[inline]
    pub fn index_at(x: usize, y: usize, z: usize) -> usize {
        x + z * CHUNK_WIDTH + y * CHUNK_PLANE_SIZE
    }

    /// Returns `true` if the local coordinate lies inside the chunk.
    #[inline]
    pub fn in_bounds(x: i32, y: i32, z: i32) -> bool {
        (0..CHUNK_WIDTH as i32).contains(&x)
            && (0..CHUNK_HEIGHT as i32).contains(&y)
            && (0..CHUNK_DEPTH as i32).contains(&z)
    }

    /// Gets the block at the specified chunk-relative coordinates.
    ///
    /// # Returns
    /// The stored block, or [`Block::NIL`] for any coordinate outside
    /// `[0, CHUNK_WIDTH) x [0, CHUNK_HEIGHT) x [0, CHUNK_DEPTH)`. Never panics.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> Block {
        if Self::in_bounds(x, y, z) {
            self.blocks[Self::index_at(x as usize, y as usize, z as usize)]
        } else {
            Block::NIL
        }
    }

    /// Writes the block at the specified chunk-relative coordinates.
    ///
    /// # Returns
    /// `false` (and no write) when the coordinate is out of range.
    pub fn set(&mut self, x: i32, y: i32, z: i32, block: Block) -> bool {
        if !Self::in_bounds(x, y, z) {
            return false;
        }
        self.blocks[Self::index_at(x as usize, y as usize, z as usize)] = block;
        true
    }

    /// The raw block array in index order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Mutable access to the raw block array, for direct writes at [`Chunk::index_at`].
    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    /// Iterates the active blocks together with their local positions.
    pub fn iter_active(&self) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(self)
    }

    pub fn active_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.active()).count()
    }

    /// `true` when no block in the chunk is active.
    pub fn is_empty(&self) -> bool {
        !self.blocks.iter().any(|b| b.active())
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    /// The handle of the currently uploaded mesh, if any.
    pub fn mesh(&self) -> Option<MeshHandle> {
        self.mesh
    }

    pub fn pending_mesh_data(&self) -> Option<&MeshData> {
        self.pending_mesh_data.as_ref()
    }

    pub fn neighbors(&self) -> &ChunkNeighbors {
        &self.neighbors
    }
}
