//! # Chunk Iteration Module
//!
//! This module provides an iterator over the active blocks of a chunk. Meshers use
//! it to skip empty space without decoding every slot themselves.

use cgmath::Point3;

use crate::engine_state::voxels::block::Block;

use super::{Chunk, CHUNK_PLANE_SIZE, CHUNK_SIZE, CHUNK_WIDTH};

/// An iterator over all active blocks in a chunk.
///
/// Yields `(local_position, block)` pairs in storage order (X fastest, then Z,
/// then Y).
pub struct ChunkBlockIterator<'a> {
    /// Reference to the chunk being iterated over
    chunk_ref: &'a Chunk,
    /// Next storage index to inspect
    current_offset: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` positioned before the first block.
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        ChunkBlockIterator {
            chunk_ref,
            current_offset: 0,
        }
    }

    fn position_of(offset: usize) -> Point3<usize> {
        let y = offset / CHUNK_PLANE_SIZE;
        let in_plane = offset % CHUNK_PLANE_SIZE;
        Point3::new(in_plane % CHUNK_WIDTH, y, in_plane / CHUNK_WIDTH)
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (Point3<usize>, Block);

    fn next(&mut self) -> Option<Self::Item> {
        let blocks = self.chunk_ref.blocks();
        while self.current_offset < CHUNK_SIZE {
            let offset = self.current_offset;
            self.current_offset += 1;

            let block = blocks[offset];
            if block.active() {
                return Some((Self::position_of(offset), block));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(CHUNK_SIZE - self.current_offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yields_only_active_blocks() {
        let mut chunk = Chunk::new(Point3::new(0, 0, 0));
        chunk.set(1, 2, 3, Block::new(5, true));
        chunk.set(15, 15, 15, Block::new(6, true));
        chunk.set(4, 4, 4, Block::new(7, false));

        let found: Vec<_> = chunk.iter_active().collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], (Point3::new(1, 2, 3), Block::new(5, true)));
        assert_eq!(found[1], (Point3::new(15, 15, 15), Block::new(6, true)));
    }

    #[test]
    fn test_positions_round_trip_index() {
        for offset in [0, 1, 17, 255, 256, 1000, CHUNK_SIZE - 1] {
            let p = ChunkBlockIterator::position_of(offset);
            assert_eq!(Chunk::index_at(p.x, p.y, p.z), offset);
        }
    }
}
