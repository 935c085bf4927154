//! # Block Side Module
//!
//! This module defines the different faces/sides of a voxel block.
//! The mesher walks these to decide which faces are visible, and the world uses
//! them to address the six chunks adjacent to a chunk.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// Each variant corresponds to a specific face and is assigned a unique integer value
/// so it can index per-side tables directly.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[allow(clippy::upper_case_acronyms)]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// The unit step from a block to the block this face looks at.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
        }
    }

    /// The outward face normal.
    pub fn normal(self) -> [f32; 3] {
        let offset = self.offset();
        [offset.x as f32, offset.y as f32, offset.z as f32]
    }

    /// The face pointing the other way.
    ///
    /// When chunk A links B as its LEFT neighbor, B links A as its RIGHT neighbor.
    pub fn opposite(self) -> BlockSide {
        match self {
            BlockSide::FRONT => BlockSide::BACK,
            BlockSide::BACK => BlockSide::FRONT,
            BlockSide::BOTTOM => BlockSide::TOP,
            BlockSide::TOP => BlockSide::BOTTOM,
            BlockSide::LEFT => BlockSide::RIGHT,
            BlockSide::RIGHT => BlockSide::LEFT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposites_cancel() {
        for side in BlockSide::all() {
            assert_eq!(side.opposite().opposite(), side);
            assert_eq!(side.offset() + side.opposite().offset(), Vector3::new(0, 0, 0));
        }
    }

    #[test]
    fn test_discriminants_index_all() {
        for (i, side) in BlockSide::all().into_iter().enumerate() {
            assert_eq!(side as usize, i);
        }
    }
}
