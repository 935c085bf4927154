//! # Block Type Module
//!
//! This module defines how a block type looks: either three texture regions
//! (top, bottom, sides) or a flat color. Block types are registered once in a
//! [`BlockBank`](super::block_bank::BlockBank) and never change afterwards.

use serde::{Deserialize, Serialize};

use super::{block_side::BlockSide, BlockTypeId};

/// An RGBA color with float channels in `0.0..=1.0`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Color = Color::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);
    pub const TEAL: Color = Color::new(0.5, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color { r, g, b, a }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// A rectangular region of a texture atlas.
///
/// Stores the UV coordinates of the four corners in the same order the mesher
/// emits face vertices, so a region can be appended to a face verbatim.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextureRegion {
    pub uvs: [[f32; 2]; 4],
}

impl TextureRegion {
    /// Builds a region from its lower-left `(u0, v0)` and upper-right `(u1, v1)` corners.
    pub fn from_bounds(u0: f32, v0: f32, u1: f32, v1: f32) -> Self {
        TextureRegion {
            uvs: [[u0, v1], [u1, v1], [u1, v0], [u0, v0]],
        }
    }
}

/// The visual definition of a block type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BlockAppearance {
    /// Three texture regions: one for the top face, one for the bottom, one shared by the four sides.
    Textured {
        top: TextureRegion,
        bottom: TextureRegion,
        side: TextureRegion,
    },
    /// A single flat color on every face.
    Color(Color),
}

/// Describes one voxel type's visual faces, keyed by a small integer id.
///
/// # Examples
///
/// ```
/// use voxel_world::{BlockType, Color};
///
/// let grass = BlockType::colored(2, Color::GREEN);
/// assert_eq!(grass.color(), Color::GREEN);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockType {
    /// Id stored in the low 7 bits of every block of this type.
    pub id: BlockTypeId,
    pub appearance: BlockAppearance,
}

impl BlockType {
    pub fn textured(
        id: BlockTypeId,
        top: TextureRegion,
        bottom: TextureRegion,
        side: TextureRegion,
    ) -> Self {
        BlockType {
            id,
            appearance: BlockAppearance::Textured { top, bottom, side },
        }
    }

    pub fn colored(id: BlockTypeId, color: Color) -> Self {
        BlockType {
            id,
            appearance: BlockAppearance::Color(color),
        }
    }

    /// The texture region to use for a face, or `None` for flat-colored types.
    pub fn region_for(&self, side: BlockSide) -> Option<&TextureRegion> {
        match &self.appearance {
            BlockAppearance::Textured { top, bottom, side: sides } => Some(match side {
                BlockSide::TOP => top,
                BlockSide::BOTTOM => bottom,
                _ => sides,
            }),
            BlockAppearance::Color(_) => None,
        }
    }

    /// The vertex color for this type. Textured types are tinted white.
    pub fn color(&self) -> Color {
        match &self.appearance {
            BlockAppearance::Color(color) => *color,
            BlockAppearance::Textured { .. } => Color::WHITE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_textured_regions_per_side() {
        let top = TextureRegion::from_bounds(0.0, 0.0, 0.5, 0.5);
        let bottom = TextureRegion::from_bounds(0.5, 0.0, 1.0, 0.5);
        let side = TextureRegion::from_bounds(0.0, 0.5, 0.5, 1.0);
        let grass = BlockType::textured(2, top, bottom, side);

        assert_eq!(grass.region_for(BlockSide::TOP), Some(&top));
        assert_eq!(grass.region_for(BlockSide::BOTTOM), Some(&bottom));
        for s in [BlockSide::FRONT, BlockSide::BACK, BlockSide::LEFT, BlockSide::RIGHT] {
            assert_eq!(grass.region_for(s), Some(&side));
        }
        assert_eq!(grass.color(), Color::WHITE);
    }

    #[test]
    fn test_colored_has_no_regions() {
        let brick = BlockType::colored(1, Color::RED);
        assert!(brick.region_for(BlockSide::TOP).is_none());
        assert_eq!(brick.color().to_array(), [1.0, 0.0, 0.0, 1.0]);
    }
}
