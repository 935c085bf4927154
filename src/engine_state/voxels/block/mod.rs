//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel engine.
//! It includes the packed per-voxel `Block`, block face handling, block type
//! definitions and the `BlockBank` registry that maps type ids to definitions.

use block_type::BlockType;

pub mod block_bank;
pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block type ids.
pub type BlockTypeId = u8;

/// Type id reserved for "no block". Never registered, never rendered.
pub const BLOCK_NIL: BlockTypeId = 0x00;

/// Highest type id that fits the 7 type bits of a packed block.
pub const MAX_BLOCK_TYPE_ID: BlockTypeId = 0x7F;

const BLOCK_ACTIVE_MASK: u8 = 0x80;
const BLOCK_TYPE_MASK: u8 = 0x7F;

/// Represents a single voxel block in the world.
///
/// The whole voxel state is packed into one byte: the high bit is the active
/// flag and the low 7 bits are the block type id.
///
/// # Memory Layout
/// `#[repr(transparent)]` over a `u8` keeps a chunk's voxel array a flat byte
/// buffer that can be cast with `bytemuck`.
///
/// Every operation is a pure value transformation:
///
/// ```
/// use voxel_world::Block;
///
/// let block = Block::NIL.with_type(3).activate(true);
/// assert!(block.active());
/// assert_eq!(block.type_id(), 3);
///
/// // Deactivating also clears the type.
/// let cleared = block.activate(false);
/// assert!(!cleared.active());
/// assert_eq!(cleared.type_id(), 0);
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct Block(u8);

impl Block {
    /// The "no block" sentinel: inactive, type 0.
    pub const NIL: Block = Block(BLOCK_NIL);

    /// Creates a block with the given type id and active flag.
    ///
    /// Type ids above [`MAX_BLOCK_TYPE_ID`] are masked to their low 7 bits.
    pub fn new(type_id: BlockTypeId, active: bool) -> Self {
        Block::NIL.with_type(type_id).set_active_bit(active)
    }

    /// Reinterprets a raw packed byte as a block.
    pub const fn from_bits(bits: u8) -> Self {
        Block(bits)
    }

    /// Returns the raw packed byte.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether the active bit is set.
    pub fn active(self) -> bool {
        self.0 & BLOCK_ACTIVE_MASK == BLOCK_ACTIVE_MASK
    }

    /// Returns a copy with the active bit set or cleared.
    ///
    /// Activating preserves the type id. Deactivating resets the type id to
    /// [`BLOCK_NIL`] as well, so an inactive block is always the plain sentinel.
    pub fn activate(self, active: bool) -> Self {
        if active {
            Block(self.0 | BLOCK_ACTIVE_MASK)
        } else {
            Block::NIL
        }
    }

    /// The 7-bit block type id.
    pub fn type_id(self) -> BlockTypeId {
        self.0 & BLOCK_TYPE_MASK
    }

    /// Returns a copy with the type id replaced and the active bit untouched.
    pub fn with_type(self, type_id: BlockTypeId) -> Self {
        Block((self.0 & BLOCK_ACTIVE_MASK) | (type_id & BLOCK_TYPE_MASK))
    }

    /// Same as [`Block::with_type`], taking the id from a registered type.
    pub fn change_type(self, block_type: &BlockType) -> Self {
        self.with_type(block_type.id)
    }

    /// `true` for the raw sentinel byte (inactive, type 0).
    pub fn is_nil(self) -> bool {
        self.0 == BLOCK_NIL
    }

    // Sets only the active bit, keeping the type. Used where a block is built
    // from scratch and the deactivate-clears-type rule must not apply.
    fn set_active_bit(self, active: bool) -> Self {
        if active {
            Block(self.0 | BLOCK_ACTIVE_MASK)
        } else {
            Block(self.0 & BLOCK_TYPE_MASK)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_blocks_are_inactive() {
        let mut blocks = [Block::default(); 12];
        assert!(blocks.iter().all(|b| !b.active()));

        blocks[7] = blocks[7].activate(true);
        assert!(blocks[7].active());
        for (i, block) in blocks.iter().enumerate() {
            if i != 7 {
                assert!(!block.active(), "index {i} should stay inactive");
            }
        }

        blocks[7] = blocks[7].activate(false);
        assert!(!blocks[7].active());
    }

    #[test]
    fn test_activate_each_sample_block() {
        let mut blocks = [Block::default(); 12];
        for block in blocks.iter_mut() {
            *block = block.activate(true);
            assert!(block.active());
        }
    }

    #[test]
    fn test_deactivate_resets_type() {
        let block = Block::NIL.with_type(5).activate(true);
        assert_eq!(block.type_id(), 5);

        let block = block.activate(false);
        assert!(!block.active());
        assert_eq!(block.type_id(), BLOCK_NIL);
    }

    #[test]
    fn test_activate_is_idempotent() {
        let once = Block::NIL.with_type(9).activate(true);
        let twice = once.activate(true);
        assert_eq!(once, twice);
        assert_eq!(twice.type_id(), 9);
    }

    #[test]
    fn test_with_type_keeps_active_bit() {
        let active = Block::NIL.activate(true).with_type(2);
        assert!(active.active());
        assert_eq!(active.with_type(4).type_id(), 4);
        assert!(active.with_type(4).active());

        let inactive = Block::NIL.with_type(2);
        assert!(!inactive.active());
        assert!(!inactive.with_type(6).active());
    }

    #[test]
    fn test_change_type_uses_registered_id() {
        let grass = BlockType::colored(1, block_type::Color::GREEN);
        let water = BlockType::colored(2, block_type::Color::BLUE);

        let block = Block::NIL.change_type(&grass).activate(true);
        assert_eq!(block.type_id(), grass.id);
        assert!(block.active());

        let block = block.change_type(&water);
        assert_eq!(block.type_id(), water.id);
        assert!(block.active());
    }

    #[test]
    fn test_packing() {
        let block = Block::new(0x7F, true);
        assert_eq!(block.bits(), 0xFF);
        assert_eq!(Block::new(0xFF, false).type_id(), 0x7F);
        assert_eq!(Block::from_bits(0x83).type_id(), 3);
        assert!(Block::from_bits(0x83).active());
        assert!(Block::NIL.is_nil());
    }
}
