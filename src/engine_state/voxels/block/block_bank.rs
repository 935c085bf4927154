//! # Block Bank Module
//!
//! Registry mapping block type ids to their [`BlockType`] definitions. External
//! setup code fills the bank before the world is built; generators and meshers
//! only ever read it, so it is shared between threads behind an `Arc`.

use std::collections::HashMap;

use super::{block_type::BlockType, Block, BlockTypeId};

/// Registry of block types, keeping both an id lookup and the insertion order.
///
/// Generators hand out types round-robin from the ordered list; meshers look
/// appearances up by id.
#[derive(Clone, Debug, Default)]
pub struct BlockBank {
    types: Vec<BlockType>,
    index_by_id: HashMap<BlockTypeId, usize>,
}

impl BlockBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a block type.
    ///
    /// Registering an id that is already known replaces the old definition in
    /// place: the ordered list never holds two entries with the same id.
    pub fn add_type(&mut self, block_type: BlockType) {
        match self.index_by_id.get(&block_type.id) {
            Some(&index) => {
                log::debug!("Replacing block type {}", block_type.id);
                self.types[index] = block_type;
            }
            None => {
                self.index_by_id.insert(block_type.id, self.types.len());
                self.types.push(block_type);
            }
        }
    }

    /// Looks up the type of a block.
    ///
    /// # Returns
    /// `None` when the block's type id is not registered. The nil sentinel
    /// (type 0) is normally unregistered, so callers must expect misses.
    pub fn type_of(&self, block: Block) -> Option<&BlockType> {
        self.get(block.type_id())
    }

    pub fn get(&self, id: BlockTypeId) -> Option<&BlockType> {
        self.index_by_id.get(&id).map(|&index| &self.types[index])
    }

    pub fn contains(&self, id: BlockTypeId) -> bool {
        self.index_by_id.contains_key(&id)
    }

    /// The registered types in insertion order.
    pub fn types(&self) -> &[BlockType] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::Color;

    #[test]
    fn test_lookup_registered() {
        let mut bank = BlockBank::new();
        bank.add_type(BlockType::colored(1, Color::RED));
        bank.add_type(BlockType::colored(3, Color::BLUE));

        let block = Block::new(3, true);
        assert_eq!(bank.type_of(block).map(|t| t.id), Some(3));
        assert_eq!(bank.len(), 2);
        assert!(bank.contains(1));
    }

    #[test]
    fn test_unregistered_is_absent() {
        let mut bank = BlockBank::new();
        bank.add_type(BlockType::colored(1, Color::RED));

        assert!(bank.type_of(Block::NIL).is_none());
        assert!(bank.type_of(Block::new(42, true)).is_none());
    }

    #[test]
    fn test_duplicate_id_replaces_in_place() {
        let mut bank = BlockBank::new();
        bank.add_type(BlockType::colored(1, Color::RED));
        bank.add_type(BlockType::colored(2, Color::GREEN));
        bank.add_type(BlockType::colored(1, Color::TEAL));

        assert_eq!(bank.len(), 2);
        assert_eq!(bank.types()[0].color(), Color::TEAL);
        assert_eq!(bank.types()[1].id, 2);
        assert_eq!(bank.get(1).map(|t| t.color()), Some(Color::TEAL));
    }

    #[test]
    fn test_empty_bank() {
        let bank = BlockBank::new();
        assert!(bank.is_empty());
        assert!(bank.types().is_empty());
    }
}
