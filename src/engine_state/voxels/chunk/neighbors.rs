//! Links between adjacent chunks.
//!
//! Each chunk keeps a weak back-reference to each of its six neighbors. Links are
//! only ever created or destroyed in pairs through [`attach_neighbors`] and
//! [`detach_neighbors`]; a weak link can never dangle, it just fails to upgrade.

use crate::core::{MtResource, WeakResource};
use crate::engine_state::voxels::block::block_side::BlockSide;

use super::{neighbor_position, Chunk, ChunkPosition};

/// The six weak neighbor links of a chunk, indexed by [`BlockSide`].
#[derive(Default, Clone)]
pub struct ChunkNeighbors {
    links: [Option<WeakResource<Chunk>>; 6],
}

impl ChunkNeighbors {
    /// The neighbor across `side`, if linked and still alive.
    pub fn get(&self, side: BlockSide) -> Option<MtResource<Chunk>> {
        self.links[side as usize].as_ref().and_then(WeakResource::upgrade)
    }

    /// Whether a link is recorded across `side`.
    pub fn is_linked(&self, side: BlockSide) -> bool {
        self.links[side as usize].is_some()
    }

    pub fn linked_count(&self) -> usize {
        self.links.iter().filter(|link| link.is_some()).count()
    }

    fn link(&mut self, side: BlockSide, neighbor: WeakResource<Chunk>) {
        self.links[side as usize] = Some(neighbor);
    }

    /// Clears the link across `side` only if it points at `expected`.
    fn unlink_if(&mut self, side: BlockSide, expected: &MtResource<Chunk>) {
        let slot = &mut self.links[side as usize];
        if slot.as_ref().is_some_and(|link| link.points_to(expected)) {
            *slot = None;
        }
    }

    fn take_all(&mut self) -> Vec<(BlockSide, WeakResource<Chunk>)> {
        BlockSide::all()
            .into_iter()
            .filter_map(|side| self.links[side as usize].take().map(|link| (side, link)))
            .collect()
    }
}

/// Links `chunk` with every adjacent chunk `lookup` can find, in both directions.
///
/// Locks are taken one at a time, never nested, so this is safe to call while
/// worker threads hold read guards on any of the chunks involved.
///
/// # Returns
/// The positions of the neighbors that were linked.
pub fn attach_neighbors<F>(chunk: &MtResource<Chunk>, lookup: F) -> Vec<ChunkPosition>
where
    F: Fn(ChunkPosition) -> Option<MtResource<Chunk>>,
{
    let position = chunk.get().position();
    let mut linked = Vec::new();

    for side in BlockSide::all() {
        let neighbor_pos = neighbor_position(position, side);
        let Some(neighbor) = lookup(neighbor_pos) else {
            continue;
        };
        if neighbor.ptr_eq(chunk) {
            continue;
        }

        chunk.get_mut().neighbors.link(side, neighbor.downgrade());
        neighbor.get_mut().neighbors.link(side.opposite(), chunk.downgrade());
        linked.push(neighbor_pos);
    }

    linked
}

/// Removes every link of `chunk` together with the reciprocal link on each neighbor.
///
/// Must run before a chunk is discarded so no neighbor keeps a back-reference to it.
///
/// # Returns
/// The positions of the neighbors that were unlinked.
pub fn detach_neighbors(chunk: &MtResource<Chunk>) -> Vec<ChunkPosition> {
    let links = chunk.get_mut().neighbors.take_all();
    let mut unlinked = Vec::with_capacity(links.len());

    for (side, link) in links {
        if let Some(neighbor) = link.upgrade() {
            let mut neighbor = neighbor.get_mut();
            neighbor.neighbors.unlink_if(side.opposite(), chunk);
            unlinked.push(neighbor.position());
        }
    }

    unlinked
}
