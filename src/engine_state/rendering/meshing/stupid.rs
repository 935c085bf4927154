//! # Stupid Meshing
//!
//! One full cube per active block, regardless of what surrounds it. Interior
//! faces are emitted too, so the output is mostly overdraw; this mesher exists
//! as the reference the culled mesher is measured against.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use crate::engine_state::voxels::{
    block::{block_bank::BlockBank, block_type::BlockType, Block, BlockTypeId},
    chunk::{world_origin, Chunk},
};

use super::{MeshData, Mesher, NeighborLookup};

/// Triangle list over the eight corners of a unit cube.
///
/// Corner `i` sits at `(i & 1, (i >> 1) & 1, (i >> 2) & 1)`. Every triangle
/// winds counter-clockwise seen from outside the cube.
#[rustfmt::skip]
pub const CUBE_INDICES: [u32; 36] = [
    4, 5, 7, 4, 7, 6, // front  (+Z)
    1, 0, 2, 1, 2, 3, // back   (-Z)
    0, 1, 5, 0, 5, 4, // bottom (-Y)
    6, 7, 3, 6, 3, 2, // top    (+Y)
    0, 4, 6, 0, 6, 2, // left   (-X)
    5, 1, 3, 5, 3, 7, // right  (+X)
];

const CUBE_CORNERS: usize = 8;

#[derive(Default)]
pub struct StupidMesher {
    /// Unregistered type ids already reported.
    warned_types: Mutex<HashSet<BlockTypeId>>,
}

impl StupidMesher {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve_type<'b>(&self, block: Block, bank: &'b BlockBank) -> Option<&'b BlockType> {
        let block_type = bank.type_of(block);
        if block_type.is_none() {
            let mut warned = self.warned_types.lock().unwrap_or_else(PoisonError::into_inner);
            if warned.insert(block.type_id()) {
                log::warn!(
                    "Block type {} is not registered, its cubes are skipped",
                    block.type_id()
                );
            }
        }
        block_type
    }
}

impl Mesher for StupidMesher {
    fn generate(
        &self,
        chunk: &Chunk,
        _neighbors: &dyn NeighborLookup,
        bank: &BlockBank,
    ) -> Option<MeshData> {
        let active = chunk.active_count();
        if active == 0 {
            return None;
        }

        let mut data = MeshData {
            positions: Vec::with_capacity(active * CUBE_CORNERS * 3),
            colors: Vec::with_capacity(active * CUBE_CORNERS * 4),
            indices: Vec::with_capacity(active * CUBE_INDICES.len()),
            ..MeshData::default()
        };
        let origin = world_origin(chunk.position());

        for (local, block) in chunk.iter_active() {
            let Some(block_type) = self.resolve_type(block, bank) else {
                continue;
            };
            let color = block_type.color().to_array();
            let x = (origin.x + local.x as i32) as f32;
            let y = (origin.y + local.y as i32) as f32;
            let z = (origin.z + local.z as i32) as f32;

            let first = data.vertex_count() as u32;
            for corner in 0..CUBE_CORNERS {
                data.positions.extend_from_slice(&[
                    x + (corner & 1) as f32,
                    y + ((corner >> 1) & 1) as f32,
                    z + ((corner >> 2) & 1) as f32,
                ]);
                data.colors.extend_from_slice(&color);
            }
            data.indices.extend(CUBE_INDICES.iter().map(|i| first + i));
        }

        if data.is_empty() {
            None
        } else {
            Some(data)
        }
    }

    fn name(&self) -> &'static str {
        "stupid"
    }
}
