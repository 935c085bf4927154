//! Mesh generation for voxel rendering.
//!
//! This module converts chunk voxel data into flat, GPU-friendly buffers
//! ([`MeshData`]) that the renderer collaborator uploads. Two strategies are
//! provided behind the [`Mesher`] trait:
//!
//! - [`StupidMesher`]: a full cube per active block. Correct but heavy on overdraw;
//!   kept as the baseline for comparisons.
//! - [`CulledMesher`]: emits a face only when the adjacent block is absent or
//!   inactive, looking across chunk boundaries into the neighbor chunks.
//!
//! # Architecture
//! - [`MeshData`]: positions, normals, UVs, colors and indices for one chunk
//! - [`Face`]: the four corners of one block face in a fixed CCW winding
//! - [`NeighborLookup`]: read access to the blocks just across the chunk boundary
//! - [`ChunkNeighborhood`]: a snapshot of the six boundary planes facing a chunk,
//!   taken on the main thread so worker tasks never touch neighbor locks

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine_state::voxels::{
    block::{block_bank::BlockBank, block_side::BlockSide, Block},
    chunk::{
        neighbor_position, Chunk, ChunkPosition, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH,
    },
};

mod culled;
mod face;
mod stupid;

pub use culled::CulledMesher;
pub use face::{Face, QUAD_INDICES};
pub use stupid::{StupidMesher, CUBE_INDICES};

/// Transient buffer bundle produced by a mesher and consumed once by an upload.
///
/// All attribute arrays are flat and parallel: vertex `i` owns
/// `positions[3i..3i+3]`, `normals[3i..3i+3]`, `uvs[2i..2i+2]` and
/// `colors[4i..4i+4]`. Meshers that do not produce an attribute leave its
/// array empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    pub colors: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-sizes every buffer for `faces` quads with all attributes.
    pub fn with_face_capacity(faces: usize) -> Self {
        let vertices = faces * 4;
        MeshData {
            positions: Vec::with_capacity(vertices * 3),
            normals: Vec::with_capacity(vertices * 3),
            uvs: Vec::with_capacity(vertices * 2),
            colors: Vec::with_capacity(vertices * 4),
            indices: Vec::with_capacity(faces * QUAD_INDICES.len()),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of quads, counting two triangles per quad.
    pub fn face_count(&self) -> usize {
        self.triangle_count() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    pub fn has_colors(&self) -> bool {
        !self.colors.is_empty()
    }

    /// Raw bytes of the position buffer, ready for a vertex buffer upload.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Raw bytes of the index buffer.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Read access to the blocks just across a chunk boundary.
pub trait NeighborLookup {
    /// Returns the block at local coordinates `(x, y, z)` of the neighbor chunk
    /// across `side`, or `None` when there is no neighbor chunk there.
    fn neighbor_block(&self, side: BlockSide, x: usize, y: usize, z: usize) -> Option<Block>;
}

/// A lookup with no neighbors at all: every chunk edge is open.
pub struct NoNeighbors;

impl NeighborLookup for NoNeighbors {
    fn neighbor_block(&self, _side: BlockSide, _x: usize, _y: usize, _z: usize) -> Option<Block> {
        None
    }
}

/// Snapshot of the six boundary planes that face a chunk.
///
/// For each side with a neighbor chunk, the neighbor's layer of blocks touching
/// the shared boundary is copied (for the LEFT neighbor that is its
/// `x = CHUNK_WIDTH - 1` plane). Meshing only ever looks one block across the
/// boundary, so this is all it needs.
#[derive(Clone, Default)]
pub struct ChunkNeighborhood {
    planes: [Option<Box<[Block]>>; 6],
}

impl ChunkNeighborhood {
    /// A neighborhood with no neighbor chunks.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Captures the boundary planes from the chunk's live neighbor links.
    ///
    /// Takes a read guard on each linked neighbor in turn.
    pub fn capture(chunk: &Chunk) -> Self {
        let mut neighborhood = Self::empty();
        for side in BlockSide::all() {
            if let Some(neighbor) = chunk.neighbors().get(side) {
                neighborhood.planes[side as usize] = Some(Self::boundary_plane(&neighbor.get(), side));
            }
        }
        neighborhood
    }

    /// Captures the boundary planes through a position-keyed lookup instead of links.
    pub fn from_lookup<'a, F>(position: ChunkPosition, lookup: F) -> Self
    where
        F: Fn(ChunkPosition) -> Option<&'a Chunk>,
    {
        let mut neighborhood = Self::empty();
        for side in BlockSide::all() {
            if let Some(neighbor) = lookup(neighbor_position(position, side)) {
                neighborhood.planes[side as usize] = Some(Self::boundary_plane(neighbor, side));
            }
        }
        neighborhood
    }

    /// Whether a neighbor chunk was present across `side`.
    pub fn has_neighbor(&self, side: BlockSide) -> bool {
        self.planes[side as usize].is_some()
    }

    fn boundary_plane(neighbor: &Chunk, side: BlockSide) -> Box<[Block]> {
        let (_, plane_size) = plane_shape(side);
        let mut plane = vec![Block::NIL; plane_size];
        let fixed = facing_layer(side);

        match side {
            BlockSide::LEFT | BlockSide::RIGHT => {
                for y in 0..CHUNK_HEIGHT {
                    for z in 0..CHUNK_DEPTH {
                        plane[plane_index(side, fixed, y, z)] =
                            neighbor.get(fixed as i32, y as i32, z as i32);
                    }
                }
            }
            BlockSide::BOTTOM | BlockSide::TOP => {
                for z in 0..CHUNK_DEPTH {
                    for x in 0..CHUNK_WIDTH {
                        plane[plane_index(side, x, fixed, z)] =
                            neighbor.get(x as i32, fixed as i32, z as i32);
                    }
                }
            }
            BlockSide::BACK | BlockSide::FRONT => {
                for y in 0..CHUNK_HEIGHT {
                    for x in 0..CHUNK_WIDTH {
                        plane[plane_index(side, x, y, fixed)] =
                            neighbor.get(x as i32, y as i32, fixed as i32);
                    }
                }
            }
        }

        plane.into_boxed_slice()
    }
}

impl NeighborLookup for ChunkNeighborhood {
    fn neighbor_block(&self, side: BlockSide, x: usize, y: usize, z: usize) -> Option<Block> {
        let plane = self.planes[side as usize].as_ref()?;
        plane.get(plane_index(side, x, y, z)).copied()
    }
}

/// The coordinate of the neighbor's layer that touches the shared boundary.
fn facing_layer(side: BlockSide) -> usize {
    match side {
        BlockSide::LEFT => CHUNK_WIDTH - 1,
        BlockSide::RIGHT => 0,
        BlockSide::BOTTOM => CHUNK_HEIGHT - 1,
        BlockSide::TOP => 0,
        BlockSide::BACK => CHUNK_DEPTH - 1,
        BlockSide::FRONT => 0,
    }
}

/// Row length and total size of the boundary plane across `side`.
fn plane_shape(side: BlockSide) -> (usize, usize) {
    match side {
        BlockSide::LEFT | BlockSide::RIGHT => (CHUNK_DEPTH, CHUNK_HEIGHT * CHUNK_DEPTH),
        BlockSide::BOTTOM | BlockSide::TOP => (CHUNK_WIDTH, CHUNK_DEPTH * CHUNK_WIDTH),
        BlockSide::BACK | BlockSide::FRONT => (CHUNK_WIDTH, CHUNK_HEIGHT * CHUNK_WIDTH),
    }
}

fn plane_index(side: BlockSide, x: usize, y: usize, z: usize) -> usize {
    let (row, _) = plane_shape(side);
    match side {
        BlockSide::LEFT | BlockSide::RIGHT => y * row + z,
        BlockSide::BOTTOM | BlockSide::TOP => z * row + x,
        BlockSide::BACK | BlockSide::FRONT => y * row + x,
    }
}

/// Converts a chunk into renderable mesh data.
///
/// Implementations must not mutate the chunk and must be callable from worker
/// threads, since they hold no per-chunk state.
pub trait Mesher: Send + Sync {
    /// Meshes `chunk`, consulting `neighbors` for blocks across its boundary.
    ///
    /// # Returns
    /// `None` when the chunk contributes no visible geometry.
    fn generate(
        &self,
        chunk: &Chunk,
        neighbors: &dyn NeighborLookup,
        bank: &BlockBank,
    ) -> Option<MeshData>;

    fn name(&self) -> &'static str;
}

/// Selects the meshing strategy at world construction time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MesherKind {
    Stupid,
    #[default]
    Culled,
}

impl MesherKind {
    pub fn build(self) -> Arc<dyn Mesher> {
        match self {
            MesherKind::Stupid => Arc::new(StupidMesher::new()),
            MesherKind::Culled => Arc::new(CulledMesher::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use cgmath::Point3;

    use super::*;

    #[test]
    fn test_plane_index_is_dense() {
        for side in BlockSide::all() {
            let (_, size) = plane_shape(side);
            let mut seen = vec![false; size];
            for x in 0..CHUNK_WIDTH {
                for y in 0..CHUNK_HEIGHT {
                    for z in 0..CHUNK_DEPTH {
                        let on_plane = match side {
                            BlockSide::LEFT | BlockSide::RIGHT => x == facing_layer(side),
                            BlockSide::BOTTOM | BlockSide::TOP => y == facing_layer(side),
                            BlockSide::BACK | BlockSide::FRONT => z == facing_layer(side),
                        };
                        if on_plane {
                            let index = plane_index(side, x, y, z);
                            assert!(!seen[index]);
                            seen[index] = true;
                        }
                    }
                }
            }
            assert!(seen.into_iter().all(|s| s), "{side:?} plane has holes");
        }
    }

    #[test]
    fn test_neighborhood_reads_facing_layer() {
        let center = Point3::new(0, 0, 0);
        let left = Point3::new(-1, 0, 0);
        let mut left_chunk = Chunk::new(left);
        left_chunk.set(CHUNK_WIDTH as i32 - 1, 3, 7, Block::new(2, true));
        left_chunk.set(0, 3, 7, Block::new(9, true));

        let mut chunks = HashMap::new();
        chunks.insert(left, left_chunk);

        let neighborhood = ChunkNeighborhood::from_lookup(center, |p| chunks.get(&p));
        assert!(neighborhood.has_neighbor(BlockSide::LEFT));
        assert!(!neighborhood.has_neighbor(BlockSide::RIGHT));

        let block = neighborhood.neighbor_block(BlockSide::LEFT, CHUNK_WIDTH - 1, 3, 7);
        assert_eq!(block, Some(Block::new(2, true)));
        assert_eq!(neighborhood.neighbor_block(BlockSide::RIGHT, 0, 3, 7), None);
    }

    #[test]
    fn test_mesh_data_counts() {
        let mut data = MeshData::with_face_capacity(2);
        assert!(data.is_empty());
        data.positions.extend_from_slice(&[0.0; 24]);
        data.indices.extend_from_slice(&[0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);

        assert_eq!(data.vertex_count(), 8);
        assert_eq!(data.triangle_count(), 4);
        assert_eq!(data.face_count(), 2);
        assert_eq!(data.position_bytes().len(), 24 * 4);
        assert_eq!(data.index_bytes().len(), 12 * 4);
    }

    #[test]
    fn test_mesher_kind_from_config() {
        let kind: MesherKind = serde_json::from_str("\"stupid\"").unwrap();
        assert_eq!(kind.build().name(), "stupid");
        assert_eq!(MesherKind::default().build().name(), "culled");
    }
}
