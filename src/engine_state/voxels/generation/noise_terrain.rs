//! Heightmap terrain from fractal simplex noise.

use noise::{NoiseFn, OpenSimplex};

use crate::engine_state::voxels::{
    block::{block_bank::BlockBank, Block, BlockTypeId},
    chunk::{world_origin, Chunk, ChunkPosition, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH},
};
use crate::error::{Result, VoxelError};

use super::{position_seed, Generator};

pub const DEFAULT_SEED: u32 = 16726;
pub const DEFAULT_OCTAVES: u32 = 3;
pub const DEFAULT_PERSISTENCE: f64 = 0.5;
pub const DEFAULT_LACUNARITY: f64 = 2.0;
/// One noise unit per chunk width.
pub const DEFAULT_FREQUENCY: f64 = 1.0 / CHUNK_WIDTH as f64;

/// Type ids the terrain prefers when the bank registers them.
const TERRAIN_TYPES: [BlockTypeId; 3] = [1, 2, 3];

/// Column-height terrain: each `(x, z)` column is filled from the bottom of the
/// chunk up to a height taken from 2D fractal noise.
///
/// Samples are taken at world block coordinates scaled by `frequency`, so
/// adjacent chunks continue each other's terrain without seams. Every chunk
/// gets one block type, picked with an RNG seeded from the generator seed and
/// the chunk position; the same seed and position always give the same voxels.
pub struct CoherentNoiseGenerator {
    seed: u32,
    noise: OpenSimplex,
    octaves: u32,
    persistence: f64,
    lacunarity: f64,
    frequency: f64,
}

impl Default for CoherentNoiseGenerator {
    fn default() -> Self {
        Self::new(
            DEFAULT_SEED,
            DEFAULT_OCTAVES,
            DEFAULT_PERSISTENCE,
            DEFAULT_LACUNARITY,
            DEFAULT_FREQUENCY,
        )
    }
}

impl CoherentNoiseGenerator {
    pub fn new(seed: u32, octaves: u32, persistence: f64, lacunarity: f64, frequency: f64) -> Self {
        CoherentNoiseGenerator {
            seed,
            noise: OpenSimplex::new(seed),
            octaves: octaves.max(1),
            persistence,
            lacunarity,
            frequency,
        }
    }

    /// Fractal sum of `octaves` noise layers, normalized to `[0, 1]`.
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        let mut max = 1.0;
        let mut total = self.noise.get([x, z]);

        for _ in 1..self.octaves {
            frequency *= self.lacunarity;
            amplitude *= self.persistence;
            max += amplitude;
            total += self.noise.get([x * frequency, z * frequency]) * amplitude;
        }

        // Octave amplitudes can cancel out when built without validation.
        if !(max > 0.0) {
            return 0.5;
        }
        ((1.0 + total / max) / 2.0).clamp(0.0, 1.0)
    }

    /// Column height at world block coordinates, in blocks.
    pub fn column_height(&self, world_x: i32, world_z: i32) -> usize {
        let sample = self.sample(
            f64::from(world_x) * self.frequency,
            f64::from(world_z) * self.frequency,
        );
        ((sample * CHUNK_HEIGHT as f64) as usize).min(CHUNK_HEIGHT)
    }

    fn pick_type(&self, position: ChunkPosition, bank: &BlockBank) -> Result<BlockTypeId> {
        let preferred: Vec<BlockTypeId> =
            TERRAIN_TYPES.into_iter().filter(|&id| bank.contains(id)).collect();
        let candidates: Vec<BlockTypeId> = if preferred.is_empty() {
            bank.types().iter().map(|t| t.id).collect()
        } else {
            preferred
        };
        if candidates.is_empty() {
            return Err(VoxelError::EmptyBlockBank);
        }

        let mut rng = fastrand::Rng::with_seed(position_seed(u64::from(self.seed), position));
        Ok(candidates[rng.usize(..candidates.len())])
    }
}

impl Generator for CoherentNoiseGenerator {
    fn generate_chunk_at(&self, position: ChunkPosition, bank: &BlockBank) -> Result<Chunk> {
        let block_type = self.pick_type(position, bank)?;
        let origin = world_origin(position);
        let mut chunk = Chunk::new(position);
        let blocks = chunk.blocks_mut();

        for z in 0..CHUNK_DEPTH {
            for x in 0..CHUNK_WIDTH {
                let height = self.column_height(origin.x + x as i32, origin.z + z as i32);
                for y in 0..height {
                    blocks[Chunk::index_at(x, y, z)] = Block::new(block_type, true);
                }
            }
        }

        Ok(chunk)
    }

    fn name(&self) -> &'static str {
        "coherent_noise"
    }
}
