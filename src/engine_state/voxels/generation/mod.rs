//! # Chunk Generation
//!
//! Strategies that populate a fresh chunk at a given position. Generators are
//! pure with respect to world state: they read only the block bank and their
//! own parameters, so they can run on any worker thread.
//!
//! - [`FlatGenerator`]: every block active
//! - [`RandomGenerator`]: each block active with probability 1/2
//! - [`StaircaseGenerator`]: active where `y <= x`, a fixed test pattern
//! - [`CoherentNoiseGenerator`]: column heights from fractal simplex noise
//!
//! The first three hand out block types round-robin from the bank's ordered
//! type list; the noise generator uses a single type per chunk.

use std::sync::Arc;

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoxelError};

use super::block::{block_bank::BlockBank, Block, BlockTypeId};
use super::chunk::{Chunk, ChunkBuilder, ChunkPosition};

mod noise_terrain;

pub use noise_terrain::CoherentNoiseGenerator;

/// Produces the contents of a chunk.
pub trait Generator: Send + Sync {
    /// Allocates and fully populates a new chunk at `position`.
    ///
    /// Only type ids registered in `bank` are ever assigned.
    ///
    /// # Errors
    /// [`VoxelError::EmptyBlockBank`] when `bank` has no types to hand out.
    fn generate_chunk_at(&self, position: ChunkPosition, bank: &BlockBank) -> Result<Chunk>;

    fn name(&self) -> &'static str;
}

/// Serialized choice of generator, selected once at world construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratorConfig {
    Flat,
    Random {
        seed: u64,
    },
    Staircase,
    CoherentNoise {
        seed: u32,
        octaves: u32,
        persistence: f64,
        lacunarity: f64,
        /// Noise samples per world block.
        frequency: f64,
    },
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig::CoherentNoise {
            seed: noise_terrain::DEFAULT_SEED,
            octaves: noise_terrain::DEFAULT_OCTAVES,
            persistence: noise_terrain::DEFAULT_PERSISTENCE,
            lacunarity: noise_terrain::DEFAULT_LACUNARITY,
            frequency: noise_terrain::DEFAULT_FREQUENCY,
        }
    }
}

impl GeneratorConfig {
    pub fn build(&self) -> Arc<dyn Generator> {
        match *self {
            GeneratorConfig::Flat => Arc::new(FlatGenerator),
            GeneratorConfig::Random { seed } => Arc::new(RandomGenerator::new(seed)),
            GeneratorConfig::Staircase => Arc::new(StaircaseGenerator),
            GeneratorConfig::CoherentNoise {
                seed,
                octaves,
                persistence,
                lacunarity,
                frequency,
            } => Arc::new(CoherentNoiseGenerator::new(
                seed,
                octaves,
                persistence,
                lacunarity,
                frequency,
            )),
        }
    }

    /// Checks the parameters a generator cannot work with.
    pub fn validate(&self) -> Result<()> {
        if let GeneratorConfig::CoherentNoise {
            octaves,
            persistence,
            lacunarity,
            frequency,
            ..
        } = *self
        {
            if octaves == 0 {
                return Err(VoxelError::InvalidConfig("noise octaves must be at least 1".into()));
            }
            if !(persistence.is_finite() && persistence > 0.0) {
                return Err(VoxelError::InvalidConfig("noise persistence must be positive".into()));
            }
            if !(lacunarity.is_finite() && lacunarity > 0.0) {
                return Err(VoxelError::InvalidConfig("noise lacunarity must be positive".into()));
            }
            if !(frequency.is_finite() && frequency > 0.0) {
                return Err(VoxelError::InvalidConfig("noise frequency must be positive".into()));
            }
        }
        Ok(())
    }
}

/// Hands out the bank's type ids in insertion order, wrapping around.
struct RoundRobin<'a> {
    bank: &'a BlockBank,
    next: usize,
}

impl<'a> RoundRobin<'a> {
    fn new(bank: &'a BlockBank) -> Result<Self> {
        if bank.is_empty() {
            return Err(VoxelError::EmptyBlockBank);
        }
        Ok(RoundRobin { bank, next: 0 })
    }

    fn next_type(&mut self) -> BlockTypeId {
        let types = self.bank.types();
        let id = types[self.next % types.len()].id;
        self.next = (self.next + 1) % types.len();
        id
    }
}

/// Fills a chunk in storage order, asking `is_active` about every local position.
fn fill_round_robin<F>(position: ChunkPosition, bank: &BlockBank, mut is_active: F) -> Result<Chunk>
where
    F: FnMut(Point3<usize>) -> bool,
{
    let mut types = RoundRobin::new(bank)?;
    let mut builder = ChunkBuilder::new(position);

    while let Some(local) = builder.next_position() {
        let block = if is_active(local) {
            Block::new(types.next_type(), true)
        } else {
            Block::NIL
        };
        builder.push_block(block);
    }

    Ok(builder.return_chunk())
}

/// Mixes a seed with a chunk position into a per-chunk RNG seed.
pub(crate) fn position_seed(seed: u64, position: ChunkPosition) -> u64 {
    let mut hash = seed ^ 0x9E37_79B9_7F4A_7C15;
    for coordinate in [position.x, position.y, position.z] {
        hash = (hash ^ u64::from(coordinate as u32)).wrapping_mul(0x0000_0100_0000_01B3);
        hash ^= hash >> 29;
    }
    hash
}

/// Every block active.
pub struct FlatGenerator;

impl Generator for FlatGenerator {
    fn generate_chunk_at(&self, position: ChunkPosition, bank: &BlockBank) -> Result<Chunk> {
        fill_round_robin(position, bank, |_| true)
    }

    fn name(&self) -> &'static str {
        "flat"
    }
}

/// Each block independently active with probability 1/2.
///
/// Seeded per chunk position, so the same position always comes out the same.
pub struct RandomGenerator {
    seed: u64,
}

impl RandomGenerator {
    pub fn new(seed: u64) -> Self {
        RandomGenerator { seed }
    }
}

impl Generator for RandomGenerator {
    fn generate_chunk_at(&self, position: ChunkPosition, bank: &BlockBank) -> Result<Chunk> {
        let mut rng = fastrand::Rng::with_seed(position_seed(self.seed, position));
        fill_round_robin(position, bank, |_| rng.bool())
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// Active where `y <= x` in local coordinates.
pub struct StaircaseGenerator;

impl Generator for StaircaseGenerator {
    fn generate_chunk_at(&self, position: ChunkPosition, bank: &BlockBank) -> Result<Chunk> {
        fill_round_robin(position, bank, |local| local.y <= local.x)
    }

    fn name(&self) -> &'static str {
        "staircase"
    }
}
