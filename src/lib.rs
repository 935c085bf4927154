#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! The core of a voxel engine: typed blocks stored in 16x16x16 chunks,
//! procedural chunk generation, chunk meshing and chunk streaming around a
//! moving viewpoint. Windowing, shaders and GPU buffers stay outside; they
//! plug in through the [`MeshRenderer`] trait.
//!
//! ## Key Modules
//!
//! * `core` - shared-resource wrappers used between the world and its workers
//! * `engine_state` - the engine context, configuration, voxels, meshing and tasks
//! * `error` - the crate error type
//!
//! ## Architecture
//!
//! * Blocks are one packed byte each; block types live in a [`BlockBank`]
//! * A [`World`] moves every chunk through generate, mesh, upload and unload,
//!   optionally on a worker pool
//! * A [`StreamingController`] keeps a square window of chunks loaded
//! * An [`EngineState`] owns all of the above plus the renderer
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     voxel_world::run();
//! }
//! ```

use cgmath::Point3;
use log::{error, info};
use web_time::Instant;

pub mod core;
pub mod engine_state;
pub mod error;

pub use engine_state::config::{EngineConfig, CONFIG_PATH_ENV};
pub use engine_state::rendering::meshing::{
    ChunkNeighborhood, CulledMesher, MeshData, Mesher, MesherKind, NeighborLookup, NoNeighbors,
    StupidMesher,
};
pub use engine_state::rendering::renderer::{HeadlessRenderer, MeshHandle, MeshRenderer};
pub use engine_state::voxels::block::{
    block_bank::BlockBank,
    block_side::BlockSide,
    block_type::{BlockType, Color, TextureRegion},
    Block, BlockTypeId,
};
pub use engine_state::voxels::chunk::{Chunk, ChunkBuilder, ChunkPosition, ChunkState};
pub use engine_state::voxels::generation::{
    CoherentNoiseGenerator, FlatGenerator, Generator, GeneratorConfig, RandomGenerator,
    StaircaseGenerator,
};
pub use engine_state::voxels::streaming::{StreamingController, StreamingUpdate};
pub use engine_state::voxels::world::{World, WorldSettings, WorldStats};
pub use engine_state::{EngineState, FrameListener, FrameReport};
pub use error::{Result, VoxelError};

/// Frames the headless driver simulates.
pub const DRIVER_FRAMES: u64 = 240;

pub const BRICK: BlockTypeId = 1;
pub const GRASS: BlockTypeId = 2;
pub const BEDROCK: BlockTypeId = 3;

/// Sets up `env_logger` on stdout, filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logger() {
    let mut log_builder = env_logger::Builder::new();
    let initialized = log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init()
        .is_ok();

    if initialized {
        info!("Logger initialized");
    }
}

/// The block types the driver registers: brick, grass and bedrock.
///
/// Brick and grass sample a 4x4 atlas; bedrock is flat colored.
pub fn sandbox_bank() -> BlockBank {
    let cell = |col: f32, row: f32| {
        TextureRegion::from_bounds(col * 0.25, row * 0.25, (col + 1.0) * 0.25, (row + 1.0) * 0.25)
    };

    let mut bank = BlockBank::new();
    bank.add_type(BlockType::textured(BRICK, cell(0.0, 0.0), cell(0.0, 0.0), cell(0.0, 0.0)));
    bank.add_type(BlockType::textured(GRASS, cell(1.0, 0.0), cell(2.0, 0.0), cell(3.0, 0.0)));
    bank.add_type(BlockType::colored(BEDROCK, Color::new(0.2, 0.2, 0.2, 1.0)));
    bank
}

/// Where the driver's viewpoint is on `frame`: a slow weave heading +x.
pub fn driver_viewpoint(frame: u64) -> Point3<f32> {
    let t = frame as f32;
    Point3::new(t * 2.0, 24.0, (t / 20.0).sin() * 48.0)
}

/// Runs `frames` headless frames with `config` and returns the renderer.
///
/// # Errors
///
/// Fails when the config is invalid or the worker pool cannot be started.
pub fn run_headless(config: &EngineConfig, frames: u64) -> Result<HeadlessRenderer> {
    let mut engine = EngineState::new(sandbox_bank(), config, HeadlessRenderer::new())?;

    let started = Instant::now();
    for frame in 0..frames {
        let report = engine.tick(driver_viewpoint(frame));
        engine.render();

        if !report.streaming.is_empty() {
            log::debug!(
                "Frame {}: +{} -{} chunks, {} renderable, {} uploads pending ({:?})",
                report.frame,
                report.streaming.generated.len(),
                report.streaming.removed.len(),
                report.stats.renderable,
                report.stats.pending_uploads,
                report.delta
            );
        }
    }

    let renderer = engine.renderer();
    info!(
        "Simulated {} frames in {:?}: {} uploads, {} disposals, {} draws, {} live meshes",
        frames,
        started.elapsed(),
        renderer.uploads(),
        renderer.disposals(),
        renderer.draws(),
        renderer.live_count()
    );

    Ok(engine.into_renderer())
}

/// Headless entry point: loads config from [`CONFIG_PATH_ENV`] and walks the
/// viewpoint for [`DRIVER_FRAMES`] frames.
pub fn run() {
    init_logger();

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Could not load configuration: {}", err);
            return;
        }
    };

    if let Err(err) = run_headless(&config, DRIVER_FRAMES) {
        error!("Engine failed: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sandbox_bank_has_three_types() {
        let bank = sandbox_bank();
        assert_eq!(bank.len(), 3);
        assert!(bank.get(BRICK).unwrap().region_for(BlockSide::TOP).is_some());
        assert_eq!(bank.get(BEDROCK).unwrap().color(), Color::new(0.2, 0.2, 0.2, 1.0));
    }

    #[test]
    fn test_init_logger_twice() {
        init_logger();
        init_logger();
    }

    #[test]
    fn test_run_headless_releases_everything() {
        let config = EngineConfig {
            streaming_radius: 2,
            ..EngineConfig::default()
        };
        let renderer = run_headless(&config, 30).unwrap();
        assert!(renderer.uploads() > 0);
        assert_eq!(renderer.live_count(), 0);
        assert_eq!(renderer.uploads(), renderer.disposals());
    }
}
