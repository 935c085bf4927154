//! # Engine State Module
//!
//! The context object that ties the voxel world to a renderer and a moving
//! viewpoint.
//!
//! ## Key Components
//!
//! * `EngineState` - owns the world, the streaming window and the renderer
//! * `config` - tunables loaded from JSON
//! * `rendering` - meshers, the renderer seam and the mesh task
//! * `task_management` - the worker pool shared by generation and meshing
//! * `voxels` - blocks, chunks, generators, the world pipeline and streaming
//!
//! ## Architecture
//!
//! Nothing in the engine is global. Whoever drives a frame owns an
//! `EngineState` and calls [`EngineState::tick`] with the current viewpoint,
//! then [`EngineState::render`]. Anything interested in frame results
//! registers a [`FrameListener`] on the state instead of polling shared data.

use cgmath::Point3;
use web_time::{Duration, Instant};

use rendering::renderer::MeshRenderer;
use voxels::{
    block::block_bank::BlockBank,
    streaming::{StreamingController, StreamingUpdate},
    world::{World, WorldStats},
};

use crate::error::Result;

pub mod config;
pub mod rendering;
pub mod task_management;
pub mod voxels;

use config::EngineConfig;

/// What happened during one [`EngineState::tick`].
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    /// Zero-based frame counter.
    pub frame: u64,
    /// Time since the previous tick, zero on the first.
    pub delta: Duration,
    pub streaming: StreamingUpdate,
    /// Queue sizes after the world update.
    pub stats: WorldStats,
}

/// Observer notified after every tick.
pub trait FrameListener {
    fn on_frame(&mut self, report: &FrameReport);
}

impl<F> FrameListener for F
where
    F: FnMut(&FrameReport),
{
    fn on_frame(&mut self, report: &FrameReport) {
        self(report)
    }
}

/// The engine's explicit context: world, streaming window and renderer.
///
/// Generic over the renderer so callers keep typed access to it; the world
/// itself only ever sees `&mut dyn MeshRenderer`.
pub struct EngineState<R: MeshRenderer> {
    world: World,
    streaming: StreamingController,
    renderer: R,
    listeners: Vec<Box<dyn FrameListener>>,
    frame: u64,
    last_tick: Option<Instant>,
}

impl<R: MeshRenderer> EngineState<R> {
    /// Creates an engine state from a validated configuration.
    ///
    /// # Errors
    ///
    /// Fails when `config` is invalid, `bank` is empty or the worker pool
    /// cannot be started.
    pub fn new(bank: BlockBank, config: &EngineConfig, renderer: R) -> Result<Self> {
        config.validate()?;
        let world = World::from_config(bank, config)?;
        let streaming = StreamingController::new(config.streaming_radius, config.vertical_layer);

        log::info!(
            "Engine state created: radius {}, {} worker(s), {} mesher",
            config.streaming_radius,
            config.worker_threads,
            world.mesher_name()
        );

        Ok(EngineState {
            world,
            streaming,
            renderer,
            listeners: Vec::new(),
            frame: 0,
            last_tick: None,
        })
    }

    /// Advances one frame with the viewpoint at `reference`.
    ///
    /// Streams chunks around the viewpoint, runs the world pipeline against
    /// the renderer and notifies every listener.
    pub fn tick(&mut self, reference: Point3<f32>) -> FrameReport {
        let now = Instant::now();
        let delta = self
            .last_tick
            .map(|last| now.duration_since(last))
            .unwrap_or_default();
        self.last_tick = Some(now);

        let streaming = self.streaming.update(reference, &mut self.world);
        self.world.update(&mut self.renderer);

        let report = FrameReport {
            frame: self.frame,
            delta,
            streaming,
            stats: self.world.stats(),
        };
        self.frame += 1;

        for listener in &mut self.listeners {
            listener.on_frame(&report);
        }
        report
    }

    /// Draws every renderable chunk.
    pub fn render(&mut self) {
        self.world.render(&mut self.renderer);
    }

    pub fn add_listener(&mut self, listener: impl FrameListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn streaming(&self) -> &StreamingController {
        &self.streaming
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Releases every renderer resource and forgets the streaming window.
    pub fn shutdown(&mut self) {
        self.world.dispose_all(&mut self.renderer);
        self.streaming.reset();
        log::info!("Engine state shut down after {} frames", self.frame);
    }

    /// Shuts down and hands back the renderer.
    pub fn into_renderer(mut self) -> R {
        self.shutdown();
        let EngineState { renderer, .. } = self;
        renderer
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::engine_state::rendering::meshing::MesherKind;
    use crate::engine_state::rendering::renderer::HeadlessRenderer;
    use crate::engine_state::voxels::block::block_type::{BlockType, Color};
    use crate::engine_state::voxels::generation::GeneratorConfig;
    use crate::error::VoxelError;

    fn bank() -> BlockBank {
        let mut bank = BlockBank::new();
        bank.add_type(BlockType::colored(1, Color::RED));
        bank
    }

    fn config(radius: i32) -> EngineConfig {
        EngineConfig {
            streaming_radius: radius,
            generator: GeneratorConfig::Flat,
            mesher: MesherKind::Culled,
            ..EngineConfig::default()
        }
    }

    fn point(chunk_x: i32, chunk_z: i32) -> Point3<f32> {
        Point3::new(chunk_x as f32 * 16.0 + 1.0, 0.0, chunk_z as f32 * 16.0 + 1.0)
    }

    #[test]
    fn test_rejects_empty_bank() {
        let result = EngineState::new(BlockBank::new(), &config(1), HeadlessRenderer::new());
        assert!(matches!(result, Err(VoxelError::EmptyBlockBank)));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let bad = EngineConfig {
            max_uploads_per_frame: 0,
            ..config(1)
        };
        let result = EngineState::new(bank(), &bad, HeadlessRenderer::new());
        assert!(matches!(result, Err(VoxelError::InvalidConfig(_))));
    }

    #[test]
    fn test_ticks_until_window_is_renderable() {
        let mut engine = EngineState::new(bank(), &config(1), HeadlessRenderer::new()).unwrap();

        let first = engine.tick(point(0, 0));
        assert_eq!(first.frame, 0);
        assert_eq!(first.delta, Duration::ZERO);
        assert_eq!(first.streaming.generated.len(), 9);

        for _ in 0..10 {
            engine.tick(point(0, 0));
        }
        assert_eq!(engine.world().renderable_count(), 9);
        assert_eq!(engine.renderer().live_count(), 9);

        engine.render();
        assert_eq!(engine.renderer().draws(), 9);
    }

    #[test]
    fn test_listeners_see_every_frame() {
        let mut engine = EngineState::new(bank(), &config(0), HeadlessRenderer::new()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        engine.add_listener(move |report: &FrameReport| sink.borrow_mut().push(report.frame));

        engine.tick(point(0, 0));
        engine.tick(point(1, 0));
        engine.tick(point(1, 0));

        assert_eq!(*seen.borrow(), vec![0, 1, 2]);
        assert_eq!(engine.frame(), 3);
    }

    #[test]
    fn test_moving_disposes_left_behind_meshes() {
        let mut engine = EngineState::new(bank(), &config(0), HeadlessRenderer::new()).unwrap();
        engine.tick(point(0, 0));
        engine.tick(point(0, 0));
        assert_eq!(engine.renderer().live_count(), 1);

        let report = engine.tick(point(5, 5));
        assert_eq!(report.streaming.removed, vec![Point3::new(0, 0, 0)]);
        engine.tick(point(5, 5));

        assert_eq!(engine.renderer().disposals(), 1);
        assert_eq!(engine.renderer().live_count(), 1);
        assert!(engine.world().contains_chunk(Point3::new(5, 0, 5)));
    }

    #[test]
    fn test_shutdown_releases_renderer() {
        let mut engine = EngineState::new(bank(), &config(1), HeadlessRenderer::new()).unwrap();
        for _ in 0..5 {
            engine.tick(point(0, 0));
        }
        let renderer = engine.into_renderer();
        assert_eq!(renderer.live_count(), 0);
        assert_eq!(renderer.disposals(), renderer.uploads());
    }
}
