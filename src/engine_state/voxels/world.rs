//! # World Module
//!
//! This module provides the `World` struct which owns every loaded chunk and
//! drives each of them through the generate → mesh → upload → dispose pipeline.
//!
//! ## Chunk lifecycle
//!
//! ```text
//! generate_new_chunk ─► Generated ─► MeshPending ─► MeshReady ─► Renderable
//!                                        ▲                            │
//!                                        └──── neighbor arrives ──────┘
//! remove_chunk ─► handle queued for disposal ─► disposed on next update
//! ```
//!
//! ## Update phases
//!
//! `update` runs three phases in a fixed order:
//! 1. **unload**: dispose every queued mesh handle, without a cap
//! 2. **mesh**: mesh every chunk queued for (re)meshing
//! 3. **upload**: hand at most `max_uploads_per_frame` meshes to the renderer
//!
//! ## Workers
//!
//! Generation and meshing are tasks. With zero workers they run inline, so
//! `generate_new_chunk` inserts the chunk before returning and `update` uploads
//! meshes computed in the same call. With workers, results arrive in a later
//! `update` and are checked against per-chunk stamps before they are applied:
//! a chunk removed or re-queued meanwhile simply ignores them.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use web_time::Instant;

use crate::core::MtResource;
use crate::engine_state::config::EngineConfig;
use crate::engine_state::rendering::{
    meshing::{MeshData, Mesher},
    renderer::{MeshHandle, MeshRenderer},
    tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask,
};
use crate::engine_state::task_management::{
    task::{Task, TaskResult},
    TaskManager,
};
use crate::error::{Result, VoxelError};

use super::block::block_bank::BlockBank;
use super::chunk::{attach_neighbors, detach_neighbors, Chunk, ChunkPosition, ChunkState};
use super::generation::Generator;
use super::tasks::chunk_generation_task::ChunkGenerationTask;

/// Pipeline limits for a [`World`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WorldSettings {
    pub max_uploads_per_frame: usize,
    /// 0 runs generation and meshing inline on the caller's thread.
    pub worker_threads: usize,
}

impl Default for WorldSettings {
    fn default() -> Self {
        WorldSettings {
            max_uploads_per_frame: 4,
            worker_threads: 0,
        }
    }
}

/// A point-in-time summary of the pipeline queues.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    pub chunks: usize,
    pub renderable: usize,
    pub pending_generation: usize,
    pub pending_meshes: usize,
    pub pending_uploads: usize,
    pub pending_unloads: usize,
}

/// An upload slot reserved for a chunk's mesh.
#[derive(Copy, Clone, Debug)]
struct UploadTicket {
    position: ChunkPosition,
    stamp: u64,
    revision: u64,
}

/// Represents a voxel world composed of multiple chunks.
///
/// The world is stored as a sparse 3D grid of chunks keyed by chunk position.
/// It is driven from one thread: that thread calls `generate_new_chunk`,
/// `remove_chunk` and `update`, and is the only one that ever sees renderer
/// handles.
pub struct World {
    /// Every loaded chunk.
    chunks: HashMap<ChunkPosition, MtResource<Chunk>>,
    /// Chunks with an uploaded mesh.
    renderable: HashSet<ChunkPosition>,
    /// Requested generations, keyed to the ticket the result must carry.
    pending_generation: HashMap<ChunkPosition, u64>,
    mesh_queue: VecDeque<ChunkPosition>,
    mesh_queued: HashSet<ChunkPosition>,
    meshes_in_flight: usize,
    upload_queue: VecDeque<UploadTicket>,
    unload_queue: Vec<MeshHandle>,
    generator: Arc<dyn Generator>,
    mesher: Arc<dyn Mesher>,
    bank: Arc<BlockBank>,
    tasks: TaskManager,
    max_uploads_per_frame: usize,
    next_ticket: u64,
}

impl World {
    /// Creates an empty world.
    ///
    /// # Errors
    /// - [`VoxelError::EmptyBlockBank`] if `bank` has no types
    /// - [`VoxelError::InvalidConfig`] if `max_uploads_per_frame` is zero
    /// - [`VoxelError::WorkerPool`] if the worker threads cannot be started
    pub fn new(
        bank: impl Into<Arc<BlockBank>>,
        generator: Arc<dyn Generator>,
        mesher: Arc<dyn Mesher>,
        settings: WorldSettings,
    ) -> Result<Self> {
        let bank = bank.into();
        if bank.is_empty() {
            return Err(VoxelError::EmptyBlockBank);
        }
        if settings.max_uploads_per_frame == 0 {
            return Err(VoxelError::InvalidConfig(
                "max_uploads_per_frame must be at least 1".to_string(),
            ));
        }

        log::info!(
            "Creating world: {} generator, {} mesher, {} block types, {} workers",
            generator.name(),
            mesher.name(),
            bank.len(),
            settings.worker_threads
        );

        Ok(World {
            chunks: HashMap::new(),
            renderable: HashSet::new(),
            pending_generation: HashMap::new(),
            mesh_queue: VecDeque::new(),
            mesh_queued: HashSet::new(),
            meshes_in_flight: 0,
            upload_queue: VecDeque::new(),
            unload_queue: Vec::new(),
            generator,
            mesher,
            bank,
            tasks: TaskManager::new(settings.worker_threads)?,
            max_uploads_per_frame: settings.max_uploads_per_frame,
            next_ticket: 0,
        })
    }

    /// Creates a world with the generator, mesher and limits named in `config`.
    pub fn from_config(bank: impl Into<Arc<BlockBank>>, config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Self::new(
            bank,
            config.generator.build(),
            config.mesher.build(),
            WorldSettings {
                max_uploads_per_frame: config.max_uploads_per_frame,
                worker_threads: config.worker_threads,
            },
        )
    }

    pub fn bank(&self) -> &Arc<BlockBank> {
        &self.bank
    }

    pub fn generator_name(&self) -> &'static str {
        self.generator.name()
    }

    pub fn mesher_name(&self) -> &'static str {
        self.mesher.name()
    }

    /// Requests a chunk at `position`.
    ///
    /// Does nothing if the chunk already exists or is already being generated.
    /// Inline worlds generate, link and insert the chunk before returning.
    ///
    /// # Returns
    /// `true` if a generation was started.
    pub fn generate_new_chunk(&mut self, position: ChunkPosition) -> bool {
        if self.chunks.contains_key(&position) || self.pending_generation.contains_key(&position) {
            log::debug!("Chunk {:?} already present, not generating", position);
            return false;
        }

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.pending_generation.insert(position, ticket);

        let task = ChunkGenerationTask::new(position, ticket, self.generator.clone(), self.bank.clone());
        if self.tasks.is_inline() {
            task.process().apply(self);
        } else {
            self.tasks.publish_task(Box::new(task));
        }
        true
    }

    /// Inserts a finished chunk if the world is still waiting for it.
    pub(crate) fn insert_generated(&mut self, position: ChunkPosition, ticket: u64, chunk: Result<Chunk>) {
        if self.pending_generation.get(&position) != Some(&ticket) {
            log::debug!("Dropping stale generation result for {:?}", position);
            return;
        }
        self.pending_generation.remove(&position);

        let mut chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                log::warn!("Failed to generate chunk {:?}: {}", position, e);
                return;
            }
        };
        chunk.stamp = ticket;

        let handle = MtResource::new(chunk);
        self.chunks.insert(position, handle.clone());
        let linked = attach_neighbors(&handle, |p| self.chunks.get(&p).cloned());

        log::debug!("Chunk {:?} generated, {} neighbors linked", position, linked.len());

        self.queue_mesh(position);
        for neighbor in linked {
            self.queue_mesh(neighbor);
        }
    }

    /// Removes the chunk at `position`, or cancels its pending generation.
    ///
    /// The chunk's mesh handle is queued and disposed by the next `update`.
    /// Chunks that were linked to it are queued for remeshing.
    ///
    /// # Returns
    /// `true` if there was a chunk or a pending generation to remove.
    pub fn remove_chunk(&mut self, position: ChunkPosition) -> bool {
        let cancelled = self.pending_generation.remove(&position).is_some();

        let Some(handle) = self.chunks.remove(&position) else {
            if !cancelled {
                log::debug!("No chunk at {:?} to remove", position);
            }
            return cancelled;
        };

        let unlinked = detach_neighbors(&handle);
        self.renderable.remove(&position);
        if self.mesh_queued.remove(&position) {
            self.mesh_queue.retain(|queued| *queued != position);
        }

        {
            let mut chunk = handle.get_mut();
            chunk.pending_mesh_data = None;
            if let Some(mesh) = chunk.mesh.take() {
                self.unload_queue.push(mesh);
            }
        }

        for neighbor in unlinked {
            self.queue_mesh(neighbor);
        }

        log::debug!("Chunk {:?} removed", position);
        true
    }

    /// Cancels a generation that has not produced its chunk yet.
    ///
    /// # Returns
    /// `true` if a generation was pending at `position`.
    pub fn cancel_generation(&mut self, position: ChunkPosition) -> bool {
        self.pending_generation.remove(&position).is_some()
    }

    /// Queues a loaded chunk for (re)meshing.
    ///
    /// Any mesh computed earlier but not yet uploaded is discarded.
    pub fn queue_mesh(&mut self, position: ChunkPosition) {
        let Some(handle) = self.chunks.get(&position) else {
            return;
        };
        {
            let mut chunk = handle.get_mut();
            chunk.mesh_revision += 1;
            chunk.pending_mesh_data = None;
            chunk.state = ChunkState::MeshPending;
        }
        if self.mesh_queued.insert(position) {
            self.mesh_queue.push_back(position);
        }
    }

    /// Records a finished mesh if it was computed against the chunk's current state.
    pub(crate) fn accept_mesh(
        &mut self,
        position: ChunkPosition,
        stamp: u64,
        revision: u64,
        mesh: Option<MeshData>,
    ) {
        self.meshes_in_flight = self.meshes_in_flight.saturating_sub(1);

        let Some(handle) = self.chunks.get(&position) else {
            log::debug!("Dropping mesh for removed chunk {:?}", position);
            return;
        };
        let mut chunk = handle.get_mut();
        if chunk.stamp != stamp || chunk.mesh_revision != revision {
            log::debug!("Dropping stale mesh for chunk {:?}", position);
            return;
        }

        match mesh {
            Some(data) => {
                chunk.pending_mesh_data = Some(data);
                chunk.state = ChunkState::MeshReady;
                self.upload_queue.push_back(UploadTicket {
                    position,
                    stamp,
                    revision,
                });
            }
            None => {
                chunk.state = ChunkState::Generated;
                if let Some(old) = chunk.mesh.take() {
                    self.unload_queue.push(old);
                }
                self.renderable.remove(&position);
            }
        }
    }

    /// Advances the pipeline by one frame: unload, then mesh, then upload.
    ///
    /// Per-chunk failures are logged and skipped; they never abort the frame.
    pub fn update(&mut self, renderer: &mut dyn MeshRenderer) {
        let start = Instant::now();

        let disposed = self.unload_phase(renderer);
        let unload_time = start.elapsed();

        self.apply_completed();
        let dispatched = self.mesh_phase();
        let mesh_time = start.elapsed() - unload_time;

        let uploaded = self.upload_phase(renderer);

        if disposed + dispatched + uploaded > 0 {
            log::debug!(
                "World update: disposed {} ({:?}), meshed {} ({:?}), uploaded {} ({:?} total)",
                disposed,
                unload_time,
                dispatched,
                mesh_time,
                uploaded,
                start.elapsed()
            );
        }
    }

    fn unload_phase(&mut self, renderer: &mut dyn MeshRenderer) -> usize {
        let count = self.unload_queue.len();
        for handle in self.unload_queue.drain(..) {
            renderer.dispose(handle);
        }
        count
    }

    fn apply_completed(&mut self) {
        self.tasks.process_queued_tasks();
        for result in self.tasks.collect_completed() {
            result.apply(self);
        }
    }

    fn mesh_phase(&mut self) -> usize {
        let mut dispatched = 0;
        while let Some(position) = self.mesh_queue.pop_front() {
            self.mesh_queued.remove(&position);
            let Some(handle) = self.chunks.get(&position) else {
                continue;
            };

            let task = ChunkMeshGenerationTask::new(handle.clone(), self.mesher.clone(), self.bank.clone());
            self.tasks.publish_task(Box::new(task));
            self.meshes_in_flight += 1;
            dispatched += 1;
        }

        self.apply_completed();
        dispatched
    }

    fn upload_phase(&mut self, renderer: &mut dyn MeshRenderer) -> usize {
        let mut uploaded = 0;

        while uploaded < self.max_uploads_per_frame {
            let Some(ticket) = self.upload_queue.pop_front() else {
                break;
            };
            let Some(handle) = self.chunks.get(&ticket.position) else {
                continue;
            };

            let mut chunk = handle.get_mut();
            if chunk.stamp != ticket.stamp || chunk.mesh_revision != ticket.revision {
                continue;
            }
            let Some(data) = chunk.pending_mesh_data.take() else {
                continue;
            };

            if let Some(old) = chunk.mesh.take() {
                renderer.dispose(old);
            }

            match renderer.upload(ticket.position, data) {
                Ok(mesh) => {
                    chunk.mesh = Some(mesh);
                    chunk.state = ChunkState::Renderable;
                    self.renderable.insert(ticket.position);
                }
                Err(e) => {
                    log::warn!("Skipping chunk {:?}: {}", ticket.position, e);
                    chunk.state = ChunkState::Generated;
                    self.renderable.remove(&ticket.position);
                }
            }
            uploaded += 1;
        }

        uploaded
    }

    /// Draws every renderable chunk.
    pub fn render(&self, renderer: &mut dyn MeshRenderer) {
        for position in &self.renderable {
            if let Some(mesh) = self.chunks.get(position).and_then(|chunk| chunk.get().mesh) {
                renderer.draw(mesh);
            }
        }
    }

    /// Disposes every mesh handle the world holds, live or queued.
    ///
    /// Chunks stay loaded but drop back to `Generated`.
    pub fn dispose_all(&mut self, renderer: &mut dyn MeshRenderer) {
        self.unload_phase(renderer);
        for handle in self.chunks.values() {
            let mut chunk = handle.get_mut();
            if let Some(mesh) = chunk.mesh.take() {
                renderer.dispose(mesh);
            }
            chunk.pending_mesh_data = None;
            chunk.state = ChunkState::Generated;
        }
        self.renderable.clear();
        self.upload_queue.clear();
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn renderable_count(&self) -> usize {
        self.renderable.len()
    }

    pub fn contains_chunk(&self, position: ChunkPosition) -> bool {
        self.chunks.contains_key(&position)
    }

    pub fn is_pending_generation(&self, position: ChunkPosition) -> bool {
        self.pending_generation.contains_key(&position)
    }

    /// Retrieves the chunk at `position`.
    pub fn chunk(&self, position: ChunkPosition) -> Option<MtResource<Chunk>> {
        self.chunks.get(&position).cloned()
    }

    pub fn chunk_positions(&self) -> impl Iterator<Item = ChunkPosition> + '_ {
        self.chunks.keys().copied()
    }

    pub fn renderable_positions(&self) -> impl Iterator<Item = ChunkPosition> + '_ {
        self.renderable.iter().copied()
    }

    /// Positions whose generation was requested but has not completed.
    pub fn pending_generation_positions(&self) -> impl Iterator<Item = ChunkPosition> + '_ {
        self.pending_generation.keys().copied()
    }

    pub fn pending_upload_count(&self) -> usize {
        self.upload_queue.len()
    }

    /// Chunks queued for meshing plus meshes being computed.
    pub fn pending_mesh_count(&self) -> usize {
        self.mesh_queue.len() + self.meshes_in_flight
    }

    pub fn pending_unload_count(&self) -> usize {
        self.unload_queue.len()
    }

    /// `true` when no work is queued or in flight anywhere in the pipeline.
    pub fn is_idle(&self) -> bool {
        self.pending_generation.is_empty()
            && self.mesh_queue.is_empty()
            && self.meshes_in_flight == 0
            && self.upload_queue.is_empty()
            && self.unload_queue.is_empty()
            && self.tasks.pending_tasks() == 0
    }

    pub fn stats(&self) -> WorldStats {
        WorldStats {
            chunks: self.chunks.len(),
            renderable: self.renderable.len(),
            pending_generation: self.pending_generation.len(),
            pending_meshes: self.pending_mesh_count(),
            pending_uploads: self.upload_queue.len(),
            pending_unloads: self.unload_queue.len(),
        }
    }
}
