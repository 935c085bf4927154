//! # Task Management System
//!
//! This module provides the worker pool that chunk generation and meshing run
//! on. Results are funnelled back over channels and applied on the thread that
//! drives the world, which is the only thread that ever touches renderer
//! handles.
//!
//! ## Architecture Overview
//! - `TaskManager`: central coordinator for task distribution and worker management
//! - `Task`: a unit of work that can be executed on a worker
//! - `TaskResult`: the result of a completed task, applied to the world
//! - `TaskChannel`: communication channel between the calling thread and one worker
//!
//! ## Inline Mode
//! A manager created with zero workers runs every task on the calling thread
//! when `process_queued_tasks()` is called, and hands the results out through
//! `collect_completed()` exactly like a pooled manager would. The world uses
//! the same code path for both.
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The manager distributes tasks to available worker channels using round-robin
//! 3. Workers process tasks and send back results
//! 4. Results are drained on the calling thread with `collect_completed()`
//!
//! ## Example Usage
//! ```ignore
//! let mut task_manager = TaskManager::new(num_workers)?;
//!
//! task_manager.publish_task(Box::new(ChunkGenerationTask::new(...)));
//!
//! // In the update loop:
//! task_manager.process_queued_tasks();
//! for result in task_manager.collect_completed() {
//!     result.apply(&mut world);
//! }
//! ```

pub mod task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use log::info;
use task::{Task, TaskResult};

use crate::error::{Result, VoxelError};

/// A communication channel between the calling thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from the calling thread to the worker
/// - `result_receiver`: Receives task results from the worker
/// - `num_tasks_in_flight`: Tracks number of tasks currently being processed
/// - `worker`: Handle to the worker thread, joined when the manager drops
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// # Fields
/// - `channels`: Set of active worker channels; empty in inline mode
/// - `queued_tasks`: Tasks waiting for an available worker
/// - `completed`: Results produced inline, waiting to be collected
/// - `current_channel`: Index for round-robin scheduling
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    completed: Vec<Box<dyn TaskResult + Send>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Kept small so a slow chunk only holds up its own worker and queued work
/// is handed to whichever worker frees up first.
pub const MAX_TASKS_IN_FLIGHT: usize = 2;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// `num_workers == 0` creates an inline manager that spawns no threads.
    ///
    /// # Errors
    /// [`VoxelError::WorkerPool`] if a worker thread cannot be spawned.
    pub fn new(num_workers: usize) -> Result<Self> {
        let mut channels = Vec::with_capacity(num_workers);

        if num_workers > 0 {
            info!(
                "Starting {} chunk workers, available parallelism: {:?}",
                num_workers,
                thread::available_parallelism()
            );
        }

        for index in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            };

            let worker = thread::Builder::new()
                .name(format!("chunk-worker-{index}"))
                .spawn(task_closure)
                .map_err(|e| VoxelError::WorkerPool(format!("failed to spawn worker {index}: {e}")))?;

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                worker,
            });
        }

        Ok(TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            completed: Vec::new(),
            current_channel: 0,
        })
    }

    /// `true` when tasks run on the calling thread.
    pub fn is_inline(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Tasks published but not yet collected, queued ones included.
    pub fn pending_tasks(&self) -> usize {
        self.queued_tasks.len()
            + self.completed.len()
            + self
                .channels
                .iter()
                .map(|channel| channel.num_tasks_in_flight)
                .sum::<usize>()
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was successfully sent to the worker
    /// - `Err(task)` if the send failed (worker disconnected), handing the task back
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> std::result::Result<(), Box<dyn Task + Send>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => Err(task.0),
        }
    }

    /// Finds an available worker channel that can accept a new task.
    ///
    /// Round-robin starting from the last used channel; channels at
    /// `MAX_TASKS_IN_FLIGHT` are skipped.
    fn find_available_channel(&self) -> Option<usize> {
        if self.channels.is_empty() {
            return None;
        }

        let start_channel = self.current_channel % self.channels.len();
        let mut current = start_channel;

        loop {
            if self.channels[current].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT {
                return Some(current);
            }
            current = (current + 1) % self.channels.len();
            if current == start_channel {
                return None;
            }
        }
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately handed to a worker
    /// - `false` if it was queued (all workers busy, or inline mode)
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    log::warn!("Worker {} is disconnected, queueing task", channel_idx);
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Moves queued tasks onto free workers, or runs them all in inline mode.
    ///
    /// Tasks are dispatched in FIFO order; dispatch stops at the first task no
    /// worker can take.
    pub fn process_queued_tasks(&mut self) {
        if self.is_inline() {
            while let Some(task) = self.queued_tasks.pop_front() {
                self.completed.push(task.process());
            }
            return;
        }

        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    self.queued_tasks.push_front(task);
                    break;
                }
            }
        }
    }

    /// Drains every result that is ready, without blocking.
    pub fn collect_completed(&mut self) -> Vec<Box<dyn TaskResult + Send>> {
        let mut results = std::mem::take(&mut self.completed);

        for (index, channel) in self.channels.iter_mut().enumerate() {
            loop {
                match channel.result_receiver.try_recv() {
                    Ok(result) => {
                        channel.num_tasks_in_flight = channel.num_tasks_in_flight.saturating_sub(1);
                        results.push(result);
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        if channel.num_tasks_in_flight > 0 {
                            log::error!(
                                "Worker {} stopped with {} tasks in flight",
                                index,
                                channel.num_tasks_in_flight
                            );
                            channel.num_tasks_in_flight = 0;
                        }
                        break;
                    }
                }
            }
        }

        results
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        for channel in self.channels.drain(..) {
            let TaskChannel {
                task_sender,
                result_receiver,
                worker,
                ..
            } = channel;
            drop(task_sender);
            drop(result_receiver);
            if worker.join().is_err() {
                log::warn!("A chunk worker panicked before shutdown");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::engine_state::voxels::world::World;

    struct CountingTask {
        counter: Arc<AtomicUsize>,
    }

    struct CountingResult;

    impl Task for CountingTask {
        fn process(&self) -> Box<dyn TaskResult + Send> {
            self.counter.fetch_add(1, Ordering::SeqCst);
            Box::new(CountingResult)
        }
    }

    impl TaskResult for CountingResult {
        fn apply(self: Box<Self>, _world: &mut World) {}
    }

    fn publish(manager: &mut TaskManager, counter: &Arc<AtomicUsize>, count: usize) {
        for _ in 0..count {
            manager.publish_task(Box::new(CountingTask {
                counter: counter.clone(),
            }));
        }
    }

    #[test]
    fn test_inline_manager_runs_on_process() {
        let mut manager = TaskManager::new(0).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        publish(&mut manager, &counter, 5);

        assert!(manager.is_inline());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(manager.pending_tasks(), 5);

        manager.process_queued_tasks();
        assert_eq!(counter.load(Ordering::SeqCst), 5);
        assert_eq!(manager.collect_completed().len(), 5);
        assert_eq!(manager.pending_tasks(), 0);
    }

    #[test]
    fn test_pooled_manager_returns_every_result() {
        let mut manager = TaskManager::new(2).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        publish(&mut manager, &counter, 20);

        let mut collected = 0;
        for _ in 0..2000 {
            manager.process_queued_tasks();
            collected += manager.collect_completed().len();
            if collected == 20 {
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }

        assert_eq!(collected, 20);
        assert_eq!(counter.load(Ordering::SeqCst), 20);
        assert_eq!(manager.pending_tasks(), 0);
    }
}
