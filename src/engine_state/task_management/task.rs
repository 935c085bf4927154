//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system.
//!
//! ## Core Components
//! - `Task`: a unit of work that runs on a worker thread (or inline)
//! - `TaskResult`: what the work produced, applied back onto the world
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The world collects the result and calls `apply()` on its own thread
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - `TaskResult` must be `Send` to be transferred back to the calling thread
//! - Tasks own everything they read: chunk handles, snapshots, `Arc`s of the
//!   generator, mesher and bank. They never reach into the world itself.

use crate::engine_state::voxels::world::World;

/// A unit of work that can be executed off the calling thread.
///
/// # Implementation Guidelines
/// - Should be relatively coarse-grained to amortize scheduling overhead
/// - Must not hold references into the world; results carry the stamps the
///   world needs to recognize stale work
pub trait Task: Send {
    /// Processes the task and returns a result.
    ///
    /// Runs on a worker thread when the pool has workers, otherwise inline on
    /// the caller's thread. Errors are carried inside the result, never panicked.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// The result of processing a `Task`.
///
/// Results are applied on the thread that owns the world, so they are the only
/// place background work touches world state or renderer handles.
pub trait TaskResult: Send {
    /// Applies the result to the world.
    ///
    /// Implementations must check that the chunk they were computed for is still
    /// the one the world holds, and drop themselves silently otherwise.
    fn apply(self: Box<Self>, world: &mut World);
}
