//! # Error Types
//!
//! Errors surfaced by the voxel world. Only configuration problems and
//! worker-pool failures ever reach the caller; per-chunk failures inside
//! `World::update` are logged and skipped where they happen.

use thiserror::Error;

use crate::engine_state::voxels::chunk::ChunkPosition;

/// Main error type for the voxel world.
#[derive(Debug, Error)]
pub enum VoxelError {
    /// A generator or world was handed a block bank with no registered types.
    #[error("block bank has no registered block types")]
    EmptyBlockBank,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read configuration: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// The renderer collaborator refused a mesh upload.
    #[error("mesh upload for chunk {position:?} failed: {reason}")]
    Upload {
        position: ChunkPosition,
        reason: String,
    },

    #[error("worker pool error: {0}")]
    WorkerPool(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VoxelError>;
