//! # Voxel Task System
//!
//! Tasks related to voxel world generation. They run on the world's worker
//! pool, or inline when the pool has no workers.

pub mod chunk_generation_task;
