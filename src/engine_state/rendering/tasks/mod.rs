//! Background tasks for the rendering system.
//!
//! # Available Tasks
//! - `ChunkMeshGenerationTask`: generates mesh data for a chunk on a worker

pub mod chunk_mesh_generation_task;
