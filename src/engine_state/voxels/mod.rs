//! # Voxel World
//!
//! Block data, chunk storage and the pipeline that turns chunks into meshes.
//!
//! ## Architecture
//!
//! * **Block**: block values, block sides and the registry of block types
//! * **Chunk**: fixed 16x16x16 grids of blocks with links to loaded neighbors
//! * **Generation**: procedural fillers for new chunks
//! * **World**: the chunk lifecycle from generation through upload and unload
//! * **Streaming**: keeps a window of chunks loaded around a moving point
//! * **Tasks**: chunk generation work that can run on the worker pool
//!
//! ## Data Flow
//!
//! 1. Streaming (or a caller) asks the world for a chunk position
//! 2. A generation task fills the chunk and the world links it to its neighbors
//! 3. The chunk and its neighbors are queued for meshing
//! 4. Finished meshes wait in the upload queue until `World::update` hands
//!    them to the renderer, a few per frame
//!
//! ## Thread Safety
//!
//! Chunks are shared with worker tasks through `MtResource`. Workers only read;
//! every write happens on the thread that drives the world.

pub mod block;
pub mod chunk;
pub mod generation;
pub mod streaming;
pub mod tasks;
pub mod world;
