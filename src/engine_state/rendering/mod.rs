//! Rendering side of the voxel engine.
//!
//! Meshing turns chunks into triangle data, the renderer trait is the seam to
//! whatever owns GPU buffers, and the mesh task runs meshing on the worker pool.

pub mod meshing;
pub mod renderer;
pub mod tasks;
