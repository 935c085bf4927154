//! # Voxel World Headless Driver
//!
//! Runs the library's `run()`: streams chunks around a moving viewpoint for a
//! fixed number of frames against a recording renderer and logs the results.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info VOXEL_WORLD_CONFIG=world.json cargo run --release
//! ```

fn main() {
    voxel_world::run();
}
