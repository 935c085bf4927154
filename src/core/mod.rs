//! # Core Module
//!
//! Concurrency primitives shared by the rest of the engine.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking
//! - `WeakResource`: Non-owning handle to an `MtResource`, used for back-references

pub mod mt_resource;

pub use mt_resource::{MtResource, WeakResource};
