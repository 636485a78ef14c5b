//! ClipForge Core - Foundation types for the editing core
//!
//! Shared error type and result alias used by the timeline model,
//! the media engine, and the render pipeline.

pub mod error;

pub use error::{ClipForgeError, Result};
