//! ClipForge Effects - Transition registry
//!
//! Static lookup table mapping symbolic transition names to FFmpeg
//! filter-graph fragments, consumed when rendering a transition between two
//! segments.

pub mod transitions;

pub use transitions::{Transition, TransitionInfo};
