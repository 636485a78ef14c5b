//! ClipForge Timeline - Timeline data model
//!
//! Implements the editing data model:
//! - Clips (video, audio, image, text) with timing and trim
//! - Projects with sorted track lists and aggregate duration
//! - JSON persistence with the `.cfproj` extension

pub mod clip;
pub mod project;
pub mod serialization;

pub use clip::{
    AudioAttrs, Clip, ClipKind, ImageAttrs, KenBurns, TextAlign, TextAttrs, TextOutline,
    TextShadow, VideoAttrs, IMAGE_DEFAULT_DURATION,
};
pub use project::{
    DiskCheck, FileCheck, Project, ProjectSettings, TrackKind, MAX_TRACKS_PER_KIND,
};
pub use serialization::{ensure_extension, PROJECT_EXTENSION};
