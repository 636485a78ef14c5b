//! ClipForge Media - FFmpeg integration
//!
//! This crate handles:
//! - Discovery and invocation of the external ffmpeg/ffprobe binaries
//! - Best-effort media probing (duration, resolution, frame rate)
//! - Per-clip processing operations used by the render pipeline

pub mod engine;
pub mod formats;
pub mod probe;

pub use engine::{FfmpegEngine, MediaTool, DEFAULT_TOOL_TIMEOUT};
pub use formats::{media_kind, MediaKind};
pub use probe::{MediaInfo, DEFAULT_FPS};
