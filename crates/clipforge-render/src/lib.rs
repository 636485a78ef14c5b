//! ClipForge Render - Export pipeline
//!
//! Turns a project snapshot into a single output file by processing each
//! clip into an intermediate segment, compositing the segments, mixing the
//! audio, and muxing the result. Progress is reported through a callback and
//! the run can be cancelled cooperatively from another thread.

pub mod exporter;
pub mod settings;

pub use exporter::{
    CancelHandle, ExportProgress, ExportReport, ExportStatus, Exporter, SkippedClip,
    MIN_FILLER_SECS,
};
pub use settings::{preset, ExportSettings, QualityPreset, EXPORT_PRESETS};
