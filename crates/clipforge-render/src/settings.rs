//! Export configuration and the quality-preset registry.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A named output-quality preset.
#[derive(Debug, Clone, Copy)]
pub struct QualityPreset {
    /// Symbolic name used in export requests.
    pub name: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Output resolution (width, height).
    pub resolution: (u32, u32),
    /// Video bitrate, ffmpeg syntax.
    pub bitrate: &'static str,
    /// Output frame rate.
    pub fps: f64,
    /// Video encoder name.
    pub codec: &'static str,
}

/// Every quality preset, in ascending resolution order.
pub const EXPORT_PRESETS: [QualityPreset; 4] = [
    QualityPreset {
        name: "web_hd",
        label: "Web HD (720p)",
        resolution: (1280, 720),
        bitrate: "5M",
        fps: 30.0,
        codec: "libx264",
    },
    QualityPreset {
        name: "full_hd",
        label: "Full HD (1080p)",
        resolution: (1920, 1080),
        bitrate: "10M",
        fps: 30.0,
        codec: "libx264",
    },
    QualityPreset {
        name: "quad_hd",
        label: "Quad HD (1440p)",
        resolution: (2560, 1440),
        bitrate: "20M",
        fps: 30.0,
        codec: "libx264",
    },
    QualityPreset {
        name: "4k",
        label: "4K Ultra HD",
        resolution: (3840, 2160),
        bitrate: "40M",
        fps: 30.0,
        codec: "libx264",
    },
];

/// Look up a quality preset by name.
pub fn preset(name: &str) -> Option<&'static QualityPreset> {
    EXPORT_PRESETS.iter().find(|p| p.name == name)
}

/// Export configuration, constructed fresh per export request. Not persisted
/// with the project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Destination file.
    pub output_path: PathBuf,
    /// Output resolution (width, height).
    pub resolution: (u32, u32),
    /// Output frame rate.
    pub fps: f64,
    /// Video bitrate, ffmpeg syntax (e.g. `10M`).
    pub bitrate: String,
    /// Video encoder name.
    pub codec: String,
    /// Audio encoder name.
    pub audio_codec: String,
    /// Audio bitrate, ffmpeg syntax (e.g. `192k`).
    pub audio_bitrate: String,
    /// x264 speed preset for the final render.
    pub preset: String,
}

impl ExportSettings {
    /// Full HD defaults.
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            resolution: (1920, 1080),
            fps: 30.0,
            bitrate: "10M".to_string(),
            codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "192k".to_string(),
            preset: "medium".to_string(),
        }
    }

    /// Build settings from a named quality preset. Unknown names fall back
    /// to `full_hd`.
    pub fn from_preset(name: &str, output_path: impl Into<PathBuf>) -> Self {
        let chosen = preset(name).unwrap_or(&EXPORT_PRESETS[1]);
        let mut settings = Self::new(output_path);
        settings.resolution = chosen.resolution;
        settings.fps = chosen.fps;
        settings.bitrate = chosen.bitrate.to_string();
        settings.codec = chosen.codec.to_string();
        settings
    }
}
