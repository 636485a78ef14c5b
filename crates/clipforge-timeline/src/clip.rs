//! Clip types for the timeline.
//!
//! A [`Clip`] is one timed unit of content placed on a track. The shared
//! fields (placement, trim, opacity, volume, transitions) live on the struct;
//! per-variant attributes live in [`ClipKind`], which serializes with a
//! `clip_type` discriminant so documents written by older builds keep loading.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;
use uuid::Uuid;

/// Duration assigned to image clips at creation, in seconds.
pub const IMAGE_DEFAULT_DURATION: f64 = 5.0;

/// Default clip duration in seconds.
pub const DEFAULT_CLIP_DURATION: f64 = 5.0;

/// Default transition duration in seconds.
pub const DEFAULT_TRANSITION_DURATION: f64 = 0.5;

fn default_id() -> Uuid {
    Uuid::new_v4()
}

fn default_duration() -> f64 {
    DEFAULT_CLIP_DURATION
}

fn default_one() -> f64 {
    1.0
}

fn default_transition_duration() -> f64 {
    DEFAULT_TRANSITION_DURATION
}

/// A clip on the timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clip {
    /// Unique clip ID, fixed at creation.
    #[serde(default = "default_id")]
    pub id: Uuid,
    /// Clip name (displayed in UI).
    #[serde(default)]
    pub name: String,
    /// Position on the timeline in seconds.
    #[serde(default)]
    pub start_time: f64,
    /// Duration on the timeline in seconds.
    #[serde(default = "default_duration")]
    pub duration: f64,
    /// Track index within this clip's track list (0 = bottom).
    #[serde(default)]
    pub track: usize,
    /// Seconds into the source media where playback starts.
    #[serde(default)]
    pub trim_start: f64,
    /// Seconds trimmed off the end of the source media.
    #[serde(default)]
    pub trim_end: f64,
    /// Opacity in `[0, 1]`.
    #[serde(default = "default_one")]
    pub opacity: f64,
    /// Volume multiplier, 1.0 = unchanged.
    #[serde(default = "default_one")]
    pub volume: f64,
    /// Named transition applied at the clip's in point.
    #[serde(default)]
    pub transition_in: Option<String>,
    /// Named transition applied at the clip's out point.
    #[serde(default)]
    pub transition_out: Option<String>,
    /// Duration of the in/out transitions in seconds.
    #[serde(default = "default_transition_duration")]
    pub transition_duration: f64,
    /// Variant-specific attributes, tagged with `clip_type`.
    #[serde(flatten)]
    pub kind: ClipKind,
}

/// Per-variant clip attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "clip_type", rename_all = "lowercase")]
pub enum ClipKind {
    Video(VideoAttrs),
    Audio(AudioAttrs),
    Image(ImageAttrs),
    Text(TextAttrs),
}

impl ClipKind {
    /// The `clip_type` tag this variant serializes as.
    pub fn tag(&self) -> &'static str {
        match self {
            ClipKind::Video(_) => "video",
            ClipKind::Audio(_) => "audio",
            ClipKind::Image(_) => "image",
            ClipKind::Text(_) => "text",
        }
    }
}

/// Attributes of a video clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoAttrs {
    /// Path to the source media file.
    pub source_path: String,
    /// Duration of the source media in seconds.
    pub original_duration: f64,
    /// Source resolution (width, height).
    pub resolution: (u32, u32),
    /// Source frame rate.
    pub fps: f64,
    /// Whether the source carries an audio stream.
    pub has_audio: bool,
    /// Uniform scale factor.
    pub scale: f64,
    /// Offset from the frame origin in pixels.
    pub position: (i32, i32),
    /// Rotation in degrees.
    pub rotation: f64,
    /// Brightness adjustment, 0.0 = neutral.
    pub brightness: f64,
    /// Contrast adjustment, 0.0 = neutral.
    pub contrast: f64,
    /// Saturation adjustment, 0.0 = neutral.
    pub saturation: f64,
}

impl Default for VideoAttrs {
    fn default() -> Self {
        Self {
            source_path: String::new(),
            original_duration: 0.0,
            resolution: (1920, 1080),
            fps: 30.0,
            has_audio: true,
            scale: 1.0,
            position: (0, 0),
            rotation: 0.0,
            brightness: 0.0,
            contrast: 0.0,
            saturation: 0.0,
        }
    }
}

/// Attributes of an audio clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioAttrs {
    /// Path to the source media file.
    pub source_path: String,
    /// Duration of the source media in seconds.
    pub original_duration: f64,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Fade-in duration in seconds.
    pub fade_in: f64,
    /// Fade-out duration in seconds.
    pub fade_out: f64,
}

impl Default for AudioAttrs {
    fn default() -> Self {
        Self {
            source_path: String::new(),
            original_duration: 0.0,
            sample_rate: 44100,
            channels: 2,
            fade_in: 0.0,
            fade_out: 0.0,
        }
    }
}

/// Ken Burns pan/zoom parameters for an image clip.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct KenBurns {
    pub start_scale: f64,
    pub end_scale: f64,
    pub start_pos: (i32, i32),
    pub end_pos: (i32, i32),
}

impl Default for KenBurns {
    fn default() -> Self {
        Self {
            start_scale: 1.0,
            end_scale: 1.2,
            start_pos: (0, 0),
            end_pos: (0, 0),
        }
    }
}

/// Attributes of an image clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageAttrs {
    /// Path to the source image file.
    pub source_path: String,
    /// Source resolution (width, height).
    pub resolution: (u32, u32),
    /// Optional Ken Burns pan/zoom.
    pub ken_burns: Option<KenBurns>,
    /// Uniform scale factor.
    pub scale: f64,
    /// Offset from the frame origin in pixels.
    pub position: (i32, i32),
    /// Rotation in degrees.
    pub rotation: f64,
}

impl Default for ImageAttrs {
    fn default() -> Self {
        Self {
            source_path: String::new(),
            resolution: (1920, 1080),
            ken_burns: None,
            scale: 1.0,
            position: (0, 0),
            rotation: 0.0,
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Drop shadow on a text clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextShadow {
    pub color: String,
    pub offset: (i32, i32),
}

impl Default for TextShadow {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            offset: (2, 2),
        }
    }
}

/// Outline on a text clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOutline {
    pub color: String,
    pub width: u32,
}

impl Default for TextOutline {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            width: 2,
        }
    }
}

/// Attributes of a text overlay clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextAttrs {
    /// The literal text to render.
    pub text: String,
    pub font_family: String,
    pub font_size: u32,
    pub font_color: String,
    pub background_color: Option<String>,
    /// Anchor position in pixels (defaults to the center of 1080p).
    pub position: (i32, i32),
    pub alignment: TextAlign,
    pub shadow: Option<TextShadow>,
    pub outline: Option<TextOutline>,
    /// Entry animation name (fade, slide, typewriter).
    pub animation_in: Option<String>,
    /// Exit animation name.
    pub animation_out: Option<String>,
    /// Duration of the in/out animations in seconds.
    pub animation_duration: f64,
}

impl Default for TextAttrs {
    fn default() -> Self {
        Self {
            text: "Text".to_string(),
            font_family: "Arial".to_string(),
            font_size: 48,
            font_color: "#FFFFFF".to_string(),
            background_color: None,
            position: (960, 540),
            alignment: TextAlign::Center,
            shadow: None,
            outline: None,
            animation_in: None,
            animation_out: None,
            animation_duration: DEFAULT_TRANSITION_DURATION,
        }
    }
}

fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl Clip {
    fn with_kind(name: String, kind: ClipKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            start_time: 0.0,
            duration: DEFAULT_CLIP_DURATION,
            track: 0,
            trim_start: 0.0,
            trim_end: 0.0,
            opacity: 1.0,
            volume: 1.0,
            transition_in: None,
            transition_out: None,
            transition_duration: DEFAULT_TRANSITION_DURATION,
            kind,
        }
    }

    /// Create a video clip. The name defaults to the source file's base name.
    pub fn video(source_path: impl Into<String>) -> Self {
        let source_path = source_path.into();
        let name = basename(&source_path);
        Self::with_kind(
            name,
            ClipKind::Video(VideoAttrs {
                source_path,
                ..VideoAttrs::default()
            }),
        )
    }

    /// Create an audio clip. The name defaults to the source file's base name.
    pub fn audio(source_path: impl Into<String>) -> Self {
        let source_path = source_path.into();
        let name = basename(&source_path);
        Self::with_kind(
            name,
            ClipKind::Audio(AudioAttrs {
                source_path,
                ..AudioAttrs::default()
            }),
        )
    }

    /// Create an image clip.
    ///
    /// Image clips always start life with [`IMAGE_DEFAULT_DURATION`]; the
    /// duration is a timeline choice, not derived from the source file.
    pub fn image(source_path: impl Into<String>) -> Self {
        let source_path = source_path.into();
        let name = basename(&source_path);
        let mut clip = Self::with_kind(
            name,
            ClipKind::Image(ImageAttrs {
                source_path,
                ..ImageAttrs::default()
            }),
        );
        clip.duration = IMAGE_DEFAULT_DURATION;
        clip
    }

    /// Create a text overlay clip. The name is the text, truncated to 20
    /// characters.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        let name = if text.chars().count() > 20 {
            let head: String = text.chars().take(20).collect();
            format!("{head}...")
        } else {
            text.clone()
        };
        Self::with_kind(
            name,
            ClipKind::Text(TextAttrs {
                text,
                ..TextAttrs::default()
            }),
        )
    }

    /// Move the clip to a timeline position, in seconds.
    pub fn at(mut self, start_time: f64) -> Self {
        self.start_time = start_time;
        self
    }

    /// Set the clip duration, in seconds.
    pub fn lasting(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Clip end time on the timeline.
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Path to the source media, if this variant has one.
    pub fn source_path(&self) -> Option<&str> {
        match &self.kind {
            ClipKind::Video(v) => Some(&v.source_path),
            ClipKind::Audio(a) => Some(&a.source_path),
            ClipKind::Image(i) => Some(&i.source_path),
            ClipKind::Text(_) => None,
        }
    }

    /// Total order by timeline start, used to keep tracks sorted.
    pub fn cmp_start(&self, other: &Clip) -> Ordering {
        self.start_time.total_cmp(&other.start_time)
    }
}
