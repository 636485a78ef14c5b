//! Media file probing to get metadata without a full decode.
//!
//! Probing is a best-effort query: any parse or invocation failure yields
//! the documented defaults (zero duration, zero resolution, 30 fps) rather
//! than an error. Clip creation never blocks on a probe.

use serde::Deserialize;

/// Frame rate assumed when the source does not report one.
pub const DEFAULT_FPS: f64 = 30.0;

/// Best-effort metadata about a media file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaInfo {
    /// Total duration in seconds, 0.0 if unavailable.
    pub duration: f64,
    /// Video width in pixels, 0 if there is no video stream.
    pub width: u32,
    /// Video height in pixels, 0 if there is no video stream.
    pub height: u32,
    /// Video frame rate, [`DEFAULT_FPS`] if absent.
    pub fps: f64,
}

impl Default for MediaInfo {
    fn default() -> Self {
        Self {
            duration: 0.0,
            width: 0,
            height: 0,
            fps: DEFAULT_FPS,
        }
    }
}

impl MediaInfo {
    /// Parse ffprobe's `-print_format json` output. Anything malformed or
    /// missing falls back to the defaults.
    pub fn parse(json: &str) -> Self {
        serde_json::from_str::<ProbeDocument>(json)
            .map(Self::from_document)
            .unwrap_or_default()
    }

    fn from_document(doc: ProbeDocument) -> Self {
        let duration = doc
            .format
            .duration
            .as_deref()
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0);

        let video = doc
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"));

        let (width, height) = video
            .map(|s| (s.width.unwrap_or(0), s.height.unwrap_or(0)))
            .unwrap_or((0, 0));

        let fps = video
            .and_then(|s| s.r_frame_rate.as_deref())
            .and_then(parse_frame_rate)
            .unwrap_or(DEFAULT_FPS);

        Self {
            duration,
            width,
            height,
            fps,
        }
    }

    /// Video resolution as (width, height).
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether the file carries a video stream.
    pub fn has_video(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Parse an ffprobe frame rate: a rational `num/den` string or a bare number.
fn parse_frame_rate(raw: &str) -> Option<f64> {
    if let Some((num, den)) = raw.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        if den == 0.0 {
            return None;
        }
        return Some(num / den);
    }
    raw.trim().parse().ok()
}

#[derive(Debug, Default, Deserialize)]
struct ProbeDocument {
    #[serde(default)]
    format: ProbeFormat,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeFormat {
    #[serde(default)]
    duration: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    codec_type: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    r_frame_rate: Option<String>,
}
