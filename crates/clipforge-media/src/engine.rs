//! FFmpeg wrapper for media processing operations.
//!
//! The engine treats `ffmpeg`/`ffprobe` as opaque command-line tools: it
//! builds argument lists, spawns the process, and interprets exit status.
//! Every encode-style invocation is blocking and bounded by a configurable
//! timeout; a timed-out invocation is killed and reported as a failure.

use clipforge_core::{ClipForgeError, Result};
use clipforge_effects::Transition;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::probe::MediaInfo;

/// Default bound on a single ffmpeg invocation.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(600);

/// Abstraction over the external processing tool.
///
/// The render pipeline drives everything through this seam, so it can be
/// exercised in tests without ffmpeg installed.
pub trait MediaTool {
    /// Run one tool invocation to completion. `Ok(())` means exit status 0.
    fn run(&self, args: &[String]) -> Result<()>;
}

/// FFmpeg-backed media engine.
pub struct FfmpegEngine {
    ffmpeg: PathBuf,
    ffprobe: Option<PathBuf>,
    timeout: Option<Duration>,
}

fn find_binary(name: &str) -> Option<PathBuf> {
    if let Ok(path) = which::which(name) {
        return Some(path);
    }
    // Common install locations not always on PATH
    let candidates = [
        format!("/usr/local/bin/{name}"),
        format!("/usr/bin/{name}"),
        format!("/opt/homebrew/bin/{name}"),
    ];
    candidates.into_iter().map(PathBuf::from).find(|p| p.exists())
}

impl FfmpegEngine {
    /// Locate ffmpeg and ffprobe. Fails if ffmpeg is missing; a missing
    /// ffprobe only degrades probing to defaults.
    pub fn new() -> Result<Self> {
        let ffmpeg = find_binary("ffmpeg")
            .ok_or_else(|| ClipForgeError::NotFound("ffmpeg not found on this system".into()))?;
        let ffprobe = find_binary("ffprobe");
        if ffprobe.is_none() {
            warn!("ffprobe not found, media probing will return defaults");
        }
        Ok(Self {
            ffmpeg,
            ffprobe,
            timeout: Some(DEFAULT_TOOL_TIMEOUT),
        })
    }

    /// Override the per-invocation timeout. `None` disables the bound.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn wait_bounded(&self, child: &mut Child) -> Result<std::process::ExitStatus> {
        let Some(timeout) = self.timeout else {
            return child.wait().map_err(Into::into);
        };
        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if started.elapsed() >= timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ClipForgeError::Media(format!(
                    "tool timed out after {}s",
                    timeout.as_secs()
                )));
            }
            std::thread::sleep(Duration::from_millis(50));
        }
    }

    /// Run ffmpeg with the given arguments, discarding its output.
    pub fn run_ffmpeg(&self, args: &[String]) -> Result<()> {
        debug!(args = %args.join(" "), "running ffmpeg");
        let mut child = Command::new(&self.ffmpeg)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ClipForgeError::Encoder(format!("failed to spawn ffmpeg: {e}")))?;
        let status = self.wait_bounded(&mut child)?;
        if !status.success() {
            return Err(ClipForgeError::Encoder(format!(
                "ffmpeg exited with status {status}"
            )));
        }
        Ok(())
    }

    /// Probe a media file. Best-effort: any failure, including a probe that
    /// outlives the configured timeout, yields defaults.
    pub fn media_info(&self, path: impl AsRef<Path>) -> MediaInfo {
        let path = path.as_ref();
        let Some(ffprobe) = &self.ffprobe else {
            return MediaInfo::default();
        };
        match self.run_ffprobe(ffprobe, path) {
            Ok(json) => MediaInfo::parse(&json),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ffprobe failed");
                MediaInfo::default()
            }
        }
    }

    /// Run ffprobe under the same timeout bound as ffmpeg invocations and
    /// collect its JSON output.
    fn run_ffprobe(&self, ffprobe: &Path, path: &Path) -> Result<String> {
        let mut child = Command::new(ffprobe)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ClipForgeError::Media(format!("failed to spawn ffprobe: {e}")))?;
        let status = self.wait_bounded(&mut child)?;
        if !status.success() {
            return Err(ClipForgeError::Media(format!(
                "ffprobe exited with status {status}"
            )));
        }
        let mut json = String::new();
        if let Some(mut stdout) = child.stdout.take() {
            stdout.read_to_string(&mut json)?;
        }
        Ok(json)
    }

    /// Media duration in seconds, 0.0 if unavailable.
    pub fn duration(&self, path: impl AsRef<Path>) -> f64 {
        self.media_info(path).duration
    }

    /// Video resolution, (0, 0) if there is no video stream.
    pub fn resolution(&self, path: impl AsRef<Path>) -> (u32, u32) {
        self.media_info(path).resolution()
    }

    /// Video frame rate, 30.0 if absent.
    pub fn frame_rate(&self, path: impl AsRef<Path>) -> f64 {
        self.media_info(path).fps
    }

    /// Trim `[start, end)` out of a file via stream copy (no re-encode).
    pub fn trim(&self, input: &Path, output: &Path, start: f64, end: f64) -> Result<()> {
        self.run_ffmpeg(&trim_args(input, output, start, end))
    }

    /// Concatenate files in order using the concat demuxer with stream copy.
    pub fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        let list = write_concat_list(inputs)?;
        self.run_ffmpeg(&concat_copy_args(list.path(), output))
    }

    /// Remove `[cut_start, cut_end)` from the middle of a file: trim out the
    /// surrounding parts and rejoin them via stream copy.
    pub fn cut(&self, input: &Path, output: &Path, cut_start: f64, cut_end: f64) -> Result<()> {
        if cut_start < 0.0 || cut_end <= cut_start {
            return Err(ClipForgeError::InvalidParameter(format!(
                "invalid cut range {cut_start}..{cut_end}"
            )));
        }
        let total = self.duration(input);
        let scratch = tempfile::tempdir()?;
        let head = scratch.path().join("head.mp4");
        let tail = scratch.path().join("tail.mp4");
        self.trim(input, &head, 0.0, cut_start)?;
        self.trim(input, &tail, cut_end, total)?;
        self.merge(&[head, tail], output)
    }

    /// Rescale a video, copying the audio stream untouched.
    pub fn scale(&self, input: &Path, output: &Path, width: u32, height: u32) -> Result<()> {
        self.run_ffmpeg(&scale_args(input, output, width, height))
    }

    /// Render a still image as a fixed-duration, fixed-frame-rate video.
    pub fn image_to_video(
        &self,
        image: &Path,
        output: &Path,
        duration: f64,
        fps: f64,
    ) -> Result<()> {
        self.run_ffmpeg(&image_to_video_args(image, output, duration, fps))
    }

    /// Extract a single frame at `time`, optionally scaled.
    pub fn extract_frame(
        &self,
        video: &Path,
        time: f64,
        output: &Path,
        size: Option<(u32, u32)>,
    ) -> Result<()> {
        self.run_ffmpeg(&extract_frame_args(video, time, output, size))
    }

    /// Generate a thumbnail from the frame 10% into the video.
    pub fn thumbnail(&self, video: &Path, output: &Path, size: (u32, u32)) -> Result<()> {
        let duration = self.duration(video);
        let time = if duration > 0.0 { duration * 0.1 } else { 0.0 };
        self.extract_frame(video, time, output, Some(size))
    }

    /// Replace a video's audio track with an external audio file.
    pub fn add_audio(
        &self,
        video: &Path,
        audio: &Path,
        output: &Path,
        volume: f64,
    ) -> Result<()> {
        self.run_ffmpeg(&add_audio_args(video, audio, output, volume))
    }

    /// Mix a video's own audio with an external audio file.
    pub fn mix_with_audio(
        &self,
        video: &Path,
        audio: &Path,
        output: &Path,
        video_volume: f64,
        audio_volume: f64,
    ) -> Result<()> {
        self.run_ffmpeg(&mix_with_audio_args(
            video,
            audio,
            output,
            video_volume,
            audio_volume,
        ))
    }

    /// Burn a text overlay into a video, optionally limited to a time window.
    #[allow(clippy::too_many_arguments)]
    pub fn text_overlay(
        &self,
        input: &Path,
        output: &Path,
        text: &str,
        position: (i32, i32),
        font_size: u32,
        font_color: &str,
        window: Option<(f64, f64)>,
    ) -> Result<()> {
        self.run_ffmpeg(&text_overlay_args(
            input, output, text, position, font_size, font_color, window,
        ))
    }

    /// Change playback speed. `atempo` only covers 0.5x–2.0x, so audio speed
    /// is clamped to that range even when the video goes further.
    pub fn speed_change(&self, input: &Path, output: &Path, speed: f64) -> Result<()> {
        if speed <= 0.0 {
            return Err(ClipForgeError::InvalidParameter(format!(
                "speed must be positive, got {speed}"
            )));
        }
        self.run_ffmpeg(&speed_change_args(input, output, speed))
    }

    /// Render a transition between two clips into one output.
    ///
    /// `Fade` fades the first clip out and the second in around a hard cut;
    /// every other transition blends via the registry's `xfade` fragment.
    /// Audio crossfades over the same duration in both cases.
    pub fn apply_transition(
        &self,
        first: &Path,
        second: &Path,
        output: &Path,
        transition: Transition,
        duration: f64,
    ) -> Result<()> {
        let first_duration = self.duration(first);
        self.run_ffmpeg(&transition_args(
            first,
            second,
            output,
            transition,
            duration,
            first_duration,
        ))
    }
}

impl MediaTool for FfmpegEngine {
    fn run(&self, args: &[String]) -> Result<()> {
        self.run_ffmpeg(args)
    }
}

// ── Argument builders ───────────────────────────────────────────

fn trim_args(input: &Path, output: &Path, start: f64, end: f64) -> Vec<String> {
    vec![
        "-y".into(),
        "-ss".into(),
        start.to_string(),
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-t".into(),
        (end - start).to_string(),
        "-c".into(),
        "copy".into(),
        output.to_string_lossy().into_owned(),
    ]
}

fn concat_copy_args(list: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".into(),
        "-f".into(),
        "concat".into(),
        "-safe".into(),
        "0".into(),
        "-i".into(),
        list.to_string_lossy().into_owned(),
        "-c".into(),
        "copy".into(),
        output.to_string_lossy().into_owned(),
    ]
}

fn image_to_video_args(image: &Path, output: &Path, duration: f64, fps: f64) -> Vec<String> {
    vec![
        "-y".into(),
        "-loop".into(),
        "1".into(),
        "-i".into(),
        image.to_string_lossy().into_owned(),
        "-c:v".into(),
        "libx264".into(),
        "-t".into(),
        duration.to_string(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-r".into(),
        fps.to_string(),
        output.to_string_lossy().into_owned(),
    ]
}

fn scale_args(input: &Path, output: &Path, width: u32, height: u32) -> Vec<String> {
    vec![
        "-y".into(),
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-vf".into(),
        format!("scale={width}:{height}"),
        "-c:a".into(),
        "copy".into(),
        output.to_string_lossy().into_owned(),
    ]
}

fn extract_frame_args(
    video: &Path,
    time: f64,
    output: &Path,
    size: Option<(u32, u32)>,
) -> Vec<String> {
    let mut args = vec![
        "-y".into(),
        "-ss".into(),
        time.to_string(),
        "-i".into(),
        video.to_string_lossy().into_owned(),
        "-vframes".into(),
        "1".into(),
    ];
    if let Some((w, h)) = size {
        args.push("-vf".into());
        args.push(format!("scale={w}:{h}"));
    }
    args.push(output.to_string_lossy().into_owned());
    args
}

fn add_audio_args(video: &Path, audio: &Path, output: &Path, volume: f64) -> Vec<String> {
    let mut args = vec![
        "-y".into(),
        "-i".into(),
        video.to_string_lossy().into_owned(),
        "-i".into(),
        audio.to_string_lossy().into_owned(),
        "-c:v".into(),
        "copy".into(),
        "-map".into(),
        "0:v:0".into(),
        "-map".into(),
        "1:a:0".into(),
    ];
    if volume != 1.0 {
        args.push("-af".into());
        args.push(format!("volume={volume}"));
    }
    args.push(output.to_string_lossy().into_owned());
    args
}

fn mix_with_audio_args(
    video: &Path,
    audio: &Path,
    output: &Path,
    video_volume: f64,
    audio_volume: f64,
) -> Vec<String> {
    vec![
        "-y".into(),
        "-i".into(),
        video.to_string_lossy().into_owned(),
        "-i".into(),
        audio.to_string_lossy().into_owned(),
        "-filter_complex".into(),
        format!(
            "[0:a]volume={video_volume}[a1];[1:a]volume={audio_volume}[a2];\
             [a1][a2]amix=inputs=2:duration=first"
        ),
        "-c:v".into(),
        "copy".into(),
        output.to_string_lossy().into_owned(),
    ]
}

/// Escape a caption for the quoted drawtext `text` value.
///
/// The filter-graph parser treats `'` as a quote toggle and `\` as an
/// escape, so a quote inside the caption is emitted as `'\''` (close the
/// quoted run, escaped quote, reopen). Everything else, including `:` and
/// `,`, is literal inside the quoted run.
fn escape_drawtext(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\'' => escaped.push_str("'\\''"),
            '\\' => escaped.push_str("\\\\"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn text_overlay_args(
    input: &Path,
    output: &Path,
    text: &str,
    position: (i32, i32),
    font_size: u32,
    font_color: &str,
    window: Option<(f64, f64)>,
) -> Vec<String> {
    let mut filter = format!(
        "drawtext=text='{}':x={}:y={}:fontsize={font_size}:fontcolor={font_color}",
        escape_drawtext(text),
        position.0,
        position.1
    );
    if let Some((start, end)) = window {
        filter.push_str(&format!(":enable='between(t,{start},{end})'"));
    }
    vec![
        "-y".into(),
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-vf".into(),
        filter,
        "-c:a".into(),
        "copy".into(),
        output.to_string_lossy().into_owned(),
    ]
}

fn speed_change_args(input: &Path, output: &Path, speed: f64) -> Vec<String> {
    let video_pts = 1.0 / speed;
    let audio_tempo = speed.clamp(0.5, 2.0);
    vec![
        "-y".into(),
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-filter_complex".into(),
        format!("[0:v]setpts={video_pts}*PTS[v];[0:a]atempo={audio_tempo}[a]"),
        "-map".into(),
        "[v]".into(),
        "-map".into(),
        "[a]".into(),
        output.to_string_lossy().into_owned(),
    ]
}

fn transition_args(
    first: &Path,
    second: &Path,
    output: &Path,
    transition: Transition,
    duration: f64,
    first_duration: f64,
) -> Vec<String> {
    let video_filter = match transition.xfade_filter(duration, first_duration - duration) {
        Some(xfade) => format!("[0:v][1:v]{xfade}[outv]"),
        None => format!(
            "[0:v]{}[v0];[1:v]{}[v1];[v0][v1]concat=n=2:v=1:a=0[outv]",
            Transition::fade_filter(true, first_duration - duration, duration),
            Transition::fade_filter(false, 0.0, duration),
        ),
    };
    vec![
        "-y".into(),
        "-i".into(),
        first.to_string_lossy().into_owned(),
        "-i".into(),
        second.to_string_lossy().into_owned(),
        "-filter_complex".into(),
        format!("{video_filter};[0:a][1:a]acrossfade=d={duration}[outa]"),
        "-map".into(),
        "[outv]".into(),
        "-map".into(),
        "[outa]".into(),
        output.to_string_lossy().into_owned(),
    ]
}

/// Body of a concat-demuxer file list.
fn concat_list_body(paths: &[PathBuf]) -> String {
    let mut body = String::new();
    for path in paths {
        body.push_str(&format!("file '{}'\n", path.display()));
    }
    body
}

fn write_concat_list(paths: &[PathBuf]) -> Result<tempfile::NamedTempFile> {
    let mut list = tempfile::NamedTempFile::new()?;
    list.write_all(concat_list_body(paths).as_bytes())?;
    list.flush()?;
    Ok(list)
}
