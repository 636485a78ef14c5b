//! Export pipeline: renders a project to a single output file.
//!
//! The pipeline runs strictly sequential phases, each gated by a cancellation
//! check: prepare, per-clip video processing, per-clip audio processing,
//! compositing, audio mixing, final mux, cleanup. A clip that fails to
//! process is skipped (logged and reported, not fatal); compositing and
//! mixing fall back to the first segment on failure; only the final render
//! is fatal.
//!
//! Compositing is sequential concatenation by start time, not true overlay
//! blending. Overlapping clips on different tracks are laid end to end.

use clipforge_core::{ClipForgeError, Result};
use clipforge_media::{FfmpegEngine, MediaTool};
use clipforge_timeline::{Clip, ClipKind, Project, VideoAttrs};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::settings::ExportSettings;

/// Shortest filler clip synthesized for a project with no video segments.
pub const MIN_FILLER_SECS: f64 = 1.0;

/// A progress event delivered to the export callback.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Completion percentage, 0–100. Reset to 0 on hard failure.
    pub percent: f64,
    /// Human-readable status.
    pub message: String,
}

/// Terminal outcome of an export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Completed,
    Cancelled,
    Failed(String),
}

/// A clip omitted from the output because its processing step failed.
#[derive(Debug, Clone)]
pub struct SkippedClip {
    pub clip_id: Uuid,
    pub name: String,
    pub reason: String,
}

/// Result of an export run, including per-clip skip diagnostics.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub status: ExportStatus,
    pub skipped: Vec<SkippedClip>,
}

impl ExportReport {
    /// Whether the export produced the requested output file.
    pub fn success(&self) -> bool {
        self.status == ExportStatus::Completed
    }
}

/// Handle for cancelling an in-progress export.
///
/// Cancellation is cooperative: the flag is polled between clips and between
/// phases. A cancelled export never reports success.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Check if cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// An intermediate artifact produced from one clip, tagged with its intended
/// timeline placement.
#[derive(Debug, Clone)]
struct Segment {
    path: PathBuf,
    start_time: f64,
    duration: f64,
    track: usize,
}

enum Run {
    Completed,
    Cancelled,
}

/// Renders a project snapshot to a single output file.
///
/// The exporter owns a copy of the project taken at construction, so edits
/// made while an export runs do not affect it.
pub struct Exporter<T: MediaTool> {
    project: Project,
    tool: T,
    cancel: CancelHandle,
}

impl Exporter<FfmpegEngine> {
    /// Create an exporter backed by the system ffmpeg.
    pub fn new(project: Project) -> Result<Self> {
        Ok(Self::with_tool(project, FfmpegEngine::new()?))
    }
}

impl<T: MediaTool> Exporter<T> {
    /// Create an exporter driving an arbitrary processing tool.
    pub fn with_tool(project: Project, tool: T) -> Self {
        Self {
            project,
            tool,
            cancel: CancelHandle::new(),
        }
    }

    /// Handle for cancelling this exporter's runs from another thread.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Export the project. Blocking; progress arrives on `on_progress` as
    /// `(percent, message)` events ending at 100 on success or an earlier
    /// failure message with percent reset to 0.
    pub fn export(
        &self,
        settings: &ExportSettings,
        on_progress: impl Fn(ExportProgress),
    ) -> ExportReport {
        self.cancel.reset();
        let mut skipped = Vec::new();
        let status = match self.run_phases(settings, &on_progress, &mut skipped) {
            Ok(Run::Completed) => {
                report(&on_progress, 100.0, "Export complete!");
                ExportStatus::Completed
            }
            Ok(Run::Cancelled) => {
                info!("export cancelled");
                report(&on_progress, 0.0, "Export cancelled");
                ExportStatus::Cancelled
            }
            Err(e) => {
                warn!(error = %e, "export failed");
                report(&on_progress, 0.0, format!("Export failed: {e}"));
                ExportStatus::Failed(e.to_string())
            }
        };
        ExportReport { status, skipped }
    }

    fn run_phases(
        &self,
        settings: &ExportSettings,
        progress: &dyn Fn(ExportProgress),
        skipped: &mut Vec<SkippedClip>,
    ) -> Result<Run> {
        report(progress, 0.0, "Preparing export...");
        let temp = TempDir::new()?;

        report(progress, 5.0, "Processing video clips...");
        let video_segments = self.process_video_tracks(temp.path(), settings, progress, skipped);
        if self.cancel.is_cancelled() {
            return Ok(Run::Cancelled);
        }

        report(progress, 40.0, "Processing audio clips...");
        let audio_segments = self.process_audio_tracks(temp.path(), progress, skipped);
        if self.cancel.is_cancelled() {
            return Ok(Run::Cancelled);
        }

        report(progress, 60.0, "Compositing video layers...");
        let composited = self.composite_video(video_segments, temp.path(), settings)?;
        if self.cancel.is_cancelled() {
            return Ok(Run::Cancelled);
        }

        report(progress, 75.0, "Mixing audio...");
        let mixed = self.mix_audio(audio_segments, temp.path());
        if self.cancel.is_cancelled() {
            return Ok(Run::Cancelled);
        }

        report(progress, 85.0, "Rendering final video...");
        self.final_render(&composited, mixed.as_deref(), settings)?;
        if self.cancel.is_cancelled() {
            return Ok(Run::Cancelled);
        }

        report(progress, 95.0, "Cleaning up...");
        if let Err(e) = temp.close() {
            warn!(error = %e, "failed to remove export temp directory");
        }

        Ok(Run::Completed)
    }

    /// Phase 1: trim, scale, and color-adjust every video-track clip into an
    /// intermediate segment. Image clips become fixed-frame-rate videos.
    /// Failed clips are skipped.
    fn process_video_tracks(
        &self,
        temp: &Path,
        settings: &ExportSettings,
        progress: &dyn Fn(ExportProgress),
        skipped: &mut Vec<SkippedClip>,
    ) -> Vec<Segment> {
        let total: usize = self.project.video_tracks.iter().map(Vec::len).sum();
        let mut processed = 0usize;
        let mut segments = Vec::new();

        for (track_idx, track) in self.project.video_tracks.iter().enumerate() {
            for clip in track {
                if self.cancel.is_cancelled() {
                    return segments;
                }

                let output = temp.join(format!("video_t{track_idx}_{}.mp4", clip.id));
                let result = match &clip.kind {
                    ClipKind::Video(attrs) => {
                        Some(self.tool.run(&video_clip_args(clip, attrs, settings, &output)))
                    }
                    ClipKind::Image(attrs) => Some(self.tool.run(&image_clip_args(
                        &attrs.source_path,
                        clip.duration,
                        settings.fps,
                        &output,
                    ))),
                    _ => None,
                };

                match result {
                    Some(Ok(())) => segments.push(Segment {
                        path: output,
                        start_time: clip.start_time,
                        duration: clip.duration,
                        track: track_idx,
                    }),
                    Some(Err(e)) => {
                        warn!(clip = %clip.name, error = %e, "video clip skipped");
                        skipped.push(SkippedClip {
                            clip_id: clip.id,
                            name: clip.name.clone(),
                            reason: e.to_string(),
                        });
                    }
                    None => {}
                }

                processed += 1;
                let percent = 5.0 + 35.0 * processed as f64 / total.max(1) as f64;
                report(
                    progress,
                    percent,
                    format!("Processing video {processed}/{total}"),
                );
            }
        }
        segments
    }

    /// Phase 2: trim and re-encode every audio-track clip, applying the
    /// clip's volume when it differs from unity.
    fn process_audio_tracks(
        &self,
        temp: &Path,
        progress: &dyn Fn(ExportProgress),
        skipped: &mut Vec<SkippedClip>,
    ) -> Vec<Segment> {
        let total: usize = self.project.audio_tracks.iter().map(Vec::len).sum();
        let mut processed = 0usize;
        let mut segments = Vec::new();

        for (track_idx, track) in self.project.audio_tracks.iter().enumerate() {
            for clip in track {
                if self.cancel.is_cancelled() {
                    return segments;
                }

                if let ClipKind::Audio(attrs) = &clip.kind {
                    let output = temp.join(format!("audio_t{track_idx}_{}.mp3", clip.id));
                    match self
                        .tool
                        .run(&audio_clip_args(clip, &attrs.source_path, &output))
                    {
                        Ok(()) => segments.push(Segment {
                            path: output,
                            start_time: clip.start_time,
                            duration: clip.duration,
                            track: track_idx,
                        }),
                        Err(e) => {
                            warn!(clip = %clip.name, error = %e, "audio clip skipped");
                            skipped.push(SkippedClip {
                                clip_id: clip.id,
                                name: clip.name.clone(),
                                reason: e.to_string(),
                            });
                        }
                    }
                }

                processed += 1;
                let percent = 40.0 + 20.0 * processed as f64 / total.max(1) as f64;
                report(
                    progress,
                    percent,
                    format!("Processing audio {processed}/{total}"),
                );
            }
        }
        segments
    }

    /// Phase 3: concatenate segments in start-time order. With no segments,
    /// synthesize a black filler for the project duration. On concat failure
    /// fall back to the first segment alone.
    fn composite_video(
        &self,
        mut segments: Vec<Segment>,
        temp: &Path,
        settings: &ExportSettings,
    ) -> Result<PathBuf> {
        if segments.is_empty() {
            let duration = self.project.duration().max(MIN_FILLER_SECS);
            let blank = temp.join("blank.mp4");
            self.tool
                .run(&blank_video_args(duration, settings, &blank))?;
            return Ok(blank);
        }

        sort_segments(&mut segments);
        let total: f64 = segments.iter().map(|s| s.duration).sum();
        debug!(count = segments.len(), seconds = total, "concatenating video segments");

        let list_path = temp.join("concat.txt");
        let output = temp.join("composited.mp4");
        let concat = std::fs::write(&list_path, concat_body(&segments))
            .map_err(ClipForgeError::from)
            .and_then(|_| self.tool.run(&concat_args(&list_path, settings, &output)));

        match concat {
            Ok(()) => Ok(output),
            Err(e) => {
                warn!(
                    error = %e,
                    track = segments[0].track,
                    "concatenation failed, falling back to first segment"
                );
                Ok(segments[0].path.clone())
            }
        }
    }

    /// Phase 4: mix audio segments down to one stream. Zero segments yields
    /// no audio track; one passes through; several are mixed with output
    /// duration equal to the longest input. On failure fall back to the
    /// first segment.
    fn mix_audio(&self, mut segments: Vec<Segment>, temp: &Path) -> Option<PathBuf> {
        if segments.is_empty() {
            return None;
        }
        sort_segments(&mut segments);
        if segments.len() == 1 {
            return Some(segments[0].path.clone());
        }

        let output = temp.join("mixed_audio.mp3");
        match self.tool.run(&amix_args(&segments, &output)) {
            Ok(()) => Some(output),
            Err(e) => {
                warn!(
                    error = %e,
                    track = segments[0].track,
                    "audio mix failed, falling back to first segment"
                );
                Some(segments[0].path.clone())
            }
        }
    }

    /// Phase 5: mux the composited video with the mixed audio (if any).
    /// Failure here is fatal to the export.
    fn final_render(
        &self,
        video: &Path,
        audio: Option<&Path>,
        settings: &ExportSettings,
    ) -> Result<()> {
        self.tool
            .run(&final_render_args(video, audio, settings))
            .map_err(|e| ClipForgeError::Encoder(format!("final render failed: {e}")))
    }
}

fn report(progress: &dyn Fn(ExportProgress), percent: f64, message: impl Into<String>) {
    progress(ExportProgress {
        percent,
        message: message.into(),
    });
}

// Track index breaks ties so equal start times across tracks order
// deterministically.
fn sort_segments(segments: &mut [Segment]) {
    segments.sort_by(|a, b| {
        a.start_time
            .total_cmp(&b.start_time)
            .then(a.track.cmp(&b.track))
    });
}

fn concat_body(segments: &[Segment]) -> String {
    let mut body = String::new();
    for segment in segments {
        body.push_str(&format!("file '{}'\n", segment.path.display()));
    }
    body
}

// ── Argument builders ───────────────────────────────────────────

fn video_clip_args(
    clip: &Clip,
    attrs: &VideoAttrs,
    settings: &ExportSettings,
    output: &Path,
) -> Vec<String> {
    let (width, height) = settings.resolution;
    let mut filters = vec![format!("scale={width}:{height}")];
    if attrs.brightness != 0.0 || attrs.contrast != 0.0 || attrs.saturation != 0.0 {
        filters.push(format!(
            "eq=brightness={}:contrast={}:saturation={}",
            attrs.brightness,
            1.0 + attrs.contrast,
            1.0 + attrs.saturation
        ));
    }
    vec![
        "-y".into(),
        "-ss".into(),
        clip.trim_start.to_string(),
        "-i".into(),
        attrs.source_path.clone(),
        "-t".into(),
        clip.duration.to_string(),
        "-vf".into(),
        filters.join(","),
        "-c:v".into(),
        settings.codec.clone(),
        "-b:v".into(),
        settings.bitrate.clone(),
        "-c:a".into(),
        "aac".into(),
        "-preset".into(),
        "fast".into(),
        output.to_string_lossy().into_owned(),
    ]
}

fn image_clip_args(source: &str, duration: f64, fps: f64, output: &Path) -> Vec<String> {
    vec![
        "-y".into(),
        "-loop".into(),
        "1".into(),
        "-i".into(),
        source.to_string(),
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

fn audio_clip_args(clip: &Clip, source: &str, output: &Path) -> Vec<String> {
    let mut args = vec![
        "-y".into(),
        "-ss".into(),
        clip.trim_start.to_string(),
        "-i".into(),
        source.to_string(),
        "-t".into(),
        clip.duration.to_string(),
        "-c:a".into(),
        "libmp3lame".into(),
    ];
    if clip.volume != 1.0 {
        args.push("-af".into());
        args.push(format!("volume={}", clip.volume));
    }
    args.push(output.to_string_lossy().into_owned());
    args
}

fn blank_video_args(duration: f64, settings: &ExportSettings, output: &Path) -> Vec<String> {
    let (width, height) = settings.resolution;
    vec![
        "-y".into(),
        "-f".into(),
        "lavfi".into(),
        "-i".into(),
        format!(
            "color=c=black:s={width}x{height}:d={duration}:r={}",
            settings.fps
        ),
        "-c:v".into(),
        settings.codec.clone(),
        output.to_string_lossy().into_owned(),
    ]
}

fn concat_args(list: &Path, settings: &ExportSettings, output: &Path) -> Vec<String> {
    vec![
        "-y".into(),
        "-f".into(),
        "concat".into(),
        "-safe".into(),
        "0".into(),
        "-i".into(),
        list.to_string_lossy().into_owned(),
        "-c:v".into(),
        settings.codec.clone(),
        "-b:v".into(),
        settings.bitrate.clone(),
        "-c:a".into(),
        "aac".into(),
        output.to_string_lossy().into_owned(),
    ]
}

fn amix_args(segments: &[Segment], output: &Path) -> Vec<String> {
    let mut args = vec!["-y".to_string()];
    let mut filter = String::new();
    for (i, segment) in segments.iter().enumerate() {
        args.push("-i".into());
        args.push(segment.path.to_string_lossy().into_owned());
        filter.push_str(&format!("[{i}:a]"));
    }
    filter.push_str(&format!(
        "amix=inputs={}:duration=longest[out]",
        segments.len()
    ));
    args.extend([
        "-filter_complex".into(),
        filter,
        "-map".into(),
        "[out]".into(),
        "-c:a".into(),
        "libmp3lame".into(),
        output.to_string_lossy().into_owned(),
    ]);
    args
}

fn final_render_args(video: &Path, audio: Option<&Path>, settings: &ExportSettings) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-i".into(),
        video.to_string_lossy().into_owned(),
    ];
    if let Some(audio) = audio {
        args.push("-i".into());
        args.push(audio.to_string_lossy().into_owned());
    }
    args.extend([
        "-c:v".into(),
        settings.codec.clone(),
        "-b:v".into(),
        settings.bitrate.clone(),
        "-preset".into(),
        settings.preset.clone(),
        "-c:a".into(),
        settings.audio_codec.clone(),
        "-b:a".into(),
        settings.audio_bitrate.clone(),
    ]);
    if audio.is_some() {
        args.extend(["-map".into(), "0:v".into(), "-map".into(), "1:a".into()]);
    }
    args.push(settings.output_path.to_string_lossy().into_owned());
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipforge_timeline::TrackKind;
    use std::sync::Mutex;

    /// Recording fake for the external tool. Fails any invocation whose
    /// arguments contain one of `fail_contains`; optionally cancels the
    /// export on its first invocation.
    #[derive(Default)]
    struct FakeTool {
        calls: Mutex<Vec<Vec<String>>>,
        fail_contains: Vec<String>,
        cancel_on_first: Mutex<Option<CancelHandle>>,
    }

    impl FakeTool {
        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }

        fn any_call_contains(&self, needle: &str) -> bool {
            self.calls()
                .iter()
                .any(|call| call.iter().any(|arg| arg.contains(needle)))
        }
    }

    impl MediaTool for &FakeTool {
        fn run(&self, args: &[String]) -> Result<()> {
            self.calls.lock().unwrap().push(args.to_vec());
            if let Some(handle) = self.cancel_on_first.lock().unwrap().take() {
                handle.cancel();
            }
            if args
                .iter()
                .any(|a| self.fail_contains.iter().any(|f| a.contains(f)))
            {
                return Err(ClipForgeError::Encoder("simulated tool failure".into()));
            }
            Ok(())
        }
    }

    fn collect_progress() -> (Arc<Mutex<Vec<(f64, String)>>>, impl Fn(ExportProgress)) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        (events, move |p: ExportProgress| {
            sink.lock().unwrap().push((p.percent, p.message));
        })
    }

    fn settings() -> ExportSettings {
        ExportSettings::new("/tmp/render_target.mp4")
    }

    #[test]
    fn test_empty_project_exports_filler() {
        let tool = FakeTool::default();
        let exporter = Exporter::with_tool(Project::new("empty"), &tool);
        let (events, on_progress) = collect_progress();

        let report = exporter.export(&settings(), on_progress);
        assert!(report.success());
        assert!(report.skipped.is_empty());

        // Filler uses the minimum duration for a zero-length project.
        assert!(tool.any_call_contains("color=c=black:s=1920x1080:d=1:r=30"));
        // Video-only final render: no second input mapped.
        let final_call = tool.calls().last().unwrap().clone();
        assert!(!final_call.contains(&"1:a".to_string()));
        assert!(final_call.contains(&"/tmp/render_target.mp4".to_string()));

        let events = events.lock().unwrap();
        assert_eq!(events.first().unwrap().0, 0.0);
        assert_eq!(events.last().unwrap().0, 100.0);
    }

    #[test]
    fn test_video_clips_are_concatenated_in_start_order() {
        let mut project = Project::new("p");
        for start in [5.0, 1.0, 3.0] {
            project.add_clip(
                Clip::video("/media/a.mp4").at(start).lasting(2.0),
                TrackKind::Video,
                0,
            );
        }
        let tool = FakeTool::default();
        let exporter = Exporter::with_tool(project, &tool);
        let (_, on_progress) = collect_progress();

        let report = exporter.export(&settings(), on_progress);
        assert!(report.success());
        // One invocation per clip, plus concat, plus final render.
        assert_eq!(tool.calls().len(), 5);
        assert!(tool.any_call_contains("concat.txt"));
    }

    #[test]
    fn test_failed_clip_is_skipped_not_fatal() {
        let mut project = Project::new("p");
        project.add_clip(
            Clip::video("/media/good.mp4").at(0.0).lasting(2.0),
            TrackKind::Video,
            0,
        );
        project.add_clip(
            Clip::video("/media/bad.mp4").at(2.0).lasting(2.0),
            TrackKind::Video,
            0,
        );
        let tool = FakeTool {
            fail_contains: vec!["bad.mp4".into()],
            ..FakeTool::default()
        };
        let exporter = Exporter::with_tool(project, &tool);
        let (_, on_progress) = collect_progress();

        let report = exporter.export(&settings(), on_progress);
        assert!(report.success());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].name, "bad.mp4");
    }

    #[test]
    fn test_cancellation_during_video_phase_stops_pipeline() {
        let mut project = Project::new("p");
        for i in 0..3 {
            project.add_clip(
                Clip::video("/media/a.mp4").at(i as f64).lasting(1.0),
                TrackKind::Video,
                0,
            );
        }
        let tool = FakeTool::default();
        let exporter = Exporter::with_tool(project, &tool);
        *tool.cancel_on_first.lock().unwrap() = Some(exporter.cancel_handle());
        let (_, on_progress) = collect_progress();

        let report = exporter.export(&settings(), on_progress);
        assert_eq!(report.status, ExportStatus::Cancelled);
        assert!(!report.success());
        // Cancellation hit between clips; later phases never ran.
        assert!(tool.calls().len() <= 2);
        assert!(!tool.any_call_contains("concat"));
        assert!(!tool.any_call_contains("render_target"));
    }

    #[test]
    fn test_multiple_audio_segments_use_longest_mix() {
        let mut project = Project::new("p");
        project.add_clip(
            Clip::audio("/media/a.mp3").at(0.0).lasting(3.0),
            TrackKind::Audio,
            0,
        );
        project.add_clip(
            Clip::audio("/media/b.mp3").at(0.0).lasting(5.0),
            TrackKind::Audio,
            1,
        );
        let tool = FakeTool::default();
        let exporter = Exporter::with_tool(project, &tool);
        let (_, on_progress) = collect_progress();

        let report = exporter.export(&settings(), on_progress);
        assert!(report.success());
        assert!(tool.any_call_contains("amix=inputs=2:duration=longest"));
        // Mixed audio feeds the final mux.
        let final_call = tool.calls().last().unwrap().clone();
        assert!(final_call.contains(&"1:a".to_string()));
    }

    #[test]
    fn test_single_audio_segment_passes_through() {
        let mut project = Project::new("p");
        project.add_clip(
            Clip::audio("/media/solo.mp3").at(0.0).lasting(4.0),
            TrackKind::Audio,
            0,
        );
        let tool = FakeTool::default();
        let exporter = Exporter::with_tool(project, &tool);
        let (_, on_progress) = collect_progress();

        assert!(exporter.export(&settings(), on_progress).success());
        assert!(!tool.any_call_contains("amix"));
    }

    #[test]
    fn test_concat_failure_falls_back_to_first_segment() {
        let mut project = Project::new("p");
        project.add_clip(
            Clip::video("/media/a.mp4").at(0.0).lasting(2.0),
            TrackKind::Video,
            0,
        );
        project.add_clip(
            Clip::video("/media/b.mp4").at(2.0).lasting(2.0),
            TrackKind::Video,
            0,
        );
        let tool = FakeTool {
            fail_contains: vec!["concat.txt".into()],
            ..FakeTool::default()
        };
        let exporter = Exporter::with_tool(project, &tool);
        let (_, on_progress) = collect_progress();

        let report = exporter.export(&settings(), on_progress);
        assert!(report.success());
        // Final render consumed the first intermediate segment directly.
        let final_call = tool.calls().last().unwrap().clone();
        assert!(final_call.iter().any(|a| a.contains("video_t0_")));
    }

    #[test]
    fn test_final_render_failure_is_fatal() {
        let tool = FakeTool {
            fail_contains: vec!["render_target.mp4".into()],
            ..FakeTool::default()
        };
        let exporter = Exporter::with_tool(Project::new("p"), &tool);
        let (events, on_progress) = collect_progress();

        let report = exporter.export(&settings(), on_progress);
        assert!(matches!(report.status, ExportStatus::Failed(_)));
        assert!(!report.success());

        let events = events.lock().unwrap();
        let (percent, message) = events.last().unwrap();
        assert_eq!(*percent, 0.0);
        assert!(message.starts_with("Export failed"));
    }

    #[test]
    fn test_progress_hits_phase_anchors() {
        let tool = FakeTool::default();
        let exporter = Exporter::with_tool(Project::new("p"), &tool);
        let (events, on_progress) = collect_progress();

        exporter.export(&settings(), on_progress);
        let percents: Vec<f64> = events.lock().unwrap().iter().map(|(p, _)| *p).collect();
        for anchor in [0.0, 5.0, 40.0, 60.0, 75.0, 85.0, 95.0, 100.0] {
            assert!(percents.contains(&anchor), "missing anchor {anchor}");
        }
    }

    #[test]
    fn test_video_args_eq_filter_only_when_adjusted() {
        let clip = Clip::video("/media/a.mp4").lasting(2.0);
        let attrs = match &clip.kind {
            ClipKind::Video(v) => v.clone(),
            _ => unreachable!(),
        };
        let neutral = video_clip_args(&clip, &attrs, &settings(), Path::new("/o.mp4"));
        let vf = neutral.iter().find(|a| a.contains("scale=")).unwrap();
        assert_eq!(vf, "scale=1920:1080");

        let mut adjusted = attrs;
        adjusted.contrast = 0.2;
        let args = video_clip_args(&clip, &adjusted, &settings(), Path::new("/o.mp4"));
        let vf = args.iter().find(|a| a.contains("scale=")).unwrap();
        assert!(vf.contains("eq=brightness=0:contrast=1.2:saturation=1"));
    }

    #[test]
    fn test_audio_args_volume_filter_only_when_not_unity() {
        let mut clip = Clip::audio("/media/a.mp3").lasting(3.0);
        let plain = audio_clip_args(&clip, "/media/a.mp3", Path::new("/o.mp3"));
        assert!(!plain.iter().any(|a| a.starts_with("volume=")));

        clip.volume = 0.5;
        let args = audio_clip_args(&clip, "/media/a.mp3", Path::new("/o.mp3"));
        assert!(args.contains(&"volume=0.5".to_string()));
    }

    #[test]
    fn test_segment_sort_is_by_start_time_then_track() {
        let mut segments = vec![
            Segment {
                path: PathBuf::from("/c"),
                start_time: 5.0,
                duration: 1.0,
                track: 0,
            },
            Segment {
                path: PathBuf::from("/b"),
                start_time: 1.0,
                duration: 1.0,
                track: 1,
            },
            Segment {
                path: PathBuf::from("/a"),
                start_time: 1.0,
                duration: 1.0,
                track: 0,
            },
        ];
        sort_segments(&mut segments);
        assert_eq!(
            concat_body(&segments),
            "file '/a'\nfile '/b'\nfile '/c'\n"
        );
    }
}
