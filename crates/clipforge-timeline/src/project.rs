//! Project model: tracks of clips, settings, and media sources.
//!
//! Tracks are plain ordered lists. After every mutation the affected track
//! lists are re-sorted by clip start time; temporal overlap within a track is
//! permitted (compositing decides what overlap means, not the model).

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;
use uuid::Uuid;

use crate::clip::Clip;

/// Tracks of each kind grow on demand up to this cap.
pub const MAX_TRACKS_PER_KIND: usize = 32;

/// Video track lists a new project starts with.
pub const DEFAULT_VIDEO_TRACKS: usize = 3;

/// Audio track lists a new project starts with.
pub const DEFAULT_AUDIO_TRACKS: usize = 2;

/// Which track list a clip is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    /// Flat overlay list, primarily text clips. Track index is ignored.
    Overlay,
}

/// Project export/render settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    /// Output resolution (width, height).
    pub resolution: (u32, u32),
    /// Output frame rate.
    pub fps: f64,
    /// Audio sample rate in Hz.
    pub sample_rate: u32,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            resolution: (1920, 1080),
            fps: 30.0,
            sample_rate: 44100,
        }
    }
}

/// Capability for checking that a media source exists.
///
/// Keeps `add_media_file` testable without touching the real filesystem.
pub trait FileCheck {
    fn exists(&self, path: &Path) -> bool;
}

/// [`FileCheck`] backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskCheck;

impl FileCheck for DiskCheck {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

fn default_name() -> String {
    "Untitled Project".to_string()
}

fn default_video_tracks() -> Vec<Vec<Clip>> {
    vec![Vec::new(); DEFAULT_VIDEO_TRACKS]
}

fn default_audio_tracks() -> Vec<Vec<Clip>> {
    vec![Vec::new(); DEFAULT_AUDIO_TRACKS]
}

fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// A video editing project: all clips, tracks, and settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    #[serde(default = "default_name")]
    pub name: String,
    /// Path the project was last saved to.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub settings: ProjectSettings,
    /// Video track lists, bottom track first.
    #[serde(default = "default_video_tracks")]
    pub video_tracks: Vec<Vec<Clip>>,
    /// Audio track lists.
    #[serde(default = "default_audio_tracks")]
    pub audio_tracks: Vec<Vec<Clip>>,
    /// Flat overlay list (text clips).
    #[serde(default)]
    pub overlay_clips: Vec<Clip>,
    /// RFC 3339 creation timestamp.
    #[serde(default = "now_iso")]
    pub created_at: String,
    /// RFC 3339 timestamp of the last mutation.
    #[serde(default = "now_iso")]
    pub modified_at: String,
    /// Imported media source paths, no duplicates.
    #[serde(default)]
    pub media_files: Vec<String>,
}

impl Default for Project {
    fn default() -> Self {
        Self::new("Untitled Project")
    }
}

impl Project {
    /// Create a new empty project.
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_iso();
        Self {
            name: name.into(),
            path: None,
            settings: ProjectSettings::default(),
            video_tracks: default_video_tracks(),
            audio_tracks: default_audio_tracks(),
            overlay_clips: Vec::new(),
            created_at: now.clone(),
            modified_at: now,
            media_files: Vec::new(),
        }
    }

    /// Total project duration: the maximum clip end time across all tracks
    /// and overlays, 0.0 for an empty project.
    pub fn duration(&self) -> f64 {
        self.all_clips()
            .map(|clip| clip.end_time())
            .fold(0.0, f64::max)
    }

    /// Add a clip to the given track list, growing the list if `track_index`
    /// is beyond its current length. Returns `false` if the index exceeds
    /// [`MAX_TRACKS_PER_KIND`].
    pub fn add_clip(&mut self, mut clip: Clip, kind: TrackKind, track_index: usize) -> bool {
        match kind {
            TrackKind::Video | TrackKind::Audio => {
                if track_index >= MAX_TRACKS_PER_KIND {
                    warn!(track_index, "track index beyond cap, clip not added");
                    return false;
                }
                clip.track = track_index;
                let tracks = match kind {
                    TrackKind::Video => &mut self.video_tracks,
                    _ => &mut self.audio_tracks,
                };
                while tracks.len() <= track_index {
                    tracks.push(Vec::new());
                }
                tracks[track_index].push(clip);
            }
            TrackKind::Overlay => {
                self.overlay_clips.push(clip);
            }
        }
        self.sort_tracks(kind);
        self.touch();
        true
    }

    /// Remove a clip by ID. Searches video tracks, then audio tracks, then
    /// overlays; removes the first match. Returns whether anything was
    /// removed.
    pub fn remove_clip(&mut self, clip_id: Uuid) -> bool {
        let lists = self
            .video_tracks
            .iter_mut()
            .chain(self.audio_tracks.iter_mut())
            .chain(std::iter::once(&mut self.overlay_clips));
        for track in lists {
            if let Some(pos) = track.iter().position(|c| c.id == clip_id) {
                track.remove(pos);
                self.touch();
                return true;
            }
        }
        false
    }

    /// Look up a clip by ID.
    pub fn get_clip(&self, clip_id: Uuid) -> Option<&Clip> {
        self.all_clips().find(|c| c.id == clip_id)
    }

    /// Look up a clip by ID for in-place property edits.
    pub fn get_clip_mut(&mut self, clip_id: Uuid) -> Option<&mut Clip> {
        self.video_tracks
            .iter_mut()
            .chain(self.audio_tracks.iter_mut())
            .flat_map(|track| track.iter_mut())
            .chain(self.overlay_clips.iter_mut())
            .find(|c| c.id == clip_id)
    }

    /// All clips in track order: video tracks first, then audio, then
    /// overlays, each track in start-time order.
    pub fn get_all_clips(&self) -> Vec<&Clip> {
        self.all_clips().collect()
    }

    fn all_clips(&self) -> impl Iterator<Item = &Clip> {
        self.video_tracks
            .iter()
            .chain(self.audio_tracks.iter())
            .flat_map(|track| track.iter())
            .chain(self.overlay_clips.iter())
    }

    /// Register a media source path. Returns `true` iff the file exists on
    /// disk and was not already registered.
    pub fn add_media_file(&mut self, path: impl Into<String>) -> bool {
        self.add_media_file_with(path, &DiskCheck)
    }

    /// [`Project::add_media_file`] with an injectable existence check.
    pub fn add_media_file_with(&mut self, path: impl Into<String>, check: &dyn FileCheck) -> bool {
        let path = path.into();
        if self.media_files.contains(&path) || !check.exists(Path::new(&path)) {
            return false;
        }
        self.media_files.push(path);
        self.touch();
        true
    }

    fn sort_tracks(&mut self, kind: TrackKind) {
        let sort = |tracks: &mut Vec<Vec<Clip>>| {
            for track in tracks {
                track.sort_by(|a, b| a.cmp_start(b));
            }
        };
        match kind {
            TrackKind::Video => sort(&mut self.video_tracks),
            TrackKind::Audio => sort(&mut self.audio_tracks),
            TrackKind::Overlay => self.overlay_clips.sort_by(|a, b| a.cmp_start(b)),
        }
    }

    fn touch(&mut self) {
        self.modified_at = now_iso();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct AlwaysThere;
    impl FileCheck for AlwaysThere {
        fn exists(&self, _: &Path) -> bool {
            true
        }
    }

    struct NeverThere;
    impl FileCheck for NeverThere {
        fn exists(&self, _: &Path) -> bool {
            false
        }
    }

    #[test]
    fn test_empty_project_duration_is_zero() {
        assert_eq!(Project::new("p").duration(), 0.0);
    }

    #[test]
    fn test_track_sorted_after_add() {
        let mut project = Project::new("p");
        for start in [5.0, 1.0, 3.0] {
            assert!(project.add_clip(Clip::video("a.mp4").at(start), TrackKind::Video, 0));
        }
        let starts: Vec<f64> = project.video_tracks[0]
            .iter()
            .map(|c| c.start_time)
            .collect();
        assert_eq!(starts, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_duration_is_max_end_time_across_lists() {
        let mut project = Project::new("p");
        project.add_clip(
            Clip::video("a.mp4").at(0.0).lasting(4.0),
            TrackKind::Video,
            0,
        );
        project.add_clip(
            Clip::audio("b.mp3").at(3.0).lasting(6.0),
            TrackKind::Audio,
            1,
        );
        project.add_clip(
            Clip::text("title").at(8.0).lasting(2.5),
            TrackKind::Overlay,
            0,
        );
        assert_eq!(project.duration(), 10.5);
    }

    #[test]
    fn test_add_clip_grows_track_list() {
        let mut project = Project::new("p");
        assert_eq!(project.video_tracks.len(), DEFAULT_VIDEO_TRACKS);
        assert!(project.add_clip(Clip::video("a.mp4"), TrackKind::Video, 6));
        assert_eq!(project.video_tracks.len(), 7);
        assert_eq!(project.video_tracks[6].len(), 1);
        assert_eq!(project.video_tracks[6][0].track, 6);
    }

    #[test]
    fn test_add_clip_rejects_index_beyond_cap() {
        let mut project = Project::new("p");
        assert!(!project.add_clip(Clip::video("a.mp4"), TrackKind::Video, MAX_TRACKS_PER_KIND));
        assert_eq!(project.video_tracks.len(), DEFAULT_VIDEO_TRACKS);
    }

    #[test]
    fn test_remove_clip_removes_exactly_one() {
        let mut project = Project::new("p");
        let keep = Clip::video("keep.mp4").at(0.0);
        let gone = Clip::audio("gone.mp3").at(1.0);
        let gone_id = gone.id;
        project.add_clip(keep, TrackKind::Video, 0);
        project.add_clip(gone, TrackKind::Audio, 0);

        assert!(project.remove_clip(gone_id));
        assert_eq!(project.get_all_clips().len(), 1);
        assert!(project.get_clip(gone_id).is_none());
    }

    #[test]
    fn test_remove_absent_clip_is_noop() {
        let mut project = Project::new("p");
        project.add_clip(Clip::video("a.mp4"), TrackKind::Video, 0);
        let before = project.get_all_clips().len();
        assert!(!project.remove_clip(Uuid::new_v4()));
        assert_eq!(project.get_all_clips().len(), before);
    }

    #[test]
    fn test_get_clip_and_edit_in_place() {
        let mut project = Project::new("p");
        let clip = Clip::video("a.mp4");
        let id = clip.id;
        project.add_clip(clip, TrackKind::Video, 0);

        project.get_clip_mut(id).unwrap().opacity = 0.5;
        assert_eq!(project.get_clip(id).unwrap().opacity, 0.5);
    }

    #[test]
    fn test_get_all_clips_order() {
        let mut project = Project::new("p");
        project.add_clip(Clip::text("t"), TrackKind::Overlay, 0);
        project.add_clip(Clip::audio("a.mp3"), TrackKind::Audio, 0);
        project.add_clip(Clip::video("v.mp4"), TrackKind::Video, 0);

        let tags: Vec<&str> = project
            .get_all_clips()
            .iter()
            .map(|c| c.kind.tag())
            .collect();
        assert_eq!(tags, vec!["video", "audio", "text"]);
    }

    #[test]
    fn test_add_media_file_dedup_and_existence() {
        let mut project = Project::new("p");
        assert!(project.add_media_file_with("/media/a.mp4", &AlwaysThere));
        assert!(!project.add_media_file_with("/media/a.mp4", &AlwaysThere));
        assert!(!project.add_media_file_with("/media/missing.mp4", &NeverThere));
        assert_eq!(project.media_files, vec!["/media/a.mp4".to_string()]);
    }

    #[test]
    fn test_file_check_is_consulted() {
        struct Counting<'a>(&'a Cell<u32>);
        impl FileCheck for Counting<'_> {
            fn exists(&self, _: &Path) -> bool {
                self.0.set(self.0.get() + 1);
                true
            }
        }
        let calls = Cell::new(0);
        let mut project = Project::new("p");
        project.add_media_file_with("/media/a.mp4", &Counting(&calls));
        assert_eq!(calls.get(), 1);
    }
}
