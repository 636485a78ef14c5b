//! Media format classification by file extension.

use std::path::Path;

/// Kind of media a source file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
    Image,
}

/// Supported video container extensions.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm", "wmv", "flv"];

/// Supported audio extensions.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "aac", "ogg", "m4a", "flac"];

/// Supported image extensions.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff"];

/// Classify a file by extension, case-insensitive. `None` for anything
/// the editor cannot import.
pub fn media_kind(path: &Path) -> Option<MediaKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Audio)
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Image)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(media_kind(Path::new("a.mp4")), Some(MediaKind::Video));
        assert_eq!(media_kind(Path::new("b.FLAC")), Some(MediaKind::Audio));
        assert_eq!(media_kind(Path::new("c.JPeG")), Some(MediaKind::Image));
        assert_eq!(media_kind(Path::new("d.docx")), None);
        assert_eq!(media_kind(Path::new("no_extension")), None);
    }
}
