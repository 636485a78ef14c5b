//! Project persistence.
//!
//! Projects serialize to a JSON document whose top level carries
//! `name, path, settings, video_tracks, audio_tracks, overlay_clips,
//! created_at, modified_at, media_files`. Missing optional keys fall back to
//! type defaults on load, so documents written by older builds keep working.

use clipforge_core::{ClipForgeError, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::project::Project;

/// Fixed extension for project files.
pub const PROJECT_EXTENSION: &str = "cfproj";

/// Append [`PROJECT_EXTENSION`] unless the path already carries it.
pub fn ensure_extension(path: &Path) -> PathBuf {
    match path.extension() {
        Some(ext) if ext == PROJECT_EXTENSION => path.to_path_buf(),
        _ => {
            let mut name = path.as_os_str().to_os_string();
            name.push(".");
            name.push(PROJECT_EXTENSION);
            PathBuf::from(name)
        }
    }
}

impl Project {
    /// Serialize to a JSON document.
    pub fn to_document(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self)
            .map_err(|e| ClipForgeError::Serialization(format!("failed to serialize project: {e}")))
    }

    /// Reconstruct a project from a JSON document.
    pub fn from_document(doc: serde_json::Value) -> Result<Self> {
        serde_json::from_value(doc)
            .map_err(|e| ClipForgeError::Serialization(format!("failed to parse project: {e}")))
    }

    /// Save to `path`, appending the project extension if absent. Updates
    /// `self.path` and the modification timestamp on success.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = ensure_extension(path.as_ref());
        self.path = Some(path.to_string_lossy().into_owned());
        self.modified_at = chrono::Utc::now().to_rfc3339();

        let doc = self.to_document()?;
        let data = serde_json::to_vec_pretty(&doc)
            .map_err(|e| ClipForgeError::Serialization(format!("failed to encode project: {e}")))?;
        std::fs::write(&path, data)?;

        info!(path = %path.display(), "project saved");
        Ok(())
    }

    /// Load a project from a file. On failure the caller's in-memory state is
    /// untouched; the error describes what went wrong.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let doc: serde_json::Value = serde_json::from_slice(&data)
            .map_err(|e| ClipForgeError::Serialization(format!("invalid project file: {e}")))?;
        let project = Self::from_document(doc)?;
        info!(path = %path.display(), name = %project.name, "project loaded");
        Ok(project)
    }
}
