//! Types for the segmentation stage.

use std::path::PathBuf;

/// One produced clip: an ordered segment of a source video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clip {
    /// Zero-based contiguous index within the session.
    pub index: usize,
    /// Path of the clip file under the session's `output/` directory.
    pub path: PathBuf,
}

impl Clip {
    /// File stem of the clip, used to derive the preview name.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}
