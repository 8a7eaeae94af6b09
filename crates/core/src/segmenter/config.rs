//! Configuration for the segmentation stage.

use serde::{Deserialize, Serialize};

/// Configuration for the segmentation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Maximum duration of one clip in seconds; the final clip of a video may
    /// be shorter.
    #[serde(default = "default_max_clip_duration")]
    pub max_clip_duration_secs: u32,

    /// x264 constant rate factor for the re-encode.
    #[serde(default = "default_crf")]
    pub crf: u8,

    /// x264 preset for the re-encode.
    #[serde(default = "default_preset")]
    pub preset: String,

    /// AAC audio bitrate in kbit/s.
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate_kbps: u32,

    /// File extensions (lowercase, without dot) recognized as source videos.
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,
}

fn default_max_clip_duration() -> u32 {
    6
}

fn default_crf() -> u8 {
    18 // near-lossless visually
}

fn default_preset() -> String {
    "ultrafast".to_string()
}

fn default_audio_bitrate() -> u32 {
    128
}

fn default_video_extensions() -> Vec<String> {
    ["mp4", "mov", "avi", "mkv", "webm"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_clip_duration_secs: default_max_clip_duration(),
            crf: default_crf(),
            preset: default_preset(),
            audio_bitrate_kbps: default_audio_bitrate(),
            video_extensions: default_video_extensions(),
        }
    }
}

impl SegmenterConfig {
    /// Sets the maximum clip duration in seconds.
    pub fn with_max_clip_duration(mut self, secs: u32) -> Self {
        self.max_clip_duration_secs = secs;
        self
    }

    /// Whether a file name carries a recognized video extension.
    pub fn is_video_file(&self, file_name: &str) -> bool {
        file_name
            .rsplit_once('.')
            .map(|(_, ext)| {
                let ext = ext.to_ascii_lowercase();
                self.video_extensions.iter().any(|e| *e == ext)
            })
            .unwrap_or(false)
    }
}
