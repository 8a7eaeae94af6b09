//! Configuration for the adaptive encoding stage.

use serde::{Deserialize, Serialize};

/// Configuration for the adaptive GIF encoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GifConfig {
    /// Hard ceiling for a produced GIF in bytes.
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,

    /// Target frame rate.
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Target width in pixels; height is auto-scaled preserving aspect ratio.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Palette size cap in colors.
    #[serde(default = "default_max_colors")]
    pub max_colors: u32,

    /// Descending trial durations in seconds. The longest admissible entry
    /// that renders within budget wins.
    #[serde(default = "default_trial_durations")]
    pub trial_durations_secs: Vec<u32>,

    /// x264 preset for the trim re-encode.
    #[serde(default = "default_preset")]
    pub preset: String,
}

fn default_max_size_bytes() -> u64 {
    20 * 1024 * 1024 // 20 MB
}

fn default_fps() -> u32 {
    10
}

fn default_width() -> u32 {
    480
}

fn default_max_colors() -> u32 {
    128
}

fn default_trial_durations() -> Vec<u32> {
    vec![7, 6, 5, 4, 3, 2, 1]
}

fn default_preset() -> String {
    "ultrafast".to_string()
}

impl Default for GifConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: default_max_size_bytes(),
            fps: default_fps(),
            width: default_width(),
            max_colors: default_max_colors(),
            trial_durations_secs: default_trial_durations(),
            preset: default_preset(),
        }
    }
}

impl GifConfig {
    /// Sets the size budget in bytes.
    pub fn with_max_size_bytes(mut self, bytes: u64) -> Self {
        self.max_size_bytes = bytes;
        self
    }

    /// Sets the trial duration ladder.
    pub fn with_trial_durations(mut self, durations: Vec<u32>) -> Self {
        self.trial_durations_secs = durations;
        self
    }
}
