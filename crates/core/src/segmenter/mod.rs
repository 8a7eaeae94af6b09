//! Segmentation stage: one source video into fixed-duration clips.
//!
//! Each input video is cut into contiguous segments of at most the configured
//! duration, re-encoded with a fast preset, with pixel aspect ratio
//! normalized and per-segment timestamps reset to zero. Cuts land on exact
//! time boundaries (encoder keyframes are forced there), and every produced
//! segment gets a lossless faststart remux so playback can start before the
//! whole file is fetched.
//!
//! An input directory with no videos is a successful no-op producing zero
//! clips.

mod config;
mod error;
mod stage;
mod types;

pub use config::SegmenterConfig;
pub use error::SegmentError;
pub use stage::Segmenter;
pub use types::Clip;
