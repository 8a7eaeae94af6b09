//! Adaptive encoding stage: one size-bounded GIF preview per clip.
//!
//! For each clip the encoder searches a descending ladder of trial durations
//! for the longest trim whose rendered GIF fits the byte budget. Every trial
//! is a muted fast re-encode of the trim followed by a two-pass palette
//! encode (constrained `palettegen`, then `paletteuse`). An oversized result
//! is deleted and the next shorter duration is tried; a ladder with no
//! fitting duration marks that clip's preview as failed without touching the
//! rest of the session.

mod config;
mod encoder;
mod error;
mod types;

pub use config::GifConfig;
pub use encoder::GifEncoder;
pub use error::GifError;
pub use types::{FailedPreview, GifReport, ProducedGif};
