//! Transcoder invoker: the external-process boundary.
//!
//! The pipeline never decodes or encodes media in-process. Every transcode is
//! one invocation of an external binary (ffmpeg), executed with an explicit
//! argument vector and judged purely by its exit status; captured stderr is
//! the failure detail when a run fails.
//!
//! The [`Invoker`] trait is the seam the stages are written against, so tests
//! can substitute a scripted implementation (see `crate::testing`).
//!
//! # Example
//!
//! ```ignore
//! use clipmill_core::invoker::{FfmpegInvoker, Invoker, InvokerConfig};
//!
//! let invoker = FfmpegInvoker::with_defaults();
//! invoker.validate().await?;
//!
//! let duration = invoker.probe_duration(Path::new("/work/input/movie.mp4")).await?;
//! println!("duration: {duration}s");
//!
//! invoker.run_checked(&args).await?;
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::InvokerConfig;
pub use error::InvokerError;
pub use ffmpeg::FfmpegInvoker;
pub use traits::Invoker;
pub use types::InvocationOutput;
