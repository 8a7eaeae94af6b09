//! Error types for the invoker module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while invoking the external transcoder.
#[derive(Debug, Error)]
pub enum InvokerError {
    /// FFmpeg binary not found.
    #[error("ffmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// FFprobe binary not found.
    #[error("ffprobe not found at path: {path}")]
    FfprobeNotFound { path: PathBuf },

    /// The process exited with a non-zero status; stderr is carried verbatim.
    #[error("{program} exited with status {code:?}: {stderr}")]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The process did not exit within the configured timeout.
    #[error("transcoder invocation timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Failed to probe a media file.
    #[error("failed to probe media file: {reason}")]
    ProbeFailed { reason: String },

    /// I/O error spawning or collecting the process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl InvokerError {
    /// Creates a probe failure.
    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            reason: reason.into(),
        }
    }
}
