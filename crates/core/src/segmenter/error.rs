//! Error types for the segmentation stage.

use std::path::PathBuf;
use thiserror::Error;

use crate::invoker::InvokerError;

/// Errors that abort the segmentation stage.
///
/// Any of these is fatal to the owning session; the invoker variant carries
/// the transcoder's stderr verbatim through its display impl.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// The external transcoder invocation failed.
    #[error(transparent)]
    Invocation(#[from] InvokerError),

    /// Could not enumerate or move files in the session workspace.
    #[error("segmentation I/O failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
