//! Error types for the adaptive encoding stage.

use std::path::PathBuf;
use thiserror::Error;

use crate::invoker::InvokerError;

/// Per-clip preview failures.
///
/// None of these abort the stage; they are recorded on the clip and the
/// adaptive loop moves on.
#[derive(Debug, Error)]
pub enum GifError {
    /// Every admissible trial duration rendered over budget.
    #[error("no trial duration fits {budget_bytes} bytes for clip {clip}")]
    SizeBudgetUnsatisfiable { clip: PathBuf, budget_bytes: u64 },

    /// The external transcoder invocation failed.
    #[error(transparent)]
    Invocation(#[from] InvokerError),

    /// Could not stat or remove a produced file.
    #[error("preview I/O failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GifError {
    /// Whether this is the budget-exhaustion case (as opposed to an
    /// invocation or I/O failure).
    pub fn is_budget_exhausted(&self) -> bool {
        matches!(self, Self::SizeBudgetUnsatisfiable { .. })
    }
}
