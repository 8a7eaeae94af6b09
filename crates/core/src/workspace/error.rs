//! Error types for the workspace module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while managing a session workspace.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Could not create the session directory tree.
    #[error("failed to create session directory {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not remove the session directory tree.
    #[error("failed to remove session directory {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A user-supplied file name did not survive sanitization.
    #[error("unsafe input file name: {name:?}")]
    UnsafeFileName { name: String },
}
