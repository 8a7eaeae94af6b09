//! Session workspace handle.

use std::path::{Path, PathBuf};

use super::error::WorkspaceError;

const INPUT_DIR: &str = "input";
const OUTPUT_DIR: &str = "output";
const TEMP_DIR: &str = "temp";

/// Handle to one session's isolated directory tree.
///
/// Cheap to clone; the handle carries paths, not open file descriptors.
#[derive(Debug, Clone)]
pub struct SessionWorkspace {
    session_id: String,
    root: PathBuf,
}

impl SessionWorkspace {
    /// Creates the workspace for a session, provisioning the `input/`,
    /// `output/` and `temp/` subdirectories.
    ///
    /// Idempotent: an already existing tree is reused as-is.
    pub async fn create(base: &Path, session_id: &str) -> Result<Self, WorkspaceError> {
        let root = base.join(session_id);

        for dir in [&root, &root.join(INPUT_DIR), &root.join(OUTPUT_DIR), &root.join(TEMP_DIR)] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| WorkspaceError::Create {
                    path: dir.clone(),
                    source,
                })?;
        }

        Ok(Self {
            session_id: session_id.to_string(),
            root,
        })
    }

    /// Reattaches to an existing session workspace, if present on disk.
    ///
    /// Used by retrieval and teardown paths that only hold a session id.
    pub fn open(base: &Path, session_id: &str) -> Option<Self> {
        let root = base.join(session_id);
        if root.is_dir() {
            Some(Self {
                session_id: session_id.to_string(),
                root,
            })
        } else {
            None
        }
    }

    /// The session this workspace belongs to.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Root of the session subtree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the uploaded source video.
    pub fn input_dir(&self) -> PathBuf {
        self.root.join(INPUT_DIR)
    }

    /// Directory receiving produced clips and GIFs.
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(OUTPUT_DIR)
    }

    /// Directory for palettes and trim intermediates.
    pub fn temp_dir(&self) -> PathBuf {
        self.root.join(TEMP_DIR)
    }

    /// Joins a user-supplied file name into `input/`, sanitizing it to a safe
    /// leaf name first. Fails if nothing survives sanitization.
    pub fn input_path(&self, file_name: &str) -> Result<PathBuf, WorkspaceError> {
        let safe = sanitize_file_name(file_name).ok_or_else(|| WorkspaceError::UnsafeFileName {
            name: file_name.to_string(),
        })?;
        Ok(self.input_dir().join(safe))
    }

    /// Recursively removes the session subtree.
    ///
    /// Safe to call after a failed run; a subtree that is already gone is not
    /// an error.
    pub async fn teardown(&self) -> Result<(), WorkspaceError> {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(WorkspaceError::Remove {
                path: self.root.clone(),
                source,
            }),
        }
    }
}

/// Reduces a user-supplied file name to a safe leaf name.
///
/// Takes the final path component, replaces anything outside
/// `[A-Za-z0-9._-]` with `_`, and strips leading/trailing dots and
/// underscores. Returns `None` when nothing usable remains.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let leaf = name.rsplit(['/', '\\']).next().unwrap_or("");

    let cleaned: String = leaf
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
