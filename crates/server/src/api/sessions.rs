//! Session API handlers: upload intake, status polling, result retrieval
//! and the transfer-complete acknowledgment.

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use clipmill_core::{sanitize_file_name, SessionStatus, SessionWorkspace};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response for an accepted upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub session_id: String,
    pub message: String,
}

/// Response for status polling
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub step: String,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clips_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gifs_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&SessionStatus> for StatusResponse {
    fn from(status: &SessionStatus) -> Self {
        let (tag, clips_count, gifs_count, error) = match status {
            SessionStatus::Starting => ("starting", None, None, None),
            SessionStatus::Processing { .. } => ("processing", None, None, None),
            SessionStatus::Completed {
                clips_count,
                gifs_count,
            } => ("completed", Some(*clips_count), Some(*gifs_count), None),
            SessionStatus::Error { message } => ("error", None, None, Some(message.clone())),
        };
        Self {
            status: tag,
            step: status.step(),
            progress: status.progress(),
            clips_count,
            gifs_count,
            error,
        }
    }
}

/// One retrievable output artifact
#[derive(Debug, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub size_bytes: u64,
}

/// Response listing a completed session's artifacts
#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub session_id: String,
    pub files: Vec<FileEntry>,
}

/// Response for the completion acknowledgment
#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    pub session_id: String,
    pub message: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn session_not_found() -> ApiError {
    api_error(StatusCode::NOT_FOUND, "Session not found")
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/sessions
///
/// Accepts a multipart upload (field `video`), provisions the session
/// workspace, saves the input and starts the pipeline worker. Returns
/// immediately with the session id for polling.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("video") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("").to_string();
        let bytes = field.bytes().await.map_err(|e| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("Failed to read upload: {e}"),
            )
        })?;
        upload = Some((file_name, bytes.to_vec()));
    }

    let Some((file_name, bytes)) = upload else {
        return Err(api_error(StatusCode::BAD_REQUEST, "No video file provided"));
    };
    if file_name.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "No file selected"));
    }
    if !state.config().segmenter.is_video_file(&file_name) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!(
                "Invalid file type. Allowed: {}",
                state.config().segmenter.video_extensions.join(", ")
            ),
        ));
    }

    let session_id = Uuid::new_v4().to_string();
    let workspace = SessionWorkspace::create(state.sessions_dir(), &session_id)
        .await
        .map_err(|e| {
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to create session workspace: {e}"),
            )
        })?;

    let input_path = workspace
        .input_path(&file_name)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
    tokio::fs::write(&input_path, &bytes).await.map_err(|e| {
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to save upload: {e}"),
        )
    })?;

    state.tracker().insert(&session_id).await;
    state.runner().spawn(workspace);

    info!(%session_id, %file_name, "upload accepted, processing started");
    Ok(Json(UploadResponse {
        session_id,
        message: "Processing started".to_string(),
    }))
}

/// GET /api/v1/sessions/{id}/status
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    match state.tracker().get(&session_id).await {
        Some(status) => Ok(Json(StatusResponse::from(&status))),
        None => Err(session_not_found()),
    }
}

/// GET /api/v1/sessions/{id}/files
///
/// Lists the output artifacts of a completed session.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<FileListResponse>, ApiError> {
    let workspace = completed_workspace(&state, &session_id).await?;

    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(workspace.output_dir()).await.map_err(|e| {
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to read session output: {e}"),
        )
    })?;
    while let Ok(Some(entry)) = entries.next_entry().await {
        if let Ok(meta) = entry.metadata().await {
            if meta.is_file() {
                files.push(FileEntry {
                    name: entry.file_name().to_string_lossy().to_string(),
                    size_bytes: meta.len(),
                });
            }
        }
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Json(FileListResponse { session_id, files }))
}

/// GET /api/v1/sessions/{id}/files/{name}
///
/// Serves one output artifact of a completed session.
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path((session_id, name)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let workspace = completed_workspace(&state, &session_id).await?;

    let safe_name = sanitize_file_name(&name)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Invalid file name"))?;
    let path = workspace.output_dir().join(&safe_name);

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| api_error(StatusCode::NOT_FOUND, "File not found"))?;

    let content_type = match path.extension().and_then(|e| e.to_str()) {
        Some("gif") => "image/gif",
        Some("mp4") => "video/mp4",
        _ => "application/octet-stream",
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{safe_name}\""),
        )
        .body(Body::from(bytes))
        .map_err(|e| {
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to build response: {e}"),
            )
        })
}

/// POST /api/v1/sessions/{id}/complete
///
/// The client's transfer-complete acknowledgment: tears down the session's
/// workspace and drops its status record. Only terminal sessions can be
/// completed; an in-flight worker still owns its workspace.
pub async fn complete(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<CompleteResponse>, ApiError> {
    let Some(status) = state.tracker().get(&session_id).await else {
        return Err(session_not_found());
    };
    if !status.is_terminal() {
        return Err(api_error(StatusCode::CONFLICT, "Processing not complete"));
    }

    if let Some(workspace) = SessionWorkspace::open(state.sessions_dir(), &session_id) {
        if let Err(e) = workspace.teardown().await {
            warn!(%session_id, error = %e, "failed to tear down workspace on completion");
            return Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to clean up session: {e}"),
            ));
        }
    }
    state.tracker().remove(&session_id).await;

    info!(%session_id, "session retrieved and cleaned up");
    Ok(Json(CompleteResponse {
        session_id,
        message: "Session cleaned up".to_string(),
    }))
}

/// Resolves a session that must be in the completed state and still have a
/// workspace on disk.
async fn completed_workspace(
    state: &AppState,
    session_id: &str,
) -> Result<SessionWorkspace, ApiError> {
    let Some(status) = state.tracker().get(session_id).await else {
        return Err(session_not_found());
    };
    if !matches!(status, SessionStatus::Completed { .. }) {
        return Err(api_error(StatusCode::CONFLICT, "Processing not complete"));
    }

    SessionWorkspace::open(state.sessions_dir(), session_id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Session files not found"))
}
