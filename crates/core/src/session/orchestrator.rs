//! Per-session pipeline orchestration.

use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::gif::{GifConfig, GifEncoder};
use crate::invoker::Invoker;
use crate::metrics;
use crate::segmenter::{Segmenter, SegmenterConfig};
use crate::workspace::SessionWorkspace;

use super::status::SessionStatus;
use super::tracker::StatusTracker;

/// Step description while the segmentation stage runs.
const STEP_CLIPS: &str = "Creating clips...";
/// Step description while the adaptive encoding stage runs.
const STEP_GIFS: &str = "Creating GIFs...";

/// Spawns and sequences one worker task per session.
///
/// The runner only sequences stages and propagates status; it never retries a
/// failed stage. There is no cancellation of an in-flight transcoder call: a
/// session runs its current stage to completion once started (the invoker's
/// timeout bounds runaway processes).
#[derive(Clone)]
pub struct SessionRunner {
    invoker: Arc<dyn Invoker>,
    segmenter_config: SegmenterConfig,
    gif_config: GifConfig,
    tracker: StatusTracker,
}

impl SessionRunner {
    /// Creates a new runner.
    pub fn new(
        invoker: Arc<dyn Invoker>,
        segmenter_config: SegmenterConfig,
        gif_config: GifConfig,
        tracker: StatusTracker,
    ) -> Self {
        Self {
            invoker,
            segmenter_config,
            gif_config,
            tracker,
        }
    }

    /// The tracker this runner writes to.
    pub fn tracker(&self) -> &StatusTracker {
        &self.tracker
    }

    /// Spawns the worker task for one session and returns immediately.
    ///
    /// The caller must have registered the session with the tracker (status
    /// `starting`) and placed the source video in the workspace's `input/`.
    /// Workers for different sessions run fully in parallel; within the
    /// session the stages are strictly sequential.
    pub fn spawn(&self, workspace: SessionWorkspace) -> tokio::task::JoinHandle<()> {
        metrics::SESSIONS_STARTED.inc();

        let runner = self.clone();
        tokio::spawn(async move {
            runner.run_session(workspace).await;
        })
    }

    /// Runs the full pipeline for one session, updating status at each
    /// transition. On stage failure the workspace is torn down and the
    /// session parks in the terminal `error` state.
    async fn run_session(&self, workspace: SessionWorkspace) {
        let session_id = workspace.session_id().to_string();

        self.tracker
            .update(&session_id, SessionStatus::processing(STEP_CLIPS, 10))
            .await;

        let segmenter = Segmenter::new(Arc::clone(&self.invoker), self.segmenter_config.clone());
        let segment_start = Instant::now();
        let clips = match segmenter.run(&workspace).await {
            Ok(clips) => {
                metrics::SEGMENT_STAGE_DURATION.observe(segment_start.elapsed().as_secs_f64());
                metrics::CLIPS_PRODUCED.inc_by(clips.len() as u64);
                clips
            }
            Err(e) => {
                self.fail_session(&workspace, format!("segmentation failed: {e}"))
                    .await;
                return;
            }
        };

        self.tracker
            .update(&session_id, SessionStatus::processing(STEP_GIFS, 50))
            .await;

        let encoder = GifEncoder::new(Arc::clone(&self.invoker), self.gif_config.clone());
        let gif_start = Instant::now();
        let report = encoder.run(&workspace, &clips).await;
        metrics::GIF_STAGE_DURATION.observe(gif_start.elapsed().as_secs_f64());

        let clips_count = clips.len();
        let gifs_count = report.gifs_count();
        self.tracker
            .update(
                &session_id,
                SessionStatus::Completed {
                    clips_count,
                    gifs_count,
                },
            )
            .await;
        metrics::SESSIONS_COMPLETED.inc();

        info!(
            %session_id,
            clips_count,
            gifs_count,
            previews_failed = report.failed.len(),
            "session complete"
        );
    }

    async fn fail_session(&self, workspace: &SessionWorkspace, message: String) {
        let session_id = workspace.session_id();
        error!(session_id, error = %message, "session failed");
        metrics::SESSIONS_FAILED.inc();

        // Nothing left to retrieve; reclaim the disk now. The status record
        // stays so the client can observe the failure.
        if let Err(e) = workspace.teardown().await {
            error!(session_id, error = %e, "failed to tear down workspace after error");
        }

        self.tracker
            .update(session_id, SessionStatus::Error { message })
            .await;
    }
}
