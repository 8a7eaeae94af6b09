//! TTL-based sweep of terminal sessions nobody retrieved.

use chrono::Duration as ChronoDuration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::workspace::SessionWorkspace;

use super::tracker::StatusTracker;

/// Configuration for the session reaper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaperConfig {
    /// Enable/disable the reaper. When disabled, sessions live until the
    /// client acknowledges retrieval.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// How often to sweep (seconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// How long a terminal session may sit unretrieved before it is swept
    /// (seconds).
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    60
}

fn default_session_ttl() -> u64 {
    3600 // 1 hour
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            poll_interval_secs: default_poll_interval(),
            session_ttl_secs: default_session_ttl(),
        }
    }
}

/// Background task removing terminal sessions past their TTL.
///
/// A session in `completed` or `error` whose status has not changed for the
/// configured TTL loses its workspace and tracker record. Active sessions are
/// never touched.
pub struct SessionReaper {
    config: ReaperConfig,
    sessions_dir: PathBuf,
    tracker: StatusTracker,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl SessionReaper {
    /// Creates a new reaper.
    pub fn new(config: ReaperConfig, sessions_dir: PathBuf, tracker: StatusTracker) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            sessions_dir,
            tracker,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Starts the sweep loop, if enabled.
    pub fn start(&self) {
        if !self.config.enabled {
            info!("session reaper disabled");
            return;
        }
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("session reaper already running");
            return;
        }

        info!(
            poll_interval_secs = self.config.poll_interval_secs,
            session_ttl_secs = self.config.session_ttl_secs,
            "starting session reaper"
        );

        let tracker = self.tracker.clone();
        let sessions_dir = self.sessions_dir.clone();
        let ttl = ChronoDuration::seconds(self.config.session_ttl_secs as i64);
        let interval = Duration::from_secs(self.config.poll_interval_secs);
        let running = Arc::clone(&self.running);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("session reaper received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        if !running.load(Ordering::SeqCst) {
                            break;
                        }
                        sweep(&tracker, &sessions_dir, ttl).await;
                    }
                }
            }
        });
    }

    /// Stops the sweep loop.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        let _ = self.shutdown_tx.send(());
        info!("session reaper stopped");
    }

    /// Runs one sweep immediately. Returns the number of sessions reaped.
    pub async fn sweep_now(&self) -> usize {
        let ttl = ChronoDuration::seconds(self.config.session_ttl_secs as i64);
        sweep(&self.tracker, &self.sessions_dir, ttl).await
    }
}

/// Removes every terminal session whose status is older than `ttl`.
async fn sweep(tracker: &StatusTracker, sessions_dir: &Path, ttl: ChronoDuration) -> usize {
    let stale = tracker.terminal_sessions_older_than(ttl).await;
    let mut reaped = 0;

    for session_id in stale {
        if let Some(workspace) = SessionWorkspace::open(sessions_dir, &session_id) {
            if let Err(e) = workspace.teardown().await {
                warn!(%session_id, error = %e, "reaper failed to remove workspace, will retry");
                continue;
            }
        }
        tracker.remove(&session_id).await;
        info!(%session_id, "reaped expired session");
        reaped += 1;
    }

    reaped
}
