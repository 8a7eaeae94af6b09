//! Concurrency-safe session status tracker.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use super::status::SessionStatus;

/// One tracked session.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// Current status.
    pub status: SessionStatus,
    /// When the session was accepted.
    pub created_at: DateTime<Utc>,
    /// When the status last changed.
    pub updated_at: DateTime<Utc>,
}

/// Shared map of session states.
///
/// Supports any number of concurrent readers (status polling) and one writer
/// per session (that session's worker); writers for different sessions only
/// contend on the map lock itself. Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct StatusTracker {
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
}

impl StatusTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new session in the `starting` state.
    pub async fn insert(&self, session_id: &str) {
        let now = Utc::now();
        let record = SessionRecord {
            status: SessionStatus::Starting,
            created_at: now,
            updated_at: now,
        };
        if self
            .sessions
            .write()
            .await
            .insert(session_id.to_string(), record)
            .is_some()
        {
            warn!(session_id, "session re-registered, previous record replaced");
        }
    }

    /// Applies a forward transition to a session's status.
    ///
    /// Returns `false` without mutating when the session is unknown or the
    /// transition would go backward (including any write after a terminal
    /// state).
    pub async fn update(&self, session_id: &str, status: SessionStatus) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(record) = sessions.get_mut(session_id) else {
            warn!(session_id, "status update for unknown session dropped");
            return false;
        };

        if !record.status.allows_transition_to(&status) {
            warn!(
                session_id,
                from = ?record.status,
                to = ?status,
                "backward status transition refused"
            );
            return false;
        }

        record.status = status;
        record.updated_at = Utc::now();
        true
    }

    /// Current status of a session.
    pub async fn get(&self, session_id: &str) -> Option<SessionStatus> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|r| r.status.clone())
    }

    /// Full record of a session.
    pub async fn get_record(&self, session_id: &str) -> Option<SessionRecord> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Removes a session's record.
    pub async fn remove(&self, session_id: &str) -> Option<SessionRecord> {
        self.sessions.write().await.remove(session_id)
    }

    /// Ids of sessions whose status is terminal and unchanged for at least
    /// `age`. Used by the reaper.
    pub async fn terminal_sessions_older_than(&self, age: Duration) -> Vec<String> {
        let cutoff = Utc::now() - age;
        self.sessions
            .read()
            .await
            .iter()
            .filter(|(_, r)| r.status.is_terminal() && r.updated_at <= cutoff)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Number of tracked sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sessions are tracked.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_get_remove() {
        let tracker = StatusTracker::new();
        tracker.insert("s1").await;

        assert_eq!(tracker.get("s1").await, Some(SessionStatus::Starting));
        assert_eq!(tracker.get("unknown").await, None);

        assert!(tracker.remove("s1").await.is_some());
        assert_eq!(tracker.get("s1").await, None);
    }

    #[tokio::test]
    async fn test_forward_transitions_apply() {
        let tracker = StatusTracker::new();
        tracker.insert("s1").await;

        assert!(
            tracker
                .update("s1", SessionStatus::processing("Creating clips...", 10))
                .await
        );
        assert!(
            tracker
                .update("s1", SessionStatus::processing("Creating GIFs...", 50))
                .await
        );
        assert!(
            tracker
                .update(
                    "s1",
                    SessionStatus::Completed {
                        clips_count: 3,
                        gifs_count: 3
                    }
                )
                .await
        );
    }

    #[tokio::test]
    async fn test_terminal_status_is_frozen() {
        let tracker = StatusTracker::new();
        tracker.insert("s1").await;
        tracker
            .update(
                "s1",
                SessionStatus::Error {
                    message: "boom".to_string(),
                },
            )
            .await;

        assert!(
            !tracker
                .update("s1", SessionStatus::processing("again", 10))
                .await
        );
        assert_eq!(
            tracker.get("s1").await,
            Some(SessionStatus::Error {
                message: "boom".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_update_unknown_session_is_dropped() {
        let tracker = StatusTracker::new();
        assert!(!tracker.update("ghost", SessionStatus::Starting).await);
    }

    #[tokio::test]
    async fn test_terminal_sessions_older_than() {
        let tracker = StatusTracker::new();
        tracker.insert("done").await;
        tracker.insert("busy").await;
        tracker
            .update(
                "done",
                SessionStatus::Completed {
                    clips_count: 1,
                    gifs_count: 1,
                },
            )
            .await;
        tracker
            .update("busy", SessionStatus::processing("Creating clips...", 10))
            .await;

        let stale = tracker.terminal_sessions_older_than(Duration::zero()).await;
        assert_eq!(stale, vec!["done".to_string()]);

        let stale = tracker.terminal_sessions_older_than(Duration::hours(1)).await;
        assert!(stale.is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let tracker = StatusTracker::new();
        let clone = tracker.clone();
        tracker.insert("s1").await;
        assert_eq!(clone.len().await, 1);
    }
}
