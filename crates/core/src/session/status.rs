//! Session status model.

use serde::{Deserialize, Serialize};

/// Status of one processing session.
///
/// A tagged union instead of a bag of optional fields: result counts exist
/// only on `Completed`, an error message only on `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
    /// Accepted, worker not yet past intake.
    Starting,
    /// A pipeline stage is running.
    Processing { step: String, progress: u8 },
    /// Both stages finished; output is ready for retrieval.
    Completed { clips_count: usize, gifs_count: usize },
    /// A stage failed; the message is the stage's failure detail.
    Error { message: String },
}

impl SessionStatus {
    /// Shorthand for a processing status.
    pub fn processing(step: impl Into<String>, progress: u8) -> Self {
        Self::Processing {
            step: step.into(),
            progress,
        }
    }

    /// Whether no further transitions may occur.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Error { .. })
    }

    /// Progress percentage for polling clients.
    pub fn progress(&self) -> u8 {
        match self {
            Self::Starting => 0,
            Self::Processing { progress, .. } => *progress,
            Self::Completed { .. } => 100,
            Self::Error { .. } => 0,
        }
    }

    /// Human-readable step description for polling clients.
    pub fn step(&self) -> String {
        match self {
            Self::Starting => "Initializing...".to_string(),
            Self::Processing { step, .. } => step.clone(),
            Self::Completed { .. } => "Done!".to_string(),
            Self::Error { message } => format!("Error: {message}"),
        }
    }

    /// Ordering rank used to enforce forward-only transitions.
    fn phase_rank(&self) -> u8 {
        match self {
            Self::Starting => 0,
            Self::Processing { .. } => 1,
            Self::Completed { .. } | Self::Error { .. } => 2,
        }
    }

    /// Whether moving from `self` to `next` goes forward in the state
    /// machine. Terminal states accept nothing; processing may update its
    /// step/progress but never fall back to starting.
    pub fn allows_transition_to(&self, next: &SessionStatus) -> bool {
        !self.is_terminal() && next.phase_rank() >= self.phase_rank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_tags() {
        let json = serde_json::to_string(&SessionStatus::Starting).unwrap();
        assert_eq!(json, r#"{"status":"starting"}"#);

        let json = serde_json::to_string(&SessionStatus::processing("Creating clips...", 10)).unwrap();
        assert!(json.contains(r#""status":"processing""#));
        assert!(json.contains(r#""step":"Creating clips...""#));

        let json = serde_json::to_string(&SessionStatus::Completed {
            clips_count: 3,
            gifs_count: 2,
        })
        .unwrap();
        assert!(json.contains(r#""status":"completed""#));
        assert!(json.contains(r#""clips_count":3"#));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SessionStatus::Starting.is_terminal());
        assert!(!SessionStatus::processing("x", 50).is_terminal());
        assert!(SessionStatus::Completed {
            clips_count: 0,
            gifs_count: 0
        }
        .is_terminal());
        assert!(SessionStatus::Error {
            message: "boom".to_string()
        }
        .is_terminal());
    }

    #[test]
    fn test_progress_and_step() {
        assert_eq!(SessionStatus::Starting.progress(), 0);
        assert_eq!(SessionStatus::processing("Creating GIFs...", 50).progress(), 50);
        assert_eq!(
            SessionStatus::Completed {
                clips_count: 1,
                gifs_count: 1
            }
            .progress(),
            100
        );
        assert_eq!(
            SessionStatus::Error {
                message: "boom".to_string()
            }
            .progress(),
            0
        );
        assert_eq!(
            SessionStatus::Error {
                message: "boom".to_string()
            }
            .step(),
            "Error: boom"
        );
    }

    #[test]
    fn test_forward_only_transitions() {
        let starting = SessionStatus::Starting;
        let processing = SessionStatus::processing("Creating clips...", 10);
        let completed = SessionStatus::Completed {
            clips_count: 1,
            gifs_count: 1,
        };
        let error = SessionStatus::Error {
            message: "boom".to_string(),
        };

        assert!(starting.allows_transition_to(&processing));
        assert!(starting.allows_transition_to(&error));
        assert!(processing.allows_transition_to(&processing));
        assert!(processing.allows_transition_to(&completed));

        assert!(!processing.allows_transition_to(&starting));
        assert!(!completed.allows_transition_to(&processing));
        assert!(!error.allows_transition_to(&completed));
    }
}
