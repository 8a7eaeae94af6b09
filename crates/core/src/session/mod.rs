//! Session lifecycle: status model, tracker, orchestrator and reaper.
//!
//! One accepted upload is one session. A session's worker task runs the two
//! pipeline stages strictly in sequence and is the only writer of that
//! session's status; the polling interface reads concurrently through the
//! [`StatusTracker`]. Status moves forward only:
//!
//! ```text
//! starting -> processing -> { completed | error }
//! ```
//!
//! `completed` and `error` are terminal. The [`SessionReaper`] sweeps
//! terminal sessions nobody retrieved, bounding disk growth.

mod orchestrator;
mod reaper;
mod status;
mod tracker;

pub use orchestrator::SessionRunner;
pub use reaper::{ReaperConfig, SessionReaper};
pub use status::SessionStatus;
pub use tracker::{SessionRecord, StatusTracker};
