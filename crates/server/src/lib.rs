//! HTTP service layer over the clipmill pipeline core.
//!
//! Exposed as a library so integration tests can drive the router in-process
//! with mock dependencies injected.

pub mod api;
pub mod state;

pub use api::create_router;
pub use state::AppState;
