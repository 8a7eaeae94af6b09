//! Test doubles for pipeline components.
//!
//! These are real (non-`cfg(test)`) exports so both unit tests and the
//! integration tests under `tests/` can drive the pipeline without a real
//! ffmpeg binary.
//!
//! # Example
//!
//! ```rust,ignore
//! use clipmill_core::testing::MockInvoker;
//!
//! let invoker = MockInvoker::new();
//! invoker.set_probe_duration("/work/output/movie_part000.mp4", 6.0).await;
//!
//! // Use as Arc<dyn Invoker> in stages...
//! ```

mod mock_invoker;

pub use mock_invoker::MockInvoker;
