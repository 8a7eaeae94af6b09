//! Mock invoker for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::invoker::{InvocationOutput, Invoker, InvokerError};

type Handler = Box<dyn Fn(&[String]) -> Result<InvocationOutput, InvokerError> + Send + Sync>;

/// Mock implementation of the [`Invoker`] trait.
///
/// Provides controllable behavior for testing:
/// - Records every argument vector for assertions
/// - A scripted handler decides each run's outcome and can materialize output
///   files the way ffmpeg would (segments, palettes, GIFs of a chosen size)
/// - Probe durations configurable per path
/// - One-shot error injection
///
/// # Example
///
/// ```rust,ignore
/// use clipmill_core::testing::MockInvoker;
///
/// let invoker = MockInvoker::new();
/// invoker.set_probe_duration("/work/output/movie_part000.mp4", 6.0).await;
/// invoker
///     .set_handler(|argv| {
///         // inspect argv, create output files, return an outcome
///         Ok(MockInvoker::ok_output())
///     })
///     .await;
///
/// // ... run a stage against it ...
///
/// let recorded = invoker.recorded_invocations().await;
/// assert_eq!(recorded.len(), 1);
/// ```
#[derive(Clone)]
pub struct MockInvoker {
    invocations: Arc<RwLock<Vec<Vec<String>>>>,
    handler: Arc<RwLock<Option<Handler>>>,
    probe_durations: Arc<RwLock<HashMap<PathBuf, f64>>>,
    default_probe_duration: Arc<RwLock<f64>>,
    next_error: Arc<RwLock<Option<InvokerError>>>,
}

impl Default for MockInvoker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockInvoker {
    /// Creates a new mock invoker. Without a handler, every run succeeds
    /// with empty output.
    pub fn new() -> Self {
        Self {
            invocations: Arc::new(RwLock::new(Vec::new())),
            handler: Arc::new(RwLock::new(None)),
            probe_durations: Arc::new(RwLock::new(HashMap::new())),
            default_probe_duration: Arc::new(RwLock::new(10.0)),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// A successful empty invocation outcome.
    pub fn ok_output() -> InvocationOutput {
        InvocationOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// A failed invocation outcome with the given stderr.
    pub fn failed_output(exit_code: i32, stderr: impl Into<String>) -> InvocationOutput {
        InvocationOutput {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Installs the handler deciding each run's outcome.
    pub async fn set_handler<F>(&self, handler: F)
    where
        F: Fn(&[String]) -> Result<InvocationOutput, InvokerError> + Send + Sync + 'static,
    {
        *self.handler.write().await = Some(Box::new(handler));
    }

    /// Sets the probed duration for a specific path.
    pub async fn set_probe_duration(&self, path: impl AsRef<Path>, duration_secs: f64) {
        self.probe_durations
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), duration_secs);
    }

    /// Sets the duration reported for paths without a specific entry.
    pub async fn set_default_probe_duration(&self, duration_secs: f64) {
        *self.default_probe_duration.write().await = duration_secs;
    }

    /// Configures the next `run` or `probe_duration` call to fail.
    pub async fn set_next_error(&self, error: InvokerError) {
        *self.next_error.write().await = Some(error);
    }

    /// All argument vectors seen so far, in order.
    pub async fn recorded_invocations(&self) -> Vec<Vec<String>> {
        self.invocations.read().await.clone()
    }

    /// Number of runs performed.
    pub async fn invocation_count(&self) -> usize {
        self.invocations.read().await.len()
    }

    async fn take_error(&self) -> Option<InvokerError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl Invoker for MockInvoker {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run(&self, argv: &[String]) -> Result<InvocationOutput, InvokerError> {
        self.invocations.write().await.push(argv.to_vec());

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        if let Some(handler) = self.handler.read().await.as_ref() {
            return handler(argv);
        }

        Ok(Self::ok_output())
    }

    async fn probe_duration(&self, path: &Path) -> Result<f64, InvokerError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        if let Some(duration) = self.probe_durations.read().await.get(path) {
            return Ok(*duration);
        }

        Ok(*self.default_probe_duration.read().await)
    }

    async fn validate(&self) -> Result<(), InvokerError> {
        Ok(())
    }
}
