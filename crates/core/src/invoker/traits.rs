//! Trait definitions for the invoker module.

use async_trait::async_trait;
use std::path::Path;

use super::error::InvokerError;
use super::types::InvocationOutput;

/// Executes external transcoder processes.
///
/// Implementations must be safe to share across concurrently running
/// sessions: every invocation receives all paths through `argv`, so there is
/// no per-call mutable state and no fixed working directory.
#[async_trait]
pub trait Invoker: Send + Sync {
    /// Returns the name of this invoker implementation.
    fn name(&self) -> &str;

    /// Runs the transcoder with the given argument vector, suspending until
    /// the process exits, and returns the captured outcome.
    ///
    /// A non-zero exit is returned as a normal [`InvocationOutput`]; only
    /// spawn/collection failures are errors. Most callers want
    /// [`Invoker::run_checked`].
    async fn run(&self, argv: &[String]) -> Result<InvocationOutput, InvokerError>;

    /// Returns the duration of a media file in seconds.
    async fn probe_duration(&self, path: &Path) -> Result<f64, InvokerError>;

    /// Validates that the invoker is properly configured and ready.
    async fn validate(&self) -> Result<(), InvokerError>;

    /// Runs the transcoder and maps a non-zero exit to
    /// [`InvokerError::CommandFailed`] carrying the captured stderr verbatim.
    async fn run_checked(&self, argv: &[String]) -> Result<InvocationOutput, InvokerError> {
        let output = self.run(argv).await?;
        if !output.success() {
            return Err(InvokerError::CommandFailed {
                program: self.name().to_string(),
                code: Some(output.exit_code),
                stderr: output.stderr,
            });
        }
        Ok(output)
    }
}
