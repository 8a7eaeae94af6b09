//! FFmpeg-based invoker implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use super::config::InvokerConfig;
use super::error::InvokerError;
use super::traits::Invoker;
use super::types::InvocationOutput;

/// FFmpeg-based invoker implementation.
///
/// Stateless apart from its configuration; any number of sessions may invoke
/// it concurrently.
pub struct FfmpegInvoker {
    config: InvokerConfig,
}

impl FfmpegInvoker {
    /// Creates a new FFmpeg invoker with the given configuration.
    pub fn new(config: InvokerConfig) -> Self {
        Self { config }
    }

    /// Creates an invoker with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(InvokerConfig::default())
    }

    /// Parses ffprobe JSON output into a duration in seconds.
    fn parse_probe_duration(output: &str) -> Result<f64, InvokerError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            format: ProbeFormat,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            duration: Option<String>,
        }

        let probe: ProbeOutput = serde_json::from_str(output)
            .map_err(|e| InvokerError::probe_failed(format!("failed to parse ffprobe output: {e}")))?;

        probe
            .format
            .duration
            .as_deref()
            .and_then(|d| d.parse::<f64>().ok())
            .ok_or_else(|| InvokerError::probe_failed("ffprobe output has no duration"))
    }
}

#[async_trait]
impl Invoker for FfmpegInvoker {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    /// Runs ffmpeg with the given argument vector.
    ///
    /// The configured log level and `-hide_banner` are prepended as global
    /// options; everything else comes from the caller. If the process does
    /// not exit within the configured timeout it is killed and
    /// [`InvokerError::Timeout`] is returned.
    async fn run(&self, argv: &[String]) -> Result<InvocationOutput, InvokerError> {
        let child = Command::new(&self.config.ffmpeg_path)
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg(&self.config.ffmpeg_log_level)
            .args(argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    InvokerError::FfmpegNotFound {
                        path: self.config.ffmpeg_path.clone(),
                    }
                } else {
                    InvokerError::Io(e)
                }
            })?;

        // Dropping the future on timeout drops the child handle, which kills
        // the process via kill_on_drop.
        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let output = match timeout(timeout_duration, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(InvokerError::Io(e)),
            Err(_) => {
                return Err(InvokerError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                })
            }
        };

        Ok(InvocationOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    async fn probe_duration(&self, path: &Path) -> Result<f64, InvokerError> {
        let output = Command::new(&self.config.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_format"])
            .arg(path)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    InvokerError::FfprobeNotFound {
                        path: self.config.ffprobe_path.clone(),
                    }
                } else {
                    InvokerError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(InvokerError::probe_failed(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_probe_duration(&stdout)
    }

    async fn validate(&self) -> Result<(), InvokerError> {
        let ffmpeg_result = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await;

        if let Err(e) = ffmpeg_result {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(InvokerError::FfmpegNotFound {
                    path: self.config.ffmpeg_path.clone(),
                });
            }
            return Err(InvokerError::Io(e));
        }

        let ffprobe_result = Command::new(&self.config.ffprobe_path)
            .arg("-version")
            .output()
            .await;

        if let Err(e) = ffprobe_result {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(InvokerError::FfprobeNotFound {
                    path: self.config.ffprobe_path.clone(),
                });
            }
            return Err(InvokerError::Io(e));
        }

        Ok(())
    }
}
