//! Adaptive GIF encoder implementation.

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::invoker::Invoker;
use crate::metrics;
use crate::segmenter::Clip;
use crate::workspace::SessionWorkspace;

use super::config::GifConfig;
use super::error::GifError;
use super::types::{FailedPreview, GifReport, ProducedGif};

/// Produces one size-bounded GIF preview per clip.
pub struct GifEncoder {
    invoker: Arc<dyn Invoker>,
    config: GifConfig,
}

impl GifEncoder {
    /// Creates a new encoder.
    pub fn new(invoker: Arc<dyn Invoker>, config: GifConfig) -> Self {
        Self { invoker, config }
    }

    /// Runs the stage for one session.
    ///
    /// Clips are processed sequentially and independently: one clip's failure
    /// (budget exhaustion, invocation error, I/O error) is recorded and never
    /// aborts the loop for the others. Clips are mutually independent here,
    /// so bounding a future fan-out with a semaphore would be safe.
    pub async fn run(&self, workspace: &SessionWorkspace, clips: &[Clip]) -> GifReport {
        let mut report = GifReport::default();

        for clip in clips {
            match self.encode_clip(workspace, clip).await {
                Ok(gif) => {
                    metrics::GIFS_PRODUCED.inc();
                    info!(
                        session_id = workspace.session_id(),
                        clip = %clip.path.display(),
                        duration_secs = gif.trial_duration_secs,
                        size_bytes = gif.size_bytes,
                        "preview produced"
                    );
                    report.produced.push(gif);
                }
                Err(err) => {
                    if err.is_budget_exhausted() {
                        metrics::GIF_BUDGET_FAILURES.inc();
                    }
                    warn!(
                        session_id = workspace.session_id(),
                        clip = %clip.path.display(),
                        error = %err,
                        "preview failed"
                    );
                    report.failed.push(FailedPreview {
                        clip_index: clip.index,
                        clip_path: clip.path.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Searches the trial ladder for the longest duration whose GIF fits the
    /// budget. Trials longer than the clip itself are skipped; a trial equal
    /// to the clip's duration is attempted.
    async fn encode_clip(
        &self,
        workspace: &SessionWorkspace,
        clip: &Clip,
    ) -> Result<ProducedGif, GifError> {
        let clip_duration = self.invoker.probe_duration(&clip.path).await?;
        let stem = clip.stem();

        let trim_path = workspace.temp_dir().join(format!("{stem}_trim.mp4"));
        let palette_path = workspace.temp_dir().join(format!("{stem}_palette.png"));
        let gif_path = workspace.output_dir().join(format!("{stem}.gif"));

        let mut trials = 0u32;
        let result = self
            .search_ladder(
                clip,
                clip_duration,
                &trim_path,
                &palette_path,
                &gif_path,
                &mut trials,
            )
            .await;

        metrics::GIF_TRIALS.observe(f64::from(trials));

        // Trial intermediates never outlive the clip.
        let _ = tokio::fs::remove_file(&trim_path).await;
        let _ = tokio::fs::remove_file(&palette_path).await;

        result
    }

    async fn search_ladder(
        &self,
        clip: &Clip,
        clip_duration: f64,
        trim_path: &Path,
        palette_path: &Path,
        gif_path: &Path,
        trials: &mut u32,
    ) -> Result<ProducedGif, GifError> {
        for &trial_secs in &self.config.trial_durations_secs {
            if f64::from(trial_secs) > clip_duration {
                continue; // cannot trim longer than the source
            }
            *trials += 1;

            debug!(
                clip = %clip.path.display(),
                trial_secs,
                "attempting preview trial"
            );

            self.invoker
                .run_checked(&self.build_trim_args(&clip.path, trim_path, trial_secs))
                .await?;
            self.invoker
                .run_checked(&self.build_palette_args(trim_path, palette_path))
                .await?;
            self.invoker
                .run_checked(&self.build_gif_args(trim_path, palette_path, gif_path))
                .await?;

            let size_bytes = tokio::fs::metadata(gif_path)
                .await
                .map_err(|source| GifError::Io {
                    path: gif_path.to_path_buf(),
                    source,
                })?
                .len();

            if size_bytes <= self.config.max_size_bytes {
                return Ok(ProducedGif {
                    clip_index: clip.index,
                    path: gif_path.to_path_buf(),
                    trial_duration_secs: trial_secs,
                    size_bytes,
                });
            }

            // Over budget: the oversized file must not survive.
            tokio::fs::remove_file(gif_path)
                .await
                .map_err(|source| GifError::Io {
                    path: gif_path.to_path_buf(),
                    source,
                })?;
        }

        Err(GifError::SizeBudgetUnsatisfiable {
            clip: clip.path.clone(),
            budget_bytes: self.config.max_size_bytes,
        })
    }

    /// Builds the argument vector for the muted trim re-encode.
    fn build_trim_args(&self, input: &Path, output: &Path, trial_secs: u32) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-t".to_string(),
            trial_secs.to_string(),
            "-an".to_string(), // muted
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            self.config.preset.clone(),
            "-r".to_string(),
            self.config.fps.to_string(),
            output.to_string_lossy().to_string(),
        ]
    }

    /// Builds the argument vector for palette generation (pass 1).
    fn build_palette_args(&self, input: &Path, palette: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-vf".to_string(),
            format!(
                "fps={},scale={}:-1:flags=lanczos,palettegen=max_colors={}",
                self.config.fps, self.config.width, self.config.max_colors
            ),
            palette.to_string_lossy().to_string(),
        ]
    }

    /// Builds the argument vector for the palette-mapped GIF encode (pass 2).
    fn build_gif_args(&self, input: &Path, palette: &Path, gif: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-i".to_string(),
            palette.to_string_lossy().to_string(),
            "-filter_complex".to_string(),
            format!(
                "fps={},scale={}:-1:flags=lanczos[x];[x][1:v]paletteuse",
                self.config.fps, self.config.width
            ),
            gif.to_string_lossy().to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::{InvocationOutput, InvokerError};
    use crate::testing::MockInvoker;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    async fn workspace() -> (TempDir, SessionWorkspace) {
        let base = TempDir::new().unwrap();
        let ws = SessionWorkspace::create(base.path(), "test-session").await.unwrap();
        (base, ws)
    }

    fn clip(ws: &SessionWorkspace, index: usize, stem: &str) -> Clip {
        Clip {
            index,
            path: ws.output_dir().join(format!("{stem}.mp4")),
        }
    }

    /// Handler faking the three-trial pipeline: trims and palettes are
    /// created empty, each `paletteuse` run writes a GIF whose size comes
    /// from the provided schedule (repeating the last entry).
    fn fake_ffmpeg(
        gif_sizes: Vec<usize>,
    ) -> impl Fn(&[String]) -> Result<InvocationOutput, InvokerError> {
        let gif_runs = AtomicUsize::new(0);
        move |argv: &[String]| {
            let out = argv.last().expect("argv has an output path").clone();
            if argv.iter().any(|a| a.contains("paletteuse")) {
                let run = gif_runs.fetch_add(1, Ordering::SeqCst);
                let size = *gif_sizes.get(run).or(gif_sizes.last()).unwrap();
                std::fs::write(out, vec![0u8; size]).unwrap();
            } else {
                std::fs::write(out, b"").unwrap();
            }
            Ok(MockInvoker::ok_output())
        }
    }

    #[test]
    fn test_build_trim_args() {
        let encoder = GifEncoder::new(Arc::new(MockInvoker::new()), GifConfig::default());
        let args = encoder.build_trim_args(
            Path::new("/s/output/movie_part000.mp4"),
            Path::new("/s/temp/movie_part000_trim.mp4"),
            5,
        );

        assert!(args.contains(&"-t".to_string()));
        assert!(args.contains(&"5".to_string()));
        assert!(args.contains(&"-an".to_string()));
        assert!(args.contains(&"ultrafast".to_string()));
        assert!(args.contains(&"10".to_string()));
    }

    #[test]
    fn test_build_palette_args() {
        let encoder = GifEncoder::new(Arc::new(MockInvoker::new()), GifConfig::default());
        let args = encoder.build_palette_args(
            Path::new("/s/temp/trim.mp4"),
            Path::new("/s/temp/palette.png"),
        );

        assert!(args
            .contains(&"fps=10,scale=480:-1:flags=lanczos,palettegen=max_colors=128".to_string()));
        assert_eq!(args.last().unwrap(), "/s/temp/palette.png");
    }

    #[test]
    fn test_build_gif_args() {
        let encoder = GifEncoder::new(Arc::new(MockInvoker::new()), GifConfig::default());
        let args = encoder.build_gif_args(
            Path::new("/s/temp/trim.mp4"),
            Path::new("/s/temp/palette.png"),
            Path::new("/s/output/movie_part000.gif"),
        );

        assert!(args.contains(&"fps=10,scale=480:-1:flags=lanczos[x];[x][1:v]paletteuse".to_string()));
        assert_eq!(args.last().unwrap(), "/s/output/movie_part000.gif");
    }

    #[tokio::test]
    async fn test_accepts_first_fitting_duration() {
        let (_base, ws) = workspace().await;
        let invoker = MockInvoker::new();
        invoker.set_default_probe_duration(6.0).await;
        // First GIF over the 100-byte budget, second one under it.
        invoker.set_handler(fake_ffmpeg(vec![200, 80])).await;

        let encoder = GifEncoder::new(
            Arc::new(invoker.clone()),
            GifConfig::default()
                .with_max_size_bytes(100)
                .with_trial_durations(vec![7, 6, 5, 4, 3, 2, 1]),
        );

        let clips = vec![clip(&ws, 0, "movie_part000")];
        let report = encoder.run(&ws, &clips).await;

        assert_eq!(report.produced.len(), 1);
        assert!(report.failed.is_empty());
        let gif = &report.produced[0];
        // 7s is inadmissible for a 6s clip; 6s rendered over budget; 5s fit.
        assert_eq!(gif.trial_duration_secs, 5);
        assert_eq!(gif.size_bytes, 80);
        assert!(gif.path.is_file());
    }

    #[tokio::test]
    async fn test_trial_equal_to_clip_duration_is_attempted() {
        let (_base, ws) = workspace().await;
        let invoker = MockInvoker::new();
        invoker.set_default_probe_duration(4.0).await;
        invoker.set_handler(fake_ffmpeg(vec![10])).await;

        let encoder = GifEncoder::new(
            Arc::new(invoker.clone()),
            GifConfig::default().with_max_size_bytes(100),
        );

        let clips = vec![clip(&ws, 0, "movie_part000")];
        let report = encoder.run(&ws, &clips).await;

        // 7/6/5 skipped, 4 attempted first and accepted.
        assert_eq!(report.produced[0].trial_duration_secs, 4);
        let first_trim = &invoker.recorded_invocations().await[0];
        let t_value = first_trim
            .iter()
            .position(|a| a == "-t")
            .map(|i| first_trim[i + 1].clone());
        assert_eq!(t_value.as_deref(), Some("4"));
    }

    #[tokio::test]
    async fn test_budget_exhaustion_is_isolated_per_clip() {
        let (_base, ws) = workspace().await;
        let invoker = MockInvoker::new();
        invoker.set_default_probe_duration(3.0).await;

        // Every GIF for part000 is oversized; part001 always fits.
        invoker
            .set_handler(move |argv: &[String]| {
                let out = argv.last().unwrap().clone();
                if argv.iter().any(|a| a.contains("paletteuse")) {
                    let oversized = argv.iter().any(|a| a.contains("movie_part000"));
                    let size = if oversized { 500 } else { 10 };
                    std::fs::write(out, vec![0u8; size]).unwrap();
                } else {
                    std::fs::write(out, b"").unwrap();
                }
                Ok(MockInvoker::ok_output())
            })
            .await;

        let encoder = GifEncoder::new(
            Arc::new(invoker.clone()),
            GifConfig::default().with_max_size_bytes(100),
        );

        let clips = vec![clip(&ws, 0, "movie_part000"), clip(&ws, 1, "movie_part001")];
        let report = encoder.run(&ws, &clips).await;

        assert_eq!(report.produced.len(), 1);
        assert_eq!(report.produced[0].clip_index, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].clip_index, 0);

        // The exhausted clip leaves no GIF behind.
        assert!(!ws.output_dir().join("movie_part000.gif").exists());
        assert!(ws.output_dir().join("movie_part001.gif").is_file());
    }

    #[tokio::test]
    async fn test_invocation_error_does_not_abort_loop() {
        let (_base, ws) = workspace().await;
        let invoker = MockInvoker::new();
        invoker.set_default_probe_duration(3.0).await;
        invoker
            .set_handler(|argv: &[String]| {
                if argv.iter().any(|a| a.contains("movie_part000")) {
                    return Ok(MockInvoker::failed_output(1, "corrupt input"));
                }
                let out = argv.last().unwrap().clone();
                std::fs::write(out, vec![0u8; 10]).unwrap();
                Ok(MockInvoker::ok_output())
            })
            .await;

        let encoder = GifEncoder::new(
            Arc::new(invoker.clone()),
            GifConfig::default().with_max_size_bytes(100),
        );

        let clips = vec![clip(&ws, 0, "movie_part000"), clip(&ws, 1, "movie_part001")];
        let report = encoder.run(&ws, &clips).await;

        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].reason.contains("corrupt input"));
        assert_eq!(report.produced.len(), 1);
    }

    #[tokio::test]
    async fn test_trial_intermediates_are_cleaned_up() {
        let (_base, ws) = workspace().await;
        let invoker = MockInvoker::new();
        invoker.set_default_probe_duration(6.0).await;
        invoker.set_handler(fake_ffmpeg(vec![10])).await;

        let encoder = GifEncoder::new(
            Arc::new(invoker),
            GifConfig::default().with_max_size_bytes(100),
        );

        let clips = vec![clip(&ws, 0, "movie_part000")];
        encoder.run(&ws, &clips).await;

        let mut temp_entries = tokio::fs::read_dir(ws.temp_dir()).await.unwrap();
        assert!(temp_entries.next_entry().await.unwrap().is_none());
    }
}
