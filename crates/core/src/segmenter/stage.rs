//! Segmentation stage implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::invoker::Invoker;
use crate::workspace::SessionWorkspace;

use super::config::SegmenterConfig;
use super::error::SegmentError;
use super::types::Clip;

/// Splits the session's input videos into fixed-duration clips.
pub struct Segmenter {
    invoker: Arc<dyn Invoker>,
    config: SegmenterConfig,
}

impl Segmenter {
    /// Creates a new segmenter.
    pub fn new(invoker: Arc<dyn Invoker>, config: SegmenterConfig) -> Self {
        Self { invoker, config }
    }

    /// Runs the stage for one session.
    ///
    /// Produces a contiguous, zero-indexed clip sequence in the workspace's
    /// `output/` directory. With no input videos present this is a no-op
    /// returning zero clips. Any transcoder failure aborts the stage; partial
    /// output files are left for session teardown to collect.
    pub async fn run(&self, workspace: &SessionWorkspace) -> Result<Vec<Clip>, SegmentError> {
        let inputs = self.list_videos(&workspace.input_dir()).await?;

        if inputs.is_empty() {
            info!(
                session_id = workspace.session_id(),
                "no input videos found, segmentation is a no-op"
            );
            return Ok(Vec::new());
        }

        let output_dir = workspace.output_dir();
        let mut produced = Vec::new();

        for input in &inputs {
            let base = input
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();

            let out_pattern = output_dir.join(format!("{base}_part%03d.mp4"));
            let args = self.build_segment_args(input, &out_pattern);

            debug!(
                session_id = workspace.session_id(),
                input = %input.display(),
                "segmenting"
            );
            self.invoker.run_checked(&args).await?;

            let segments = collect_segments(&output_dir, &base).await?;
            for segment in &segments {
                self.remux_faststart(segment, &workspace.temp_dir()).await?;
            }
            produced.extend(segments);
        }

        produced.sort();
        let clips: Vec<Clip> = produced
            .into_iter()
            .enumerate()
            .map(|(index, path)| Clip { index, path })
            .collect();

        info!(
            session_id = workspace.session_id(),
            clips = clips.len(),
            "segmentation complete"
        );
        Ok(clips)
    }

    /// Builds the ffmpeg argument vector for the segmenting run.
    ///
    /// Normalizes pixel aspect ratio, re-encodes video+audio with the fast
    /// preset, forces keyframes at the exact cut boundaries and cuts on exact
    /// time rather than only at existing keyframes, resetting each segment's
    /// timestamps to zero.
    fn build_segment_args(&self, input: &Path, out_pattern: &Path) -> Vec<String> {
        let duration = self.config.max_clip_duration_secs;
        vec![
            "-y".to_string(), // Overwrite output
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-vf".to_string(),
            "setsar=1".to_string(), // force square pixels
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            self.config.preset.clone(),
            "-crf".to_string(),
            self.config.crf.to_string(),
            "-force_key_frames".to_string(),
            format!("expr:gte(t,n_forced*{duration})"),
            "-c:a".to_string(),
            "aac".to_string(),
            "-b:a".to_string(),
            format!("{}k", self.config.audio_bitrate_kbps),
            "-f".to_string(),
            "segment".to_string(),
            "-segment_time".to_string(),
            duration.to_string(),
            "-break_non_keyframes".to_string(),
            "1".to_string(),
            "-reset_timestamps".to_string(),
            "1".to_string(),
            out_pattern.to_string_lossy().to_string(),
        ]
    }

    /// Builds the argument vector for the lossless faststart remux.
    fn build_remux_args(input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-c".to_string(),
            "copy".to_string(), // stream copy, never re-encode
            "-movflags".to_string(),
            "+faststart".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }

    /// Remuxes one segment through `temp/` and renames the result over the
    /// original, which also removes the intermediate.
    async fn remux_faststart(&self, segment: &Path, temp_dir: &Path) -> Result<(), SegmentError> {
        let file_name = segment.file_name().unwrap_or_default();
        let intermediate = temp_dir.join(file_name);

        let args = Self::build_remux_args(segment, &intermediate);
        self.invoker.run_checked(&args).await?;

        tokio::fs::rename(&intermediate, segment)
            .await
            .map_err(|source| SegmentError::Io {
                path: intermediate.clone(),
                source,
            })
    }

    /// Lists source videos in the input directory, sorted for determinism.
    async fn list_videos(&self, dir: &Path) -> Result<Vec<PathBuf>, SegmentError> {
        let mut entries = tokio::fs::read_dir(dir).await.map_err(|source| SegmentError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut videos = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|source| SegmentError::Io {
            path: dir.to_path_buf(),
            source,
        })? {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            if path.is_file() && self.config.is_video_file(&name) {
                videos.push(path);
            }
        }

        videos.sort();
        Ok(videos)
    }
}

/// Collects the segment files one input produced, in index order.
async fn collect_segments(output_dir: &Path, base: &str) -> Result<Vec<PathBuf>, SegmentError> {
    let prefix = format!("{base}_part");
    let mut entries = tokio::fs::read_dir(output_dir)
        .await
        .map_err(|source| SegmentError::Io {
            path: output_dir.to_path_buf(),
            source,
        })?;

    let mut segments = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|source| SegmentError::Io {
        path: output_dir.to_path_buf(),
        source,
    })? {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with(&prefix) && name.ends_with(".mp4") {
            segments.push(entry.path());
        }
    }

    segments.sort();
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::InvokerError;
    use crate::testing::MockInvoker;
    use tempfile::TempDir;

    fn segmenter_with(invoker: &MockInvoker) -> Segmenter {
        Segmenter::new(Arc::new(invoker.clone()), SegmenterConfig::default())
    }

    async fn workspace() -> (TempDir, SessionWorkspace) {
        let base = TempDir::new().unwrap();
        let ws = SessionWorkspace::create(base.path(), "test-session").await.unwrap();
        (base, ws)
    }

    /// Handler that fakes ffmpeg side effects: the segmenting run creates
    /// `parts` numbered segments from the `%03d` output pattern, the remux
    /// run creates its output file.
    fn fake_ffmpeg(parts: usize) -> impl Fn(&[String]) -> Result<crate::invoker::InvocationOutput, InvokerError> {
        move |argv: &[String]| {
            let out = argv.last().expect("argv has an output path").clone();
            if argv.iter().any(|a| a == "segment") {
                for i in 0..parts {
                    let path = out.replace("%03d", &format!("{i:03}"));
                    std::fs::write(path, b"segment-data").unwrap();
                }
            } else {
                std::fs::write(out, b"remuxed-data").unwrap();
            }
            Ok(MockInvoker::ok_output())
        }
    }

    #[test]
    fn test_build_segment_args() {
        let segmenter = Segmenter::new(Arc::new(MockInvoker::new()), SegmenterConfig::default());
        let args = segmenter.build_segment_args(
            Path::new("/s/input/movie.mp4"),
            Path::new("/s/output/movie_part%03d.mp4"),
        );

        assert!(args.contains(&"setsar=1".to_string()));
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"ultrafast".to_string()));
        assert!(args.contains(&"18".to_string()));
        assert!(args.contains(&"-segment_time".to_string()));
        assert!(args.contains(&"6".to_string()));
        assert!(args.contains(&"-break_non_keyframes".to_string()));
        assert!(args.contains(&"-reset_timestamps".to_string()));
        assert!(args.contains(&"expr:gte(t,n_forced*6)".to_string()));
        assert_eq!(args.last().unwrap(), "/s/output/movie_part%03d.mp4");
    }

    #[test]
    fn test_build_remux_args_is_stream_copy() {
        let args = Segmenter::build_remux_args(
            Path::new("/s/output/movie_part000.mp4"),
            Path::new("/s/temp/movie_part000.mp4"),
        );

        assert!(args.contains(&"copy".to_string()));
        assert!(args.contains(&"+faststart".to_string()));
        assert!(!args.contains(&"libx264".to_string()));
    }

    #[tokio::test]
    async fn test_no_inputs_is_a_noop() {
        let (_base, ws) = workspace().await;
        let invoker = MockInvoker::new();
        let segmenter = segmenter_with(&invoker);

        let clips = segmenter.run(&ws).await.unwrap();
        assert!(clips.is_empty());
        assert_eq!(invoker.invocation_count().await, 0);
    }

    #[tokio::test]
    async fn test_non_video_files_are_ignored() {
        let (_base, ws) = workspace().await;
        tokio::fs::write(ws.input_dir().join("notes.txt"), b"text").await.unwrap();

        let invoker = MockInvoker::new();
        let segmenter = segmenter_with(&invoker);

        let clips = segmenter.run(&ws).await.unwrap();
        assert!(clips.is_empty());
        assert_eq!(invoker.invocation_count().await, 0);
    }

    #[tokio::test]
    async fn test_produces_indexed_contiguous_clips() {
        let (_base, ws) = workspace().await;
        tokio::fs::write(ws.input_dir().join("movie.mp4"), b"video").await.unwrap();

        let invoker = MockInvoker::new();
        invoker.set_handler(fake_ffmpeg(3)).await;
        let segmenter = segmenter_with(&invoker);

        let clips = segmenter.run(&ws).await.unwrap();

        assert_eq!(clips.len(), 3);
        for (i, clip) in clips.iter().enumerate() {
            assert_eq!(clip.index, i);
            assert_eq!(clip.stem(), format!("movie_part{i:03}"));
            assert!(clip.path.is_file());
        }

        // One segmenting run plus one remux per segment.
        assert_eq!(invoker.invocation_count().await, 4);

        // Remux intermediates were renamed away from temp/.
        let mut temp_entries = tokio::fs::read_dir(ws.temp_dir()).await.unwrap();
        assert!(temp_entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_nonzero_exit_aborts_stage_with_stderr() {
        let (_base, ws) = workspace().await;
        tokio::fs::write(ws.input_dir().join("movie.mp4"), b"video").await.unwrap();

        let invoker = MockInvoker::new();
        invoker
            .set_handler(|_argv| Ok(MockInvoker::failed_output(1, "moov atom not found")))
            .await;
        let segmenter = segmenter_with(&invoker);

        let err = segmenter.run(&ws).await.unwrap_err();
        assert!(err.to_string().contains("moov atom not found"));
    }
}
