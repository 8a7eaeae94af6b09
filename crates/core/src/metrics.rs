//! Prometheus metrics for the pipeline.
//!
//! This module provides metrics for:
//! - Session lifecycle (started, completed, failed)
//! - Segmentation output
//! - Adaptive GIF encoding (produced, budget failures, trials per clip)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, Registry};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Sessions accepted for processing.
pub static SESSIONS_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("clipmill_sessions_started_total", "Total sessions started").unwrap()
});

/// Sessions that reached the completed state.
pub static SESSIONS_COMPLETED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "clipmill_sessions_completed_total",
        "Total sessions completed successfully",
    )
    .unwrap()
});

/// Sessions that ended in the error state.
pub static SESSIONS_FAILED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("clipmill_sessions_failed_total", "Total sessions failed").unwrap()
});

/// Clips produced by the segmentation stage.
pub static CLIPS_PRODUCED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("clipmill_clips_produced_total", "Total clips produced").unwrap()
});

/// GIF previews produced within budget.
pub static GIFS_PRODUCED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("clipmill_gifs_produced_total", "Total GIF previews produced").unwrap()
});

/// Clips whose preview exhausted every trial duration.
pub static GIF_BUDGET_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "clipmill_gif_budget_failures_total",
        "Total previews abandoned because no trial duration fit the size budget",
    )
    .unwrap()
});

/// Trial durations attempted per clip.
pub static GIF_TRIALS: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "clipmill_gif_trials_per_clip",
            "Number of trial durations attempted per clip",
        )
        .buckets(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]),
    )
    .unwrap()
});

/// Segmentation stage wall time in seconds.
pub static SEGMENT_STAGE_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "clipmill_segment_stage_duration_seconds",
            "Duration of the segmentation stage per session",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
    )
    .unwrap()
});

/// Adaptive encoding stage wall time in seconds.
pub static GIF_STAGE_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "clipmill_gif_stage_duration_seconds",
            "Duration of the adaptive encoding stage per session",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
    registry.register(Box::new(SESSIONS_STARTED.clone())).ok();
    registry.register(Box::new(SESSIONS_COMPLETED.clone())).ok();
    registry.register(Box::new(SESSIONS_FAILED.clone())).ok();
    registry.register(Box::new(CLIPS_PRODUCED.clone())).ok();
    registry.register(Box::new(GIFS_PRODUCED.clone())).ok();
    registry.register(Box::new(GIF_BUDGET_FAILURES.clone())).ok();
    registry.register(Box::new(GIF_TRIALS.clone())).ok();
    registry.register(Box::new(SEGMENT_STAGE_DURATION.clone())).ok();
    registry.register(Box::new(GIF_STAGE_DURATION.clone())).ok();
}
