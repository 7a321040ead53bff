// src/pipeline/metrics.rs
//
// Counters for every stage of frame processing. Cheap to clone and
// share; export via logs or the replay summary.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    pub total_frames: Arc<AtomicU64>,
    pub objects_scored: Arc<AtomicU64>,
    pub objects_skipped: Arc<AtomicU64>,
    pub danger_events: Arc<AtomicU64>,
    pub object_warnings: Arc<AtomicU64>,
    pub suppressed_by_global: Arc<AtomicU64>,
    pub zone_warnings: Arc<AtomicU64>,
    pub logic_time_us: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            total_frames: Arc::new(AtomicU64::new(0)),
            objects_scored: Arc::new(AtomicU64::new(0)),
            objects_skipped: Arc::new(AtomicU64::new(0)),
            danger_events: Arc::new(AtomicU64::new(0)),
            object_warnings: Arc::new(AtomicU64::new(0)),
            suppressed_by_global: Arc::new(AtomicU64::new(0)),
            zone_warnings: Arc::new(AtomicU64::new(0)),
            logic_time_us: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn set_timing(&self, counter: &AtomicU64, duration_us: u64) {
        counter.store(duration_us, Ordering::Relaxed);
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_frames: self.total_frames.load(Ordering::Relaxed),
            objects_scored: self.objects_scored.load(Ordering::Relaxed),
            objects_skipped: self.objects_skipped.load(Ordering::Relaxed),
            danger_events: self.danger_events.load(Ordering::Relaxed),
            object_warnings: self.object_warnings.load(Ordering::Relaxed),
            suppressed_by_global: self.suppressed_by_global.load(Ordering::Relaxed),
            zone_warnings: self.zone_warnings.load(Ordering::Relaxed),
            last_logic_us: self.logic_time_us.load(Ordering::Relaxed),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub objects_scored: u64,
    pub objects_skipped: u64,
    pub danger_events: u64,
    pub object_warnings: u64,
    pub suppressed_by_global: u64,
    pub zone_warnings: u64,
    pub last_logic_us: u64,
    pub elapsed_secs: f64,
}
