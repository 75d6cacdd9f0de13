// src/pipeline/metrics.rs
//
// Per-run counters for every stage. Logged at the end of a run and
// embedded in the session report.

use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    pub total_frames: u64,
    pub outliers_flagged: u64,
    pub outliers_repaired: u64,
    pub frames_normalized: u64,
    pub frames_skipped: u64,
    pub frames_left: u64,
    pub frames_right: u64,
    pub frames_no_contact: u64,
    pub frames_unknown: u64,
    pub troughs_found: u64,
    pub cycles_rejected_short: u64,
    pub cycles_emitted: u64,
    pub started_at: Instant,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            total_frames: 0,
            outliers_flagged: 0,
            outliers_repaired: 0,
            frames_normalized: 0,
            frames_skipped: 0,
            frames_left: 0,
            frames_right: 0,
            frames_no_contact: 0,
            frames_unknown: 0,
            troughs_found: 0,
            cycles_rejected_short: 0,
            cycles_emitted: 0,
            started_at: Instant::now(),
        }
    }

    /// Share of input frames that survived normalization.
    pub fn valid_ratio(&self) -> f64 {
        if self.total_frames > 0 {
            self.frames_normalized as f64 / self.total_frames as f64
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_frames: self.total_frames,
            outliers_flagged: self.outliers_flagged,
            outliers_repaired: self.outliers_repaired,
            frames_normalized: self.frames_normalized,
            frames_skipped: self.frames_skipped,
            valid_ratio: self.valid_ratio(),
            frames_left: self.frames_left,
            frames_right: self.frames_right,
            frames_no_contact: self.frames_no_contact,
            frames_unknown: self.frames_unknown,
            troughs_found: self.troughs_found,
            cycles_rejected_short: self.cycles_rejected_short,
            cycles_emitted: self.cycles_emitted,
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub outliers_flagged: u64,
    pub outliers_repaired: u64,
    pub frames_normalized: u64,
    pub frames_skipped: u64,
    pub valid_ratio: f64,
    pub frames_left: u64,
    pub frames_right: u64,
    pub frames_no_contact: u64,
    pub frames_unknown: u64,
    pub troughs_found: u64,
    pub cycles_rejected_short: u64,
    pub cycles_emitted: u64,
    pub elapsed_secs: f64,
}
