// src/pipeline/orchestrator.rs
//
// Wires the analysis stages together for one session:
//
//   RawFrame stream → SequenceCleaner → CoordinateNormalizer ─┬→ ContactLabeler ─┐
//                                                             └→ CycleDetector ──┼→ join by frame_index
//                                                                                └→ CycleMetrics (per cycle)
//                                                                                   → SessionAggregator
//
// Each stage reads the previous stage's output as an immutable snapshot.
// Cycle frames are cloned out of the labelled snapshot so CycleMetrics owns
// the frames it stamps with a cycle id.

use super::metrics::{MetricsSummary, PipelineMetrics};
use crate::analysis::{
    ContactLabeler, CoordinateNormalizer, CycleDetector, CycleMetrics, SequenceCleaner,
    SessionAggregator, SessionCounts,
};
use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{Config, ContactLabel, FrameStream, LabeledFrame, NormalizedFrame, RawFrame, SessionSummary};
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub summary: SessionSummary,
    pub metrics: MetricsSummary,
}

pub struct PipelineOrchestrator {
    config: Config,
}

impl PipelineOrchestrator {
    pub fn new(config: Config) -> AnalysisResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn run_stream(&self, stream: FrameStream) -> AnalysisResult<PipelineOutput> {
        self.run(stream.frames, stream.fps)
    }

    pub fn run(&self, frames: Vec<RawFrame>, fps: f64) -> AnalysisResult<PipelineOutput> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(AnalysisError::InvalidFps(fps));
        }
        validate_frame_order(&frames)?;

        let mut metrics = PipelineMetrics::new();
        metrics.total_frames = frames.len() as u64;
        let total_frames = frames.len();

        // 1. Outlier repair
        let cleaner = SequenceCleaner::new(&self.config.cleaning);
        let (frames, cleaning) = cleaner.clean(frames);
        metrics.outliers_flagged = cleaning.outliers_flagged as u64;
        metrics.outliers_repaired = cleaning.outliers_repaired as u64;

        // 2. Body-relative coordinates; frames without pose drop out here
        let normalizer = CoordinateNormalizer::new();
        let valid: Vec<NormalizedFrame> = normalizer.normalize(&frames).into_iter().flatten().collect();
        metrics.frames_normalized = valid.len() as u64;
        metrics.frames_skipped = (total_frames - valid.len()) as u64;

        // 3a. Contact labels
        let labeler = ContactLabeler::new(&self.config.contact);
        let labeling = labeler.label_frames(&valid);
        for frame in &labeling.frames {
            match frame.contact_label {
                ContactLabel::Left => metrics.frames_left += 1,
                ContactLabel::Right => metrics.frames_right += 1,
                ContactLabel::NoContact => metrics.frames_no_contact += 1,
                ContactLabel::Unknown => metrics.frames_unknown += 1,
            }
        }

        // 3b. Cycle segmentation (independent of labels)
        let detector = CycleDetector::new(&self.config.cycles);
        let detection = detector.detect(&valid, fps);
        metrics.troughs_found = detection.troughs.len() as u64;
        metrics.cycles_rejected_short = detection.rejected_short as u64;

        // 4. Join and per-cycle metrics
        let by_index = index_by_frame(&labeling.frames)?;
        let cycle_metrics = CycleMetrics::new(&self.config.contact);
        let mut cycles = Vec::with_capacity(detection.cycles.len());
        for (cycle_id, span) in detection.cycles.iter().enumerate() {
            let cycle_frames: Vec<LabeledFrame> = valid[span.clone()]
                .iter()
                .filter_map(|f| by_index.get(&f.frame_index))
                .map(|&i| labeling.frames[i].clone())
                .collect();
            cycles.push(cycle_metrics.compute(cycle_frames, cycle_id)?);
        }
        metrics.cycles_emitted = cycles.len() as u64;
        debug!("Computed metrics for {} cycles (d_thr {:.4})", cycles.len(), labeling.d_thr);

        // 5. Session roll-up
        let aggregator = SessionAggregator::new(&self.config.session);
        let summary = aggregator.summarize(
            cycles,
            SessionCounts {
                total_frames,
                valid_frames: valid.len(),
                shoulder_width_session: labeling.shoulder_width_session,
                d_thr: labeling.d_thr,
            },
        );

        info!(
            "Final normalized dataset: {} valid frames of {} ({:.1}%)",
            valid.len(),
            total_frames,
            100.0 * metrics.valid_ratio()
        );

        Ok(PipelineOutput {
            summary,
            metrics: metrics.summary(),
        })
    }
}

/// frame_index strictly increasing, timestamp_ms never decreasing.
fn validate_frame_order(frames: &[RawFrame]) -> AnalysisResult<()> {
    for pair in frames.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        if cur.frame_index <= prev.frame_index {
            return Err(AnalysisError::NonMonotonicFrameIndex {
                previous: prev.frame_index,
                current: cur.frame_index,
            });
        }
        if cur.timestamp_ms < prev.timestamp_ms {
            return Err(AnalysisError::NonMonotonicTimestamp {
                frame_index: cur.frame_index,
                previous_ms: prev.timestamp_ms,
                current_ms: cur.timestamp_ms,
            });
        }
    }
    Ok(())
}

/// Position of each labelled frame keyed by frame_index. Keys must be unique.
fn index_by_frame(frames: &[LabeledFrame]) -> AnalysisResult<HashMap<u64, usize>> {
    let mut index = HashMap::with_capacity(frames.len());
    for (i, frame) in frames.iter().enumerate() {
        if index.insert(frame.frame_index, i).is_some() {
            return Err(AnalysisError::DuplicateFrameIndex {
                frame_index: frame.frame_index,
            });
        }
    }
    Ok(index)
}
