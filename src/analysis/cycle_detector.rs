// src/analysis/cycle_detector.rs
//
// Dribble segmentation. In image coordinates y grows downward, so the
// bounce bottom is a local MAXIMUM of ball y. Consecutive bounce bottoms
// delimit one dribble cycle: [trough_i, trough_{i+1}) over the valid frames.

use super::peak_finder::{find_peaks, PeakConstraints};
use crate::types::{CycleConfig, NormalizedFrame};
use std::ops::Range;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleDetection {
    /// Positions (into the valid-frame slice) of accepted bounce bottoms
    pub troughs: Vec<usize>,
    /// Half-open ranges into the valid-frame slice, one per kept cycle
    pub cycles: Vec<Range<usize>>,
    /// Trough-to-trough spans shorter than `min_cycle_duration`
    pub rejected_short: usize,
}

pub struct CycleDetector {
    min_cycle_duration: usize,
    prominence: f64,
}

impl CycleDetector {
    pub fn new(config: &CycleConfig) -> Self {
        Self {
            min_cycle_duration: config.min_cycle_duration,
            prominence: config.prominence,
        }
    }

    /// Segment `frames` (valid normalized frames, in order) into cycles.
    pub fn detect(&self, frames: &[NormalizedFrame], fps: f64) -> CycleDetection {
        info!("Detecting dribble cycles...");

        // Ball y signal plus the frame position each sample came from
        let (heights, positions): (Vec<f64>, Vec<usize>) = frames
            .iter()
            .enumerate()
            .filter_map(|(pos, f)| f.ball_center.map(|b| (b.y, pos)))
            .unzip();

        if heights.len() < self.min_cycle_duration {
            warn!(
                "Not enough valid data points ({}) for cycle detection (need {})",
                heights.len(),
                self.min_cycle_duration
            );
            return CycleDetection::default();
        }

        let peaks = find_peaks(
            &heights,
            PeakConstraints {
                distance: self.min_cycle_duration,
                prominence: self.prominence,
            },
        );
        let troughs: Vec<usize> = peaks.iter().map(|&p| positions[p]).collect();

        info!("Found {} troughs (dribble cycle markers)", troughs.len());
        debug!(
            "Trough frames: {:?}",
            troughs.iter().map(|&t| frames[t].frame_index).collect::<Vec<_>>()
        );

        let mut cycles = Vec::new();
        let mut rejected_short = 0;
        for pair in troughs.windows(2) {
            let span = pair[0]..pair[1];
            if span.len() < self.min_cycle_duration {
                rejected_short += 1;
                continue;
            }

            let first = &frames[span.start];
            let last = &frames[span.end - 1];
            debug!(
                "Cycle {}: {} frames ({}ms, {:.2}s at {:.1} fps)",
                cycles.len() + 1,
                span.len(),
                last.timestamp_ms - first.timestamp_ms,
                span.len() as f64 / fps,
                fps
            );
            cycles.push(span);
        }

        info!("Total dribble cycles detected: {}", cycles.len());

        CycleDetection {
            troughs,
            cycles,
            rejected_short,
        }
    }
}
