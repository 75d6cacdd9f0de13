// src/analysis/cycle_metrics.rs
//
// Per-cycle metrics over the labelled frames of one dribble.
//
// Heights are in normalized image coordinates, where smaller y is physically
// higher: max_height is the minimum y, min_height the maximum y.

use super::contact_events::{group_contact_events, CycleClock};
use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{ContactConfig, ContactEvent, ContactLabel, Cycle, Hand, LabeledFrame};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct HeightStats {
    max_height: f64,
    min_height: f64,
    avg_height: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ContactFractions {
    left: f64,
    right: f64,
    controlled: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct HandFields {
    start_hand: Option<Hand>,
    end_hand: Option<Hand>,
    is_crossover: Option<bool>,
    dominant_hand: Option<Hand>,
}

pub struct CycleMetrics {
    delta: f64,
    min_window_frames: usize,
}

impl CycleMetrics {
    pub fn new(config: &ContactConfig) -> Self {
        Self {
            delta: config.dominant_hand_delta,
            min_window_frames: config.min_window_frames,
        }
    }

    /// Compute all metrics for one cycle. Takes ownership of the frames and
    /// stamps them with `cycle_id`.
    ///
    /// An empty `frames` is a caller bug and returns
    /// [`AnalysisError::EmptyCycle`].
    pub fn compute(&self, mut frames: Vec<LabeledFrame>, cycle_id: usize) -> AnalysisResult<Cycle> {
        let (Some(first), Some(last)) = (frames.first(), frames.last()) else {
            return Err(AnalysisError::EmptyCycle { cycle_id });
        };
        let start_time_ms = first.timestamp_ms;
        let end_time_ms = last.timestamp_ms;
        let duration_ms = end_time_ms - start_time_ms;
        let clock = CycleClock {
            start_time_ms,
            duration_ms,
        };

        for frame in frames.iter_mut() {
            frame.cycle_id = Some(cycle_id);
        }

        let heights = height_stats(&frames);
        let contact_events = group_contact_events(&frames, clock);
        let fractions = contact_fractions(&frames);
        let hands = self.hand_fields(&contact_events, fractions);
        let switch_time_norm = switch_time_norm(&contact_events, hands, clock);
        let (control_deviation_overall, control_deviation_in_control) = control_deviation(&frames);

        debug!(
            "Cycle {}: {} frames, {}ms, {} contact events, controlled {:.2}, dominant {:?}, crossover {:?}",
            cycle_id,
            frames.len(),
            duration_ms,
            contact_events.len(),
            fractions.controlled,
            hands.dominant_hand,
            hands.is_crossover
        );

        Ok(Cycle {
            cycle_id,
            frames,
            contact_events,
            start_time_ms,
            end_time_ms,
            duration_ms,
            max_height: heights.max_height,
            min_height: heights.min_height,
            avg_height: heights.avg_height,
            height_range: heights.min_height - heights.max_height,
            contact_time_fraction_left: fractions.left,
            contact_time_fraction_right: fractions.right,
            controlled_time_ratio: fractions.controlled,
            start_hand: hands.start_hand,
            end_hand: hands.end_hand,
            is_crossover: hands.is_crossover,
            dominant_hand: hands.dominant_hand,
            switch_time_norm,
            control_deviation_overall,
            control_deviation_in_control,
        })
    }

    fn hand_fields(&self, events: &[ContactEvent], fractions: ContactFractions) -> HandFields {
        let mut meaningful = events
            .iter()
            .filter(|e| e.frame_count >= self.min_window_frames);
        let start_hand = meaningful.next().map(|e| e.hand);
        let end_hand = meaningful.last().map(|e| e.hand).or(start_hand);

        let is_crossover = match (start_hand, end_hand) {
            (Some(s), Some(e)) => Some(s != e),
            _ => None,
        };

        let dominant_hand = if fractions.left >= fractions.right + self.delta {
            Some(Hand::Left)
        } else if fractions.right >= fractions.left + self.delta {
            Some(Hand::Right)
        } else {
            None
        };

        HandFields {
            start_hand,
            end_hand,
            is_crossover,
            dominant_hand,
        }
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn height_stats(frames: &[LabeledFrame]) -> HeightStats {
    let ys: Vec<f64> = frames
        .iter()
        .filter_map(|f| f.ball_center.map(|b| b.y))
        .collect();
    if ys.is_empty() {
        return HeightStats::default();
    }
    HeightStats {
        max_height: ys.iter().copied().fold(f64::INFINITY, f64::min),
        min_height: ys.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        avg_height: mean(&ys).unwrap_or(0.0),
    }
}

fn contact_fractions(frames: &[LabeledFrame]) -> ContactFractions {
    let total = frames.len();
    if total == 0 {
        return ContactFractions::default();
    }
    let left = frames
        .iter()
        .filter(|f| f.contact_label == ContactLabel::Left)
        .count();
    let right = frames
        .iter()
        .filter(|f| f.contact_label == ContactLabel::Right)
        .count();
    ContactFractions {
        left: left as f64 / total as f64,
        right: right as f64 / total as f64,
        controlled: (left + right) as f64 / total as f64,
    }
}

/// Midpoint of the hand-over: from the end of the last `start_hand` event to
/// the start of the first `end_hand` event at or after it.
fn switch_time_norm(events: &[ContactEvent], hands: HandFields, clock: CycleClock) -> Option<f64> {
    let (start_hand, end_hand) = (hands.start_hand?, hands.end_hand?);
    if start_hand == end_hand || clock.duration_ms <= 0 {
        return None;
    }

    let last_start = events.iter().rev().find(|e| e.hand == start_hand)?;
    let first_end = events
        .iter()
        .find(|e| e.hand == end_hand && e.t_start_ms >= last_start.t_end_ms)?;

    let mid_ms = (last_start.t_end_ms + first_end.t_start_ms) as f64 / 2.0;
    clock.normalize_f64(mid_ms)
}

/// Mean ball-to-nearest-wrist distance over all frames with a distance, and
/// over the in-contact frames only.
fn control_deviation(frames: &[LabeledFrame]) -> (Option<f64>, Option<f64>) {
    let overall: Vec<f64> = frames.iter().filter_map(|f| f.d_min).collect();
    let in_control: Vec<f64> = frames
        .iter()
        .filter(|f| f.contact_label.is_controlled())
        .filter_map(|f| f.d_min)
        .collect();
    (mean(&overall), mean(&in_control))
}
