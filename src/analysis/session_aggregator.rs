// src/analysis/session_aggregator.rs

use crate::types::{Cycle, Hand, SessionConfig, SessionSummary};
use tracing::info;

/// Bookkeeping that does not come from the cycles themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionCounts {
    pub total_frames: usize,
    pub valid_frames: usize,
    pub shoulder_width_session: f64,
    pub d_thr: f64,
}

/// Mean and population variance. No samples gives (0, 0); a single sample
/// gives (value, 0).
pub fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    match values.len() {
        0 => (0.0, 0.0),
        1 => (values[0], 0.0),
        n => {
            let mean = values.iter().sum::<f64>() / n as f64;
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
            (mean, variance)
        }
    }
}

/// Count hand changes between successive cycles with a known hand. Up to
/// `gap_tolerance` unknown-hand cycles may sit between the two compared
/// cycles; a longer unknown gap breaks the chain.
pub fn count_crossovers(hands: &[Option<Hand>], gap_tolerance: usize) -> usize {
    let mut count = 0;
    let mut i = 0;
    while i < hands.len() {
        let Some(current) = hands[i] else {
            i += 1;
            continue;
        };

        let horizon = (i + gap_tolerance + 1).min(hands.len() - 1);
        match (i + 1..=horizon).find(|&j| hands[j].is_some()) {
            Some(j) => {
                if hands[j] != Some(current) {
                    count += 1;
                }
                i = j;
            }
            None => i += 1,
        }
    }
    count
}

pub struct SessionAggregator {
    gap_tolerance: usize,
}

impl SessionAggregator {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            gap_tolerance: config.crossover_hand_gap_tolerance,
        }
    }

    pub fn summarize(&self, cycles: Vec<Cycle>, counts: SessionCounts) -> SessionSummary {
        let durations: Vec<f64> = cycles.iter().map(|c| c.duration_ms as f64).collect();
        let max_heights: Vec<f64> = cycles.iter().map(|c| c.max_height).collect();
        let controlled: Vec<f64> = cycles.iter().map(|c| c.controlled_time_ratio).collect();
        let deviations: Vec<f64> = cycles
            .iter()
            .filter_map(|c| c.control_deviation_in_control)
            .collect();

        let (duration_mean, duration_variance) = mean_and_variance(&durations);
        let (max_height_mean, max_height_variance) = mean_and_variance(&max_heights);
        let (controlled_mean, controlled_variance) = mean_and_variance(&controlled);
        let (deviation_mean, deviation_variance) = mean_and_variance(&deviations);

        let hands: Vec<Option<Hand>> = cycles.iter().map(|c| c.representative_hand()).collect();
        let crossovers_count = count_crossovers(&hands, self.gap_tolerance);
        let intra_cycle_crossovers = cycles
            .iter()
            .filter(|c| c.is_crossover == Some(true))
            .count();

        let known: Vec<Hand> = hands.iter().flatten().copied().collect();
        let sample_size = known.len();
        let (left_hand_ratio, right_hand_ratio) = if sample_size > 0 {
            let left = known.iter().filter(|&&h| h == Hand::Left).count();
            let right = sample_size - left;
            (
                left as f64 / sample_size as f64,
                right as f64 / sample_size as f64,
            )
        } else {
            (0.0, 0.0)
        };

        info!(
            "Session: {} cycles, {} crossovers (gap tolerance {}), hand ratio L/R {:.2}/{:.2} over {} cycles",
            cycles.len(),
            crossovers_count,
            self.gap_tolerance,
            left_hand_ratio,
            right_hand_ratio,
            sample_size
        );

        SessionSummary {
            cycles,
            total_frames: counts.total_frames,
            valid_frames: counts.valid_frames,
            duration_mean,
            duration_variance,
            max_height_mean,
            max_height_variance,
            controlled_time_ratio_mean: controlled_mean,
            controlled_time_ratio_variance: controlled_variance,
            control_deviation_mean: deviation_mean,
            control_deviation_variance: deviation_variance,
            crossovers_count,
            intra_cycle_crossovers,
            left_hand_ratio,
            right_hand_ratio,
            hand_ratio_sample_size: sample_size,
            shoulder_width_session: counts.shoulder_width_session,
            d_thr: counts.d_thr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::types::Hand::{Left as L, Right as R};

    fn cycle(id: usize, duration_ms: i64, dominant: Option<Hand>, end: Option<Hand>) -> Cycle {
        Cycle {
            cycle_id: id,
            frames: Vec::new(),
            contact_events: Vec::new(),
            start_time_ms: 0,
            end_time_ms: duration_ms,
            duration_ms,
            max_height: -0.5 - id as f64 * 0.1,
            min_height: 0.8,
            avg_height: 0.2,
            height_range: 1.3,
            contact_time_fraction_left: 0.3,
            contact_time_fraction_right: 0.3,
            controlled_time_ratio: 0.6,
            start_hand: end,
            end_hand: end,
            is_crossover: end.map(|_| false),
            dominant_hand: dominant,
            switch_time_norm: None,
            control_deviation_overall: Some(0.2),
            control_deviation_in_control: Some(0.1 + id as f64 * 0.1),
        }
    }

    fn aggregator(gap_tolerance: usize) -> SessionAggregator {
        SessionAggregator::new(&SessionConfig {
            crossover_hand_gap_tolerance: gap_tolerance,
        })
    }

    #[test]
    fn test_unknown_cycle_is_skipped_not_a_break() {
        assert_eq!(count_crossovers(&[Some(L), None, Some(R)], 1), 1);
    }

    #[test]
    fn test_gap_longer_than_tolerance_breaks_comparison() {
        assert_eq!(count_crossovers(&[Some(L), None, None, Some(R)], 1), 0);
        assert_eq!(count_crossovers(&[Some(L), None, None, Some(R)], 2), 1);
    }

    #[test]
    fn test_crossovers_alternating_hands() {
        let hands = [Some(L), Some(R), Some(R), Some(L), None, Some(R)];
        assert_eq!(count_crossovers(&hands, 0), 2);
        assert_eq!(count_crossovers(&hands, 1), 3);
        assert_eq!(count_crossovers(&[], 1), 0);
        assert_eq!(count_crossovers(&[None, None], 3), 0);
    }

    #[test]
    fn test_mean_and_variance_edge_cases() {
        assert_eq!(mean_and_variance(&[]), (0.0, 0.0));
        assert_eq!(mean_and_variance(&[4.2]), (4.2, 0.0));
        let (m, v) = mean_and_variance(&[1.0, 2.0, 3.0, 4.0]);
        assert!((m - 2.5).abs() < 1e-12);
        assert!((v - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_single_cycle_has_zero_variance() {
        let summary = aggregator(1).summarize(
            vec![cycle(0, 600, Some(L), Some(L))],
            SessionCounts::default(),
        );
        assert_eq!(summary.duration_mean, 600.0);
        assert_eq!(summary.duration_variance, 0.0);
        assert_eq!(summary.max_height_variance, 0.0);
        assert_eq!(summary.controlled_time_ratio_variance, 0.0);
        assert_eq!(summary.control_deviation_variance, 0.0);
        assert_eq!(summary.crossovers_count, 0);
    }

    #[test]
    fn test_representative_hand_falls_back_to_end_hand() {
        let cycles = vec![
            cycle(0, 500, Some(L), Some(R)),
            cycle(1, 500, None, Some(R)),
            cycle(2, 500, None, None),
            cycle(3, 500, Some(L), None),
        ];
        // representative hands: L, R, -, L
        let summary = aggregator(1).summarize(cycles, SessionCounts::default());
        assert_eq!(summary.crossovers_count, 2);
        assert_eq!(summary.hand_ratio_sample_size, 3);
        assert!((summary.left_hand_ratio - 2.0 / 3.0).abs() < 1e-12);
        assert!((summary.right_hand_ratio - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_summary_statistics_and_counts() {
        let mut cycles = vec![
            cycle(0, 400, Some(R), Some(R)),
            cycle(1, 600, Some(R), Some(R)),
            cycle(2, 800, Some(R), Some(R)),
        ];
        cycles[1].control_deviation_in_control = None;
        cycles[2].is_crossover = Some(true);

        let counts = SessionCounts {
            total_frames: 120,
            valid_frames: 100,
            shoulder_width_session: 0.45,
            d_thr: 0.45,
        };
        let summary = aggregator(1).summarize(cycles, counts);

        assert_eq!(summary.cycles.len(), 3);
        assert_eq!(summary.total_frames, 120);
        assert_eq!(summary.valid_frames, 100);
        assert!((summary.duration_mean - 600.0).abs() < 1e-9);
        assert!((summary.duration_variance - 80000.0 / 3.0).abs() < 1e-6);
        // deviations 0.1 and 0.3 only
        assert!((summary.control_deviation_mean - 0.2).abs() < 1e-12);
        assert!((summary.control_deviation_variance - 0.01).abs() < 1e-12);
        assert_eq!(summary.crossovers_count, 0);
        assert_eq!(summary.intra_cycle_crossovers, 1);
        assert_eq!(summary.right_hand_ratio, 1.0);
        assert_eq!(summary.left_hand_ratio, 0.0);
        assert_eq!(summary.d_thr, 0.45);
    }

    #[test]
    fn test_empty_session() {
        let summary = aggregator(1).summarize(Vec::new(), SessionCounts::default());
        assert_eq!(summary.crossovers_count, 0);
        assert_eq!(summary.hand_ratio_sample_size, 0);
        assert_eq!(summary.left_hand_ratio, 0.0);
        assert_eq!(summary.duration_mean, 0.0);
    }
}
