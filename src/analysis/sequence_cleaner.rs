// src/analysis/sequence_cleaner.rs
//
// Velocity-based outlier repair for the raw ball track. A frame whose ball
// moved further than `max_velocity` from the previous frame is flagged, then
// replaced by linear interpolation between the nearest unflagged frames that
// have a ball on either side. Frames are never dropped.

use crate::types::{CleaningConfig, RawFrame};
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleaningReport {
    pub outliers_flagged: usize,
    pub outliers_repaired: usize,
}

pub struct SequenceCleaner {
    max_velocity: f64,
}

impl SequenceCleaner {
    pub fn new(config: &CleaningConfig) -> Self {
        Self {
            max_velocity: config.max_velocity,
        }
    }

    /// Positions (into `frames`) whose ball jumped more than `max_velocity`
    /// from the immediately preceding frame.
    pub fn detect_outliers(&self, frames: &[RawFrame]) -> Vec<usize> {
        frames
            .windows(2)
            .enumerate()
            .filter_map(|(i, pair)| match (pair[0].ball_center, pair[1].ball_center) {
                (Some(prev), Some(curr)) if prev.distance(&curr) > self.max_velocity => {
                    Some(i + 1)
                }
                _ => None,
            })
            .collect()
    }

    /// Replace each outlier with the interpolated position between its
    /// nearest valid neighbours. Outliers without a neighbour on both sides
    /// are left untouched. Returns how many were repaired.
    pub fn interpolate_outliers(&self, frames: &mut [RawFrame], outliers: &[usize]) -> usize {
        let flagged: HashSet<usize> = outliers.iter().copied().collect();
        let is_anchor =
            |frames: &[RawFrame], i: usize| frames[i].ball_center.is_some() && !flagged.contains(&i);

        let mut repaired = 0;
        for &idx in outliers {
            let prev = (0..idx).rev().find(|&i| is_anchor(frames, i));
            let next = (idx + 1..frames.len()).find(|&i| is_anchor(frames, i));

            let (Some(prev), Some(next)) = (prev, next) else {
                debug!(
                    "Outlier at frame {} has no valid neighbour on both sides, kept",
                    frames[idx].frame_index
                );
                continue;
            };
            let (Some(a), Some(b)) = (frames[prev].ball_center, frames[next].ball_center) else {
                continue;
            };

            let t = (idx - prev) as f64 / (next - prev) as f64;
            frames[idx].ball_center = Some(a.lerp(&b, t));
            repaired += 1;
        }
        repaired
    }

    /// Detect and repair outliers, returning the corrected stream.
    pub fn clean(&self, mut frames: Vec<RawFrame>) -> (Vec<RawFrame>, CleaningReport) {
        let outliers = self.detect_outliers(&frames);
        info!(
            "Found {} outlier positions (moved >{} px)",
            outliers.len(),
            self.max_velocity
        );

        let repaired = if outliers.is_empty() {
            0
        } else {
            let n = self.interpolate_outliers(&mut frames, &outliers);
            info!("Corrected {} outlier positions using linear interpolation", n);
            n
        };

        (
            frames,
            CleaningReport {
                outliers_flagged: outliers.len(),
                outliers_repaired: repaired,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Landmarks, Point};

    fn frame(i: u64, ball: Option<(f64, f64)>) -> RawFrame {
        RawFrame {
            frame_index: i,
            timestamp_ms: (i * 33) as i64,
            ball_center: ball.map(Point::from),
            landmarks: Landmarks::default(),
        }
    }

    fn cleaner() -> SequenceCleaner {
        SequenceCleaner::new(&CleaningConfig { max_velocity: 100.0 })
    }

    #[test]
    fn test_jump_and_return_without_later_anchor_is_kept() {
        // (0,0) (0,0) (0,200) (0,0): frames 2 and 3 are both flagged and
        // neither has a valid later neighbour.
        let frames = vec![
            frame(0, Some((0.0, 0.0))),
            frame(1, Some((0.0, 0.0))),
            frame(2, Some((0.0, 200.0))),
            frame(3, Some((0.0, 0.0))),
        ];
        let c = cleaner();
        assert_eq!(c.detect_outliers(&frames), vec![2, 3]);

        let (cleaned, report) = c.clean(frames);
        assert_eq!(report.outliers_flagged, 2);
        assert_eq!(report.outliers_repaired, 0);
        assert_eq!(cleaned[2].ball_center, Some(Point::new(0.0, 200.0)));
        assert_eq!(cleaned[3].ball_center, Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_spike_interpolated_between_neighbours() {
        let frames = vec![
            frame(0, Some((0.0, 0.0))),
            frame(1, Some((10.0, 10.0))),
            frame(2, Some((10.0, 400.0))),
            frame(3, Some((10.0, 30.0))),
            frame(4, Some((20.0, 40.0))),
        ];
        let (cleaned, report) = cleaner().clean(frames);

        // 2 and 3 are flagged; 2 sits between 1 and 4 at t = 1/3.
        assert_eq!(report.outliers_flagged, 2);
        assert_eq!(report.outliers_repaired, 2);
        let p2 = cleaned[2].ball_center.unwrap();
        assert!((p2.x - 13.333_333).abs() < 1e-4);
        assert!((p2.y - 20.0).abs() < 1e-9);
        let p3 = cleaned[3].ball_center.unwrap();
        assert!((p3.y - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_frames_are_skipped_when_searching() {
        let frames = vec![
            frame(0, Some((0.0, 0.0))),
            frame(1, None),
            frame(2, Some((0.0, 0.0))),
            frame(3, Some((0.0, 300.0))),
            frame(4, None),
            frame(5, Some((0.0, 60.0))),
        ];
        let c = cleaner();
        // Jump 3 -> 4 is not checked (4 missing), so only 3 is flagged.
        assert_eq!(c.detect_outliers(&frames), vec![3]);

        let (cleaned, _) = c.clean(frames);
        let p3 = cleaned[3].ball_center.unwrap();
        assert!((p3.y - 20.0).abs() < 1e-9);
        assert_eq!(cleaned.len(), 6);
        assert!(cleaned[4].ball_center.is_none());
    }

    #[test]
    fn test_repaired_sequence_respects_max_velocity() {
        let mut frames: Vec<RawFrame> = (0..20)
            .map(|i| frame(i, Some((i as f64 * 5.0, 100.0 + i as f64 * 3.0))))
            .collect();
        frames[7].ball_center = Some(Point::new(900.0, 900.0));
        frames[13].ball_center = Some(Point::new(-500.0, 20.0));

        let c = cleaner();
        let (cleaned, _) = c.clean(frames);
        for pair in cleaned.windows(2) {
            let a = pair[0].ball_center.unwrap();
            let b = pair[1].ball_center.unwrap();
            assert!(a.distance(&b) <= 100.0);
        }
    }

    #[test]
    fn test_empty_and_single_frame_streams() {
        let c = cleaner();
        let (cleaned, report) = c.clean(Vec::new());
        assert!(cleaned.is_empty());
        assert_eq!(report, CleaningReport::default());

        let (cleaned, report) = c.clean(vec![frame(0, Some((1.0, 1.0)))]);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(report.outliers_flagged, 0);
    }
}
