// src/analysis/normalizer.rs
//
// Body-relative coordinates: origin at the hip center, unit length equal to
// the shoulder-center to hip-center distance. Makes every downstream
// threshold independent of player size, camera distance and resolution.

use crate::types::{NormalizationTransform, NormalizedFrame, Point, RawFrame};
use tracing::info;

/// Frames whose torso is shorter than this (px) are too unreliable to scale by.
pub const MIN_BODY_HEIGHT_PX: f64 = 10.0;

pub struct CoordinateNormalizer;

impl CoordinateNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Transform for a single frame, or `None` when hip/shoulders are missing
    /// or the torso is degenerate.
    pub fn transform_for(frame: &RawFrame) -> Option<NormalizationTransform> {
        let hip = frame.landmarks.hip_center?;
        let left = frame.landmarks.left_shoulder?;
        let right = frame.landmarks.right_shoulder?;

        let body_height = left.midpoint(&right).distance(&hip);
        if body_height < MIN_BODY_HEIGHT_PX {
            return None;
        }

        Some(NormalizationTransform {
            origin: hip,
            scale: body_height,
        })
    }

    pub fn normalize_frame(&self, frame: &RawFrame) -> Option<NormalizedFrame> {
        let transform = Self::transform_for(frame)?;
        let mut landmarks = frame.landmarks.map(|p| transform.apply(p));
        landmarks.hip_center = Some(Point::ORIGIN);

        Some(NormalizedFrame {
            frame_index: frame.frame_index,
            timestamp_ms: frame.timestamp_ms,
            ball_center: frame.ball_center.map(|p| transform.apply(p)),
            landmarks,
            body_height: 1.0,
            transform,
        })
    }

    /// One entry per input frame; `None` marks frames excluded downstream.
    pub fn normalize(&self, frames: &[RawFrame]) -> Vec<Option<NormalizedFrame>> {
        let normalized: Vec<Option<NormalizedFrame>> =
            frames.iter().map(|f| self.normalize_frame(f)).collect();

        let kept = normalized.iter().filter(|f| f.is_some()).count();
        info!("Normalized {} frames", kept);
        info!("Skipped {} frames (missing pose data)", frames.len() - kept);

        normalized
    }
}

impl Default for CoordinateNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Landmarks;

    fn posed_frame(ball: Option<Point>) -> RawFrame {
        RawFrame {
            frame_index: 0,
            timestamp_ms: 0,
            ball_center: ball,
            landmarks: Landmarks {
                hip_center: Some(Point::new(500.0, 500.0)),
                left_shoulder: Some(Point::new(450.0, 400.0)),
                right_shoulder: Some(Point::new(550.0, 400.0)),
                left_wrist: Some(Point::new(420.0, 520.0)),
                ..Landmarks::default()
            },
        }
    }

    #[test]
    fn test_ball_below_shoulders_normalizes_to_half_body() {
        let n = CoordinateNormalizer::new();
        let out = n.normalize_frame(&posed_frame(Some(Point::new(500.0, 450.0)))).unwrap();

        assert_eq!(out.transform.scale, 100.0);
        assert_eq!(out.body_height, 1.0);
        assert_eq!(out.ball_center, Some(Point::new(0.0, -0.5)));
        assert_eq!(out.landmarks.hip_center, Some(Point::ORIGIN));
        assert_eq!(out.landmarks.left_shoulder, Some(Point::new(-0.5, -1.0)));
        assert_eq!(out.landmarks.left_wrist, Some(Point::new(-0.8, 0.2)));
        assert!(out.landmarks.right_knee.is_none());
    }

    #[test]
    fn test_missing_pose_maps_to_none() {
        let n = CoordinateNormalizer::new();
        let mut frame = posed_frame(None);
        frame.landmarks.right_shoulder = None;
        assert!(n.normalize_frame(&frame).is_none());

        let mut frame = posed_frame(None);
        frame.landmarks.hip_center = None;
        assert!(n.normalize_frame(&frame).is_none());
    }

    #[test]
    fn test_short_torso_is_rejected() {
        let n = CoordinateNormalizer::new();
        let mut frame = posed_frame(None);
        frame.landmarks.left_shoulder = Some(Point::new(495.0, 491.0));
        frame.landmarks.right_shoulder = Some(Point::new(505.0, 491.0));
        // body height 9 px
        assert!(n.normalize_frame(&frame).is_none());

        frame.landmarks.left_shoulder = Some(Point::new(495.0, 490.0));
        frame.landmarks.right_shoulder = Some(Point::new(505.0, 490.0));
        // exactly 10 px is accepted
        assert!(n.normalize_frame(&frame).is_some());
    }

    #[test]
    fn test_round_trip_recovers_pixels() {
        let n = CoordinateNormalizer::new();
        let ball = Point::new(612.0, 733.0);
        let out = n.normalize_frame(&posed_frame(Some(ball))).unwrap();
        let back = out.transform.invert(out.ball_center.unwrap());
        assert!((back.x - ball.x).abs() < 1e-9);
        assert!((back.y - ball.y).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_keeps_one_slot_per_frame() {
        let n = CoordinateNormalizer::new();
        let mut bad = posed_frame(None);
        bad.landmarks.hip_center = None;
        let out = n.normalize(&[posed_frame(None), bad, posed_frame(None)]);
        assert_eq!(out.len(), 3);
        assert!(out[0].is_some() && out[1].is_none() && out[2].is_some());
    }
}
