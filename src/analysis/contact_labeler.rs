// src/analysis/contact_labeler.rs
//
// Per-frame hand contact. The contact threshold is session-wide:
//   d_thr = threshold_k * median(shoulder width)
// and each frame is labelled by whichever wrist is closer to the ball, if
// that wrist is within d_thr. Exact ties go to the left hand.

use crate::types::{distance, ContactConfig, ContactLabel, LabeledFrame, NormalizedFrame};
use tracing::{debug, info};

/// Session-level outputs of the labelling pass.
#[derive(Debug, Clone)]
pub struct LabelingOutcome {
    pub frames: Vec<LabeledFrame>,
    pub shoulder_width_session: f64,
    pub d_thr: f64,
}

pub struct ContactLabeler {
    threshold_k: f64,
}

impl ContactLabeler {
    pub fn new(config: &ContactConfig) -> Self {
        Self {
            threshold_k: config.threshold_k,
        }
    }

    /// Median shoulder-to-shoulder distance, 0.0 if no frame has both.
    pub fn shoulder_width_session(frames: &[NormalizedFrame]) -> f64 {
        let mut widths: Vec<f64> = frames
            .iter()
            .filter_map(|f| distance(f.landmarks.left_shoulder, f.landmarks.right_shoulder))
            .collect();
        median(&mut widths).unwrap_or(0.0)
    }

    /// Label rule for one frame given its wrist distances.
    ///
    /// `ball_present` / `any_wrist` gate the `Unknown` label; the distance
    /// comparison is strict against `d_thr` and favours L on equality.
    pub fn classify(
        ball_present: bool,
        any_wrist: bool,
        d_left: Option<f64>,
        d_right: Option<f64>,
        d_thr: f64,
    ) -> ContactLabel {
        if !ball_present || !any_wrist {
            return ContactLabel::Unknown;
        }
        match (d_left, d_right) {
            (None, None) => ContactLabel::Unknown,
            (Some(l), r) if l < d_thr && r.map_or(true, |r| l <= r) => ContactLabel::Left,
            (l, Some(r)) if r < d_thr && l.map_or(true, |l| r < l) => ContactLabel::Right,
            _ => ContactLabel::NoContact,
        }
    }

    pub fn label_frame(&self, frame: &NormalizedFrame, d_thr: f64) -> LabeledFrame {
        let lm = &frame.landmarks;
        let d_left = distance(frame.ball_center, lm.left_wrist);
        let d_right = distance(frame.ball_center, lm.right_wrist);
        let d_min = match (d_left, d_right) {
            (Some(l), Some(r)) => Some(l.min(r)),
            (l, r) => l.or(r),
        };

        let contact_label = Self::classify(
            frame.ball_center.is_some(),
            lm.left_wrist.is_some() || lm.right_wrist.is_some(),
            d_left,
            d_right,
            d_thr,
        );

        LabeledFrame {
            frame_index: frame.frame_index,
            timestamp_ms: frame.timestamp_ms,
            cycle_id: None,
            contact_label,
            d_left,
            d_right,
            d_min,
            ball_center: frame.ball_center,
            landmarks: frame.landmarks,
        }
    }

    pub fn label_frames(&self, frames: &[NormalizedFrame]) -> LabelingOutcome {
        let shoulder_width_session = Self::shoulder_width_session(frames);
        let d_thr = self.threshold_k * shoulder_width_session;
        info!(
            "Shoulder width (session median): {:.4}, d_thr: {:.4}",
            shoulder_width_session, d_thr
        );

        let labeled: Vec<LabeledFrame> = frames.iter().map(|f| self.label_frame(f, d_thr)).collect();

        let count = |label: ContactLabel| labeled.iter().filter(|f| f.contact_label == label).count();
        debug!(
            "Labels: L={} R={} None={} unknown={}",
            count(ContactLabel::Left),
            count(ContactLabel::Right),
            count(ContactLabel::NoContact),
            count(ContactLabel::Unknown)
        );

        LabelingOutcome {
            frames: labeled,
            shoulder_width_session,
            d_thr,
        }
    }
}

/// Median with the even-length case averaged. Sorts `values` in place.
fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
