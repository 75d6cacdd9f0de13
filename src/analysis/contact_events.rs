// src/analysis/contact_events.rs
//
// Run-length grouping of per-frame hand labels into contact events.
//
//   NoActiveHand ──L/R──────────▶ ActiveHand(h, i)
//   ActiveHand(h, s) ──h─────────▶ ActiveHand(h, s)        (run continues)
//   ActiveHand(h, s) ──other hand▶ ActiveHand(h', i)       (emit [s, i-1])
//   ActiveHand(h, s) ──None/unk──▶ NoActiveHand            (emit [s, i-1])
//   end of frames: ActiveHand(h, s) emits [s, last]

use crate::types::{ContactEvent, Hand, LabeledFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    NoActiveHand,
    ActiveHand { hand: Hand, start: usize },
}

/// Time base for normalizing event timestamps within a cycle.
#[derive(Debug, Clone, Copy)]
pub struct CycleClock {
    pub start_time_ms: i64,
    pub duration_ms: i64,
}

impl CycleClock {
    /// `(t - start) / duration`, undefined for non-positive durations.
    pub fn normalize(&self, t_ms: i64) -> Option<f64> {
        (self.duration_ms > 0)
            .then(|| (t_ms - self.start_time_ms) as f64 / self.duration_ms as f64)
    }

    pub fn normalize_f64(&self, t_ms: f64) -> Option<f64> {
        (self.duration_ms > 0)
            .then(|| (t_ms - self.start_time_ms as f64) / self.duration_ms as f64)
    }
}

fn build_event(
    frames: &[LabeledFrame],
    hand: Hand,
    start: usize,
    end: usize,
    clock: CycleClock,
) -> ContactEvent {
    let first = &frames[start];
    let last = &frames[end];
    ContactEvent {
        hand,
        start_frame_index: first.frame_index,
        end_frame_index: last.frame_index,
        frame_count: end - start + 1,
        t_start_ms: first.timestamp_ms,
        t_end_ms: last.timestamp_ms,
        t_norm_start: clock.normalize(first.timestamp_ms),
        t_norm_end: clock.normalize(last.timestamp_ms),
    }
}

/// Maximal same-hand runs, in frame order.
pub fn group_contact_events(frames: &[LabeledFrame], clock: CycleClock) -> Vec<ContactEvent> {
    let mut events = Vec::new();
    let mut state = RunState::NoActiveHand;

    for (i, frame) in frames.iter().enumerate() {
        let label_hand = frame.contact_label.hand();
        state = match (state, label_hand) {
            (RunState::NoActiveHand, None) => RunState::NoActiveHand,
            (RunState::NoActiveHand, Some(hand)) => RunState::ActiveHand { hand, start: i },
            (RunState::ActiveHand { hand, start }, Some(h)) if h == hand => {
                RunState::ActiveHand { hand, start }
            }
            (RunState::ActiveHand { hand, start }, Some(other)) => {
                events.push(build_event(frames, hand, start, i - 1, clock));
                RunState::ActiveHand {
                    hand: other,
                    start: i,
                }
            }
            (RunState::ActiveHand { hand, start }, None) => {
                events.push(build_event(frames, hand, start, i - 1, clock));
                RunState::NoActiveHand
            }
        };
    }

    if let RunState::ActiveHand { hand, start } = state {
        events.push(build_event(frames, hand, start, frames.len() - 1, clock));
    }

    events
}
