// src/error.rs

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Cycle metrics were requested for a cycle with no frames. This is a
    /// contract violation in the caller, never a data-quality condition.
    #[error("cycle {cycle_id} has no frames")]
    EmptyCycle { cycle_id: usize },

    #[error("duplicate frame_index {frame_index} in labeled frames")]
    DuplicateFrameIndex { frame_index: u64 },

    #[error("frame_index must be strictly increasing: {previous} followed by {current}")]
    NonMonotonicFrameIndex { previous: u64, current: u64 },

    #[error("timestamp_ms must not decrease: {previous_ms} followed by {current_ms} at frame {frame_index}")]
    NonMonotonicTimestamp {
        frame_index: u64,
        previous_ms: i64,
        current_ms: i64,
    },

    #[error("fps must be finite and > 0, got {0}")]
    InvalidFps(f64),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
