//! Dribble analytics: turns a per-frame stream of tracked ball and pose
//! positions into dribble cycles, hand-contact labels, per-cycle control
//! metrics and a session summary.

pub mod analysis;
pub mod config;
pub mod error;
pub mod frame_source;
pub mod pipeline;
pub mod types;

pub use error::{AnalysisError, AnalysisResult};
pub use pipeline::{PipelineOrchestrator, PipelineOutput};
pub use types::{Config, FrameStream, RawFrame, SessionSummary};
