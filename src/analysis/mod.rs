// src/analysis/mod.rs
//
// Dribble analytics stages.
//
// Signal flow:
//   RawFrame stream → sequence_cleaner → normalizer ─┬→ contact_labeler ──┐
//                                                    └→ cycle_detector ───┼→ cycle_metrics → session_aggregator
//                                                       (peak_finder)     │   (contact_events)
//
// Orchestrated by pipeline::PipelineOrchestrator.

pub mod contact_events;
pub mod contact_labeler;
pub mod cycle_detector;
pub mod cycle_metrics;
pub mod normalizer;
pub mod peak_finder;
pub mod sequence_cleaner;
pub mod session_aggregator;

pub use contact_events::{group_contact_events, CycleClock};
pub use contact_labeler::{ContactLabeler, LabelingOutcome};
pub use cycle_detector::{CycleDetection, CycleDetector};
pub use cycle_metrics::CycleMetrics;
pub use normalizer::CoordinateNormalizer;
pub use peak_finder::{find_peaks, PeakConstraints};
pub use sequence_cleaner::{CleaningReport, SequenceCleaner};
pub use session_aggregator::{count_crossovers, mean_and_variance, SessionAggregator, SessionCounts};
