//! Signal construction and statistics over aligned daily series.
//!
//! Pipeline stages, leaf first:
//! - [`align`]: sparse observations onto the dense analysis calendar
//! - [`transform`]: price levels into day-over-day deltas
//! - [`spike`]: event detection with injectable threshold strategies
//! - [`matcher`]: pairing of case events with instrument events
//! - [`correlation`]: Pearson coefficient with a degenerate-input fallback

pub mod align;
pub mod correlation;
pub mod matcher;
pub mod spike;
pub mod transform;

pub use align::align;
pub use correlation::{correlation, windowed_correlation};
pub use matcher::{match_events, match_spikes, MatchedSpikes};
pub use spike::{
    event_indices, inflated_average, is_event, FixedThreshold, InflatedAverage,
    ThresholdStrategy,
};
pub use transform::{bar_deltas, differentiate, StreamDeltas};
