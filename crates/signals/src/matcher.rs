//! Pairing of case events with instrument events inside a reaction window.
//!
//! Both event lists are swept with independent cursors. Events closer than
//! the window are paired; an event with no partner is paired with a zero
//! placeholder. The two output sequences are therefore always the same
//! length and can be correlated directly.

use contagion_core::Result;
use serde::Serialize;

use crate::spike::{event_indices, ThresholdStrategy};

/// Parallel sequences produced by the matcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchedSpikes {
    pub case_values: Vec<f64>,
    pub instrument_values: Vec<f64>,
    /// Number of positions where both sides carry a real event
    pub matched: usize,
}

impl MatchedSpikes {
    #[must_use]
    pub fn len(&self) -> usize {
        self.case_values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.case_values.is_empty()
    }

    /// Positions where one side is a placeholder.
    #[must_use]
    pub fn unmatched(&self) -> usize {
        self.len() - self.matched
    }

    fn push(&mut self, case_value: f64, instrument_value: f64) {
        self.case_values.push(case_value);
        self.instrument_values.push(instrument_value);
    }
}

/// Sweeps precomputed event indices of both series.
///
/// `case_events` and `instrument_events` must be ascending indices into
/// `case` and `instrument` respectively. Every event lands in exactly one
/// output position; non-event days never appear. A `max_gap` of zero only
/// pairs events on the same day.
#[must_use]
pub fn match_events(
    case: &[f64],
    case_events: &[usize],
    instrument: &[f64],
    instrument_events: &[usize],
    max_gap: usize,
) -> MatchedSpikes {
    let mut out = MatchedSpikes::default();
    let mut i = 0;
    let mut j = 0;

    while i < case_events.len() || j < instrument_events.len() {
        match (case_events.get(i), instrument_events.get(j)) {
            (Some(&a), Some(&b)) if a.abs_diff(b) <= max_gap => {
                out.push(case[a], instrument[b]);
                out.matched += 1;
                i += 1;
                j += 1;
            }
            // the cursor that is behind advances alone so the other side can catch up
            (Some(&a), Some(&b)) if a < b => {
                out.push(case[a], 0.0);
                i += 1;
            }
            (Some(_), Some(&b)) => {
                out.push(0.0, instrument[b]);
                j += 1;
            }
            (Some(&a), None) => {
                out.push(case[a], 0.0);
                i += 1;
            }
            (None, Some(&b)) => {
                out.push(0.0, instrument[b]);
                j += 1;
            }
            (None, None) => break,
        }
    }

    out
}

/// Detects events in both series with their own strategies, then matches them.
///
/// # Errors
/// Propagates `DegenerateSeries` from a strategy that cannot derive a
/// threshold (an all-zero series under the inflated-average rule).
pub fn match_spikes(
    case: &[f64],
    instrument: &[f64],
    max_gap: usize,
    case_strategy: &dyn ThresholdStrategy,
    instrument_strategy: &dyn ThresholdStrategy,
) -> Result<MatchedSpikes> {
    let case_threshold = case_strategy.threshold(case)?;
    let instrument_threshold = instrument_strategy.threshold(instrument)?;

    let case_events = event_indices(case, case_threshold);
    let instrument_events = event_indices(instrument, instrument_threshold);

    let matched = match_events(case, &case_events, instrument, &instrument_events, max_gap);

    tracing::debug!(
        case_strategy = case_strategy.name(),
        instrument_strategy = instrument_strategy.name(),
        case_threshold,
        instrument_threshold,
        case_events = case_events.len(),
        instrument_events = instrument_events.len(),
        matched = matched.matched,
        max_gap,
        "matched spikes"
    );

    Ok(matched)
}
