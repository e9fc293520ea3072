//! Differencing of absolute price levels into day-over-day deltas.

use chrono::NaiveDate;
use contagion_core::{
    AnalysisError, DailySeries, DateRange, PriceBar, PriceStream, RawObservation, Result,
};
use serde::Serialize;

use crate::align::align;

/// Converts absolute levels into changes from the previous level.
///
/// `result[i] = levels[i + 1] - levels[i]`, so the result is one shorter
/// than the input.
///
/// # Errors
/// Returns `InsufficientData` if fewer than two levels are given.
pub fn differentiate(levels: &[f64]) -> Result<Vec<f64>> {
    if levels.len() < 2 {
        return Err(AnalysisError::InsufficientData {
            needed: 2,
            got: levels.len(),
        });
    }

    Ok(levels.windows(2).map(|w| w[1] - w[0]).collect())
}

/// Aligned daily deltas for all four price streams of one instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamDeltas {
    streams: [DailySeries<f64>; 4],
}

impl StreamDeltas {
    /// Deltas of one stream.
    #[must_use]
    pub fn get(&self, stream: PriceStream) -> &DailySeries<f64> {
        &self.streams[stream.index()]
    }

    /// Number of days with a non-zero close delta.
    #[must_use]
    pub fn trading_days(&self) -> usize {
        self.get(PriceStream::Close).populated()
    }

    /// Consumes the deltas in `PriceStream::ALL` order.
    #[must_use]
    pub fn into_streams(self) -> [DailySeries<f64>; 4] {
        self.streams
    }
}

/// Differences each stream of `bars` and aligns the deltas onto `range`.
///
/// Bars are sorted by date first. Each delta is dated by the later of its
/// two bars, so the earliest bar only serves as a baseline. Bars should
/// start at least one day before `range.start()` so the first in-range
/// trading day keeps its delta; deltas dated before the range are dropped.
/// Days without a bar get `0.0`.
///
/// # Errors
/// Returns `InsufficientData` for fewer than two bars, and `InvalidInput`
/// for duplicate dates or bars dated after the range.
pub fn bar_deltas(bars: &[PriceBar], range: &DateRange) -> Result<StreamDeltas> {
    let mut sorted = bars.to_vec();
    sorted.sort_by_key(|b| b.date);

    if sorted.len() < 2 {
        return Err(AnalysisError::InsufficientData {
            needed: 2,
            got: sorted.len(),
        });
    }

    let dates: Vec<NaiveDate> = sorted[1..].iter().map(|b| b.date).collect();
    let dropped = dates.iter().filter(|d| **d < range.start()).count();
    if dropped > 0 {
        tracing::debug!(dropped, start = %range.start(), "dropping lookback deltas");
    }

    let stream_series = |stream: PriceStream| -> Result<DailySeries<f64>> {
        let levels: Vec<f64> = sorted.iter().map(|b| b.level(stream)).collect();
        let observations: Vec<RawObservation<f64>> = dates
            .iter()
            .zip(differentiate(&levels)?)
            .filter(|(date, _)| **date >= range.start())
            .map(|(date, delta)| RawObservation::new(*date, delta))
            .collect();
        align(&observations, range, 0.0)
    };

    let [open, high, low, close] = PriceStream::ALL.map(stream_series);
    Ok(StreamDeltas {
        streams: [open?, high?, low?, close?],
    })
}
