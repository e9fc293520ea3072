//! Rows produced by the CSV readers.

use chrono::NaiveDate;
use contagion_core::{PriceBar, RawObservation};
use serde::{Deserialize, Serialize};

/// Daily new-case count for a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub region: String,
    pub date: NaiveDate,
    pub new_cases: i64,
}

impl CaseRecord {
    #[must_use]
    pub fn new(region: impl Into<String>, date: NaiveDate, new_cases: i64) -> Self {
        Self {
            region: region.into(),
            date,
            new_cases,
        }
    }

    #[must_use]
    pub fn observation(&self) -> RawObservation<i64> {
        RawObservation::new(self.date, self.new_cases)
    }
}

/// Daily OHLC levels for an instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub instrument: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceRecord {
    #[must_use]
    pub fn bar(&self) -> PriceBar {
        PriceBar::new(self.date, self.open, self.high, self.low, self.close)
    }
}

/// One point of an exported lag profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LagRow {
    pub shift: usize,
    pub coefficient: f64,
}
