//! The shared analysis calendar.
//!
//! Every dense series in the workspace is addressed by day offset from the
//! start of a single `DateRange`: index `i` is the date `start + i` days.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::error::{AnalysisError, Result};

/// Inclusive calendar bound `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a new range.
    ///
    /// # Errors
    /// Returns `InvalidInput` unless `start < end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start >= end {
            return Err(AnalysisError::invalid(format!(
                "range start {start} must be before end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// First day of the range.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the range (inclusive).
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered, counting both ends.
    #[must_use]
    pub fn duration(&self) -> usize {
        // start < end is enforced on construction, so this is always >= 2
        (self.end - self.start).num_days() as usize + 1
    }

    /// Returns true if `date` lies within the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Day offset of `date` from the start, or `None` outside the range.
    #[must_use]
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        if self.contains(date) {
            Some((date - self.start).num_days() as usize)
        } else {
            None
        }
    }

    /// Calendar date of slot `index`, or `None` past the end.
    #[must_use]
    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        if index >= self.duration() {
            return None;
        }
        self.start.checked_add_days(Days::new(index as u64))
    }

    /// The range widened by `days` leading days.
    ///
    /// Price levels are fetched over this window so the first in-range day
    /// still has a previous level to difference against.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the widened start underflows the calendar.
    pub fn with_lookback(&self, days: u64) -> Result<Self> {
        let start = self.start.checked_sub_days(Days::new(days)).ok_or_else(|| {
            AnalysisError::invalid(format!("lookback of {days} days underflows {}", self.start))
        })?;
        Ok(Self {
            start,
            end: self.end,
        })
    }

    /// Iterates every date in the range in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take(self.duration())
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
