//! Dense daily series addressed by calendar offset.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::DateRange;

/// A value that can be stored in a `DailySeries`.
///
/// Case counts are integers and price deltas are reals; both are read as
/// `f64` by detection and correlation.
pub trait SeriesValue: Copy + Default + PartialEq + std::fmt::Debug {
    /// Lossy view of the value as a real number.
    fn as_f64(self) -> f64;
}

impl SeriesValue for i64 {
    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl SeriesValue for f64 {
    fn as_f64(self) -> f64 {
        self
    }
}

/// A single `(date, value)` row as emitted by an ingestion collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawObservation<T> {
    pub date: NaiveDate,
    pub value: T,
}

impl<T> RawObservation<T> {
    #[must_use]
    pub const fn new(date: NaiveDate, value: T) -> Self {
        Self { date, value }
    }
}

/// Dense series over a `DateRange`; slot `i` is the value on `start + i`.
///
/// The length always equals `range.duration()`. Days without a source
/// observation hold the default value supplied at alignment time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeries<T> {
    range: DateRange,
    values: Vec<T>,
}

impl<T: SeriesValue> DailySeries<T> {
    /// Wraps already-dense values. Returns `None` on a length mismatch.
    #[must_use]
    pub fn from_dense(range: DateRange, values: Vec<T>) -> Option<Self> {
        (values.len() == range.duration()).then_some(Self { range, values })
    }

    /// A series of `default` on every day of `range`.
    #[must_use]
    pub fn filled(range: DateRange, default: T) -> Self {
        Self {
            range,
            values: vec![default; range.duration()],
        }
    }

    #[must_use]
    pub const fn range(&self) -> &DateRange {
        &self.range
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.values.get(index).copied()
    }

    /// Value on `date`, or `None` outside the range.
    #[must_use]
    pub fn on(&self, date: NaiveDate) -> Option<T> {
        self.range.index_of(date).and_then(|i| self.get(i))
    }

    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// The series as reals, for detection and correlation.
    #[must_use]
    pub fn to_f64(&self) -> Vec<f64> {
        self.values.iter().map(|v| v.as_f64()).collect()
    }

    /// Number of slots that differ from the type's default.
    #[must_use]
    pub fn populated(&self) -> usize {
        self.values.iter().filter(|v| **v != T::default()).count()
    }
}
