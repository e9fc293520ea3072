//! Calendar alignment of sparse daily observations.

use contagion_core::{AnalysisError, DailySeries, DateRange, RawObservation, Result, SeriesValue};

/// Places `observations` onto the dense calendar of `range`.
///
/// Slot `i` receives the value dated `range.start() + i`; days with no
/// observation receive `default`. Nothing is interpolated or carried
/// forward. Input order does not matter.
///
/// # Errors
/// Returns `InvalidInput` if an observation falls outside `range` or if two
/// observations share a date.
pub fn align<T: SeriesValue>(
    observations: &[RawObservation<T>],
    range: &DateRange,
    default: T,
) -> Result<DailySeries<T>> {
    let mut slots: Vec<Option<T>> = vec![None; range.duration()];

    for observation in observations {
        let index = range.index_of(observation.date).ok_or_else(|| {
            AnalysisError::InvalidInput(format!(
                "observation dated {} lies outside {}",
                observation.date, range
            ))
        })?;

        if slots[index].replace(observation.value).is_some() {
            return Err(AnalysisError::InvalidInput(format!(
                "duplicate observation for {}",
                observation.date
            )));
        }
    }

    let values = slots.into_iter().map(|v| v.unwrap_or(default)).collect();
    DailySeries::from_dense(*range, values).ok_or_else(|| {
        AnalysisError::InvalidInput(format!("aligned length does not match {range}"))
    })
}
