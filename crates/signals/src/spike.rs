//! Spike (event) detection over daily series.
//!
//! A day is an event when the magnitude of its value reaches a threshold.
//! The detector itself is threshold-agnostic; how the threshold is chosen
//! is a `ThresholdStrategy`.

use contagion_core::{AnalysisError, DailySeries, Result, SeriesValue};

/// Resolves the event threshold for one series.
pub trait ThresholdStrategy: Send + Sync {
    /// Computes the threshold magnitude for `values`.
    ///
    /// # Errors
    /// Returns `DegenerateSeries` when no threshold can be derived.
    fn threshold(&self, values: &[f64]) -> Result<f64>;

    /// Short label used in logs.
    fn name(&self) -> &'static str;
}

/// A caller-supplied magnitude, e.g. a per-instrument cutoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedThreshold(pub f64);

impl ThresholdStrategy for FixedThreshold {
    fn threshold(&self, _values: &[f64]) -> Result<f64> {
        Ok(self.0.abs())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Self-calibrating threshold: the mean magnitude of the non-zero entries.
///
/// Zero entries are skipped because alignment fills missing days with zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InflatedAverage;

impl ThresholdStrategy for InflatedAverage {
    fn threshold(&self, values: &[f64]) -> Result<f64> {
        inflated_average(values)
    }

    fn name(&self) -> &'static str {
        "inflated_average"
    }
}

/// Mean of `|v|` over all non-zero `v`.
///
/// # Errors
/// Returns `DegenerateSeries` if every entry is zero (or the slice is empty).
pub fn inflated_average(values: &[f64]) -> Result<f64> {
    let (sum, count) = values
        .iter()
        .filter(|v| **v != 0.0)
        .fold((0.0, 0usize), |(sum, count), v| (sum + v.abs(), count + 1));

    if count == 0 {
        return Err(AnalysisError::DegenerateSeries(format!(
            "all {} entries are zero; inflated average is undefined",
            values.len()
        )));
    }

    Ok(sum / count as f64)
}

/// True iff `|series[index]| >= threshold`. Out-of-range indices are never events.
#[must_use]
pub fn is_event<T: SeriesValue>(series: &DailySeries<T>, index: usize, threshold: f64) -> bool {
    series
        .get(index)
        .is_some_and(|v| reaches(v.as_f64(), threshold))
}

/// Indices of every event in `values`, ascending.
#[must_use]
pub fn event_indices(values: &[f64], threshold: f64) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| reaches(**v, threshold))
        .map(|(i, _)| i)
        .collect()
}

/// The event rule shared by [`is_event`] and [`event_indices`].
fn reaches(value: f64, threshold: f64) -> bool {
    value.abs() >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use contagion_core::DateRange;

    fn series(values: Vec<i64>) -> DailySeries<i64> {
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let end = start + chrono::Days::new(values.len() as u64 - 1);
        DailySeries::from_dense(DateRange::new(start, end).unwrap(), values).unwrap()
    }

    #[test]
    fn is_event_compares_magnitude_inclusively() {
        let s = series(vec![0, 5, -7, 4]);

        assert!(!is_event(&s, 0, 5.0));
        assert!(is_event(&s, 1, 5.0));
        assert!(is_event(&s, 2, 5.0));
        assert!(!is_event(&s, 3, 5.0));
        assert!(!is_event(&s, 99, 0.0));
    }

    #[test]
    fn event_indices_agree_with_is_event() {
        let s = series(vec![0, 5, -7, 4, -5, 12, 0]);
        let values = s.to_f64();

        for threshold in [0.0, 4.0, 5.0, 7.5, 13.0] {
            let expected: Vec<usize> = (0..s.len()).filter(|i| is_event(&s, *i, threshold)).collect();
            assert_eq!(event_indices(&values, threshold), expected, "threshold {threshold}");
        }
        assert_eq!(event_indices(&values, 5.0), vec![1, 2, 4, 5]);
    }

    #[test]
    fn inflated_average_ignores_zero_fill() {
        let threshold = inflated_average(&[0.0, 2.0, 0.0, -4.0, 0.0]).unwrap();
        assert!((threshold - 3.0).abs() < 1e-12);
    }

    #[test]
    fn inflated_average_of_all_zero_is_degenerate() {
        assert!(matches!(
            inflated_average(&[0.0, 0.0, 0.0]),
            Err(AnalysisError::DegenerateSeries(_))
        ));
        assert!(inflated_average(&[]).is_err());
    }

    #[test]
    fn fixed_threshold_ignores_series() {
        let strategy = FixedThreshold(-2000.0);
        assert_eq!(strategy.threshold(&[0.0, 0.0]).unwrap(), 2000.0);
        assert_eq!(strategy.name(), "fixed");
    }

    #[test]
    fn strategies_are_interchangeable() {
        let values = [1.0, 0.0, 3.0, 0.0, 5.0];
        let strategies: [&dyn ThresholdStrategy; 2] = [&InflatedAverage, &FixedThreshold(4.0)];

        let events: Vec<Vec<usize>> = strategies
            .iter()
            .map(|s| event_indices(&values, s.threshold(&values).unwrap()))
            .collect();

        assert_eq!(events[0], vec![2, 4]);
        assert_eq!(events[1], vec![4]);
    }
}
