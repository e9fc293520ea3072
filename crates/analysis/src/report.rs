//! Per-pair summaries across every loaded region and instrument.

use contagion_core::{AppConfig, PriceStream, Result};
use contagion_signals::correlation;
use serde::Serialize;

use crate::manager::SeriesManager;

/// Parameters shared by every pair in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRequest {
    pub stream: PriceStream,
    pub max_shift: usize,
    pub max_gap: usize,
}

impl ReportRequest {
    /// Defaults taken from the `[analysis]` section.
    #[must_use]
    pub fn from_config(config: &AppConfig, stream: PriceStream) -> Self {
        Self {
            stream,
            max_shift: config.analysis.max_shift,
            max_gap: config.analysis.max_gap,
        }
    }
}

/// A coefficient at a given lag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LagPoint {
    pub shift: usize,
    pub coefficient: f64,
}

/// Outcome of the spike-matching model for one pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalSummary {
    pub coefficient: f64,
    /// Events paired on both sides
    pub matched: usize,
    /// Events paired with a placeholder
    pub unmatched: usize,
}

/// Global and local results for one region × instrument pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairReport {
    pub region: String,
    pub instrument: String,
    /// "<region name> v. <instrument name>"
    pub label: String,
    pub stream: PriceStream,
    pub lag_profile: Vec<f64>,
    pub strongest_lag: Option<LagPoint>,
    pub local: Option<LocalSummary>,
    /// Why `local` is missing, e.g. a region with no cases in the window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_error: Option<String>,
}

/// Lag with the largest absolute coefficient; the smaller lag wins ties.
#[must_use]
pub fn strongest_lag(profile: &[f64]) -> Option<LagPoint> {
    profile
        .iter()
        .enumerate()
        .fold(None, |best: Option<LagPoint>, (shift, &coefficient)| match best {
            Some(b) if b.coefficient.abs() >= coefficient.abs() => Some(b),
            _ => Some(LagPoint { shift, coefficient }),
        })
}

/// Builds a report for every loaded region × instrument pair.
///
/// Pairs are ordered by region, then instrument. A degenerate spike series
/// does not abort the report; it is recorded in `local_error`.
///
/// # Errors
/// Propagates any failure of the lag sweep (for instance `InsufficientData`
/// when `max_shift` is too large for the range).
pub fn pair_reports(
    manager: &SeriesManager,
    config: &AppConfig,
    request: ReportRequest,
) -> Result<Vec<PairReport>> {
    let mut reports = Vec::new();

    for region in manager.regions() {
        for instrument in manager.instruments() {
            let lag_profile =
                manager.global_statistics(request.stream, request.max_shift, instrument, region)?;

            let (local, local_error) = match manager.matched_spikes(
                request.stream,
                instrument,
                region,
                request.max_gap,
            ) {
                Ok(matched) => {
                    let coefficient =
                        correlation(&matched.case_values, &matched.instrument_values)?;
                    let summary = LocalSummary {
                        coefficient,
                        matched: matched.matched,
                        unmatched: matched.unmatched(),
                    };
                    (Some(summary), None)
                }
                Err(e) => {
                    tracing::warn!(region, instrument, error = %e, "no local statistic for pair");
                    (None, Some(e.to_string()))
                }
            };

            reports.push(PairReport {
                region: region.to_string(),
                instrument: instrument.to_string(),
                label: format!(
                    "{} v. {}",
                    config.display_name(region),
                    config.display_name(instrument)
                ),
                stream: request.stream,
                strongest_lag: strongest_lag(&lag_profile),
                lag_profile,
                local,
                local_error,
            });
        }
    }

    Ok(reports)
}
