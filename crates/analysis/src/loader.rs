//! Builds a `SeriesStore` from the configured CSV sources.
//!
//! This is the only place where the analysis touches the filesystem. Any
//! failure here, from a missing file to a duplicate date, is a `LoadError`.

use contagion_core::{
    AnalysisError, AppConfig, DailySeries, DateRange, PriceBar, RawObservation, Result,
    SeriesSource,
};
use contagion_data::CsvStorage;
use contagion_signals::{align, bar_deltas, StreamDeltas};

use crate::store::SeriesStore;

/// Reads and aligns the case series of one region.
///
/// # Errors
/// Returns `LoadError` if the file cannot be read, holds no rows for the
/// region inside `range`, or holds the same date twice.
pub fn load_region(source: &SeriesSource, range: &DateRange) -> Result<DailySeries<i64>> {
    let records = CsvStorage::read_cases(&source.path, &source.code, range)
        .map_err(|e| load_error("region", &source.code, e))?;

    if records.is_empty() {
        return Err(AnalysisError::LoadError(format!(
            "region '{}': no case rows in {} ({})",
            source.code,
            range,
            source.path.display()
        )));
    }

    let observations: Vec<RawObservation<i64>> =
        records.iter().map(|r| r.observation()).collect();
    let series =
        align(&observations, range, 0).map_err(|e| load_error("region", &source.code, e))?;

    tracing::info!(
        region = %source.code,
        rows = records.len(),
        days = series.len(),
        "loaded case series"
    );
    Ok(series)
}

/// Reads, differences, and aligns the four price streams of one instrument.
///
/// Levels are read from `lookback_days` before the range start so that the
/// first in-range day has a delta.
///
/// # Errors
/// Returns `LoadError` if the file cannot be read, holds fewer than two
/// bars in the widened window, or holds the same date twice.
pub fn load_instrument(
    source: &SeriesSource,
    range: &DateRange,
    lookback_days: u64,
) -> Result<StreamDeltas> {
    let window = range
        .with_lookback(lookback_days)
        .map_err(|e| load_error("instrument", &source.code, e))?;

    let records = CsvStorage::read_prices(&source.path, &source.code, &window)
        .map_err(|e| load_error("instrument", &source.code, e))?;

    let bars: Vec<PriceBar> = records.iter().map(|r| r.bar()).collect();
    let deltas =
        bar_deltas(&bars, range).map_err(|e| load_error("instrument", &source.code, e))?;

    tracing::info!(
        instrument = %source.code,
        rows = records.len(),
        trading_days = deltas.trading_days(),
        "loaded price deltas"
    );
    Ok(deltas)
}

/// Loads every enabled region and instrument of `config`.
///
/// # Errors
/// Returns `InvalidInput` for an invalid configuration and `LoadError` for
/// any source that cannot be loaded.
pub fn load_store(config: &AppConfig) -> Result<SeriesStore> {
    config.validate()?;
    let range = config.range()?;

    let mut builder = SeriesStore::builder(range);
    for source in config.enabled_regions() {
        builder = builder.region(&source.code, load_region(source, &range)?)?;
    }
    for source in config.enabled_instruments() {
        let deltas = load_instrument(source, &range, config.analysis.lookback_days)?;
        builder = builder.instrument(&source.code, deltas)?;
    }

    builder.build()
}

fn load_error(kind: &str, code: &str, err: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::LoadError(format!("{kind} '{code}': {err:#}"))
}
