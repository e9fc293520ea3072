//! Immutable storage of aligned series.

use std::collections::BTreeMap;

use contagion_core::{AnalysisError, DailySeries, DateRange, PriceStream, Result};
use contagion_signals::StreamDeltas;

/// Aligned case series per region and price deltas per instrument.
///
/// Every series covers exactly the store's range. Instruments keep their
/// four streams together, so no stream can exist without the others.
#[derive(Debug, Clone)]
pub struct SeriesStore {
    range: DateRange,
    cases: BTreeMap<String, DailySeries<i64>>,
    instruments: BTreeMap<String, StreamDeltas>,
}

impl SeriesStore {
    #[must_use]
    pub fn builder(range: DateRange) -> SeriesStoreBuilder {
        SeriesStoreBuilder {
            range,
            cases: BTreeMap::new(),
            instruments: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn range(&self) -> &DateRange {
        &self.range
    }

    /// Case series of a region.
    ///
    /// # Errors
    /// Returns `NotFound` if the region was not loaded.
    pub fn cases(&self, region: &str) -> Result<&DailySeries<i64>> {
        self.cases
            .get(region)
            .ok_or_else(|| AnalysisError::region_not_found(region))
    }

    /// All four delta streams of an instrument.
    ///
    /// # Errors
    /// Returns `NotFound` if the instrument was not loaded.
    pub fn deltas(&self, instrument: &str) -> Result<&StreamDeltas> {
        self.instruments
            .get(instrument)
            .ok_or_else(|| AnalysisError::instrument_not_found(instrument))
    }

    /// One delta stream of an instrument.
    ///
    /// # Errors
    /// Returns `NotFound` if the instrument was not loaded.
    pub fn stream(&self, instrument: &str, stream: PriceStream) -> Result<&DailySeries<f64>> {
        self.deltas(instrument).map(|d| d.get(stream))
    }

    /// Region codes in sorted order.
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.cases.keys().map(String::as_str)
    }

    /// Instrument codes in sorted order.
    pub fn instruments(&self) -> impl Iterator<Item = &str> {
        self.instruments.keys().map(String::as_str)
    }
}

/// Collects series for a `SeriesStore`, checking each against the range.
#[derive(Debug)]
pub struct SeriesStoreBuilder {
    range: DateRange,
    cases: BTreeMap<String, DailySeries<i64>>,
    instruments: BTreeMap<String, StreamDeltas>,
}

impl SeriesStoreBuilder {
    /// Adds the case series of a region.
    ///
    /// # Errors
    /// Returns `LoadError` if the code is already present or the series does
    /// not cover the store's range.
    pub fn region(mut self, code: &str, series: DailySeries<i64>) -> Result<Self> {
        self.check_series(code, series.range(), series.len())?;
        if self.cases.contains_key(code) {
            return Err(AnalysisError::LoadError(format!("region '{code}' loaded twice")));
        }
        self.cases.insert(code.to_string(), series);
        Ok(self)
    }

    /// Adds the delta streams of an instrument.
    ///
    /// # Errors
    /// Returns `LoadError` if the code is already present or any stream does
    /// not cover the store's range.
    pub fn instrument(mut self, code: &str, deltas: StreamDeltas) -> Result<Self> {
        for stream in PriceStream::ALL {
            let series = deltas.get(stream);
            self.check_series(code, series.range(), series.len())?;
        }
        if self.instruments.contains_key(code) {
            return Err(AnalysisError::LoadError(format!(
                "instrument '{code}' loaded twice"
            )));
        }
        self.instruments.insert(code.to_string(), deltas);
        Ok(self)
    }

    /// Finishes the store.
    ///
    /// # Errors
    /// Returns `LoadError` if no region or no instrument was added.
    pub fn build(self) -> Result<SeriesStore> {
        if self.cases.is_empty() {
            return Err(AnalysisError::LoadError("no regions loaded".to_string()));
        }
        if self.instruments.is_empty() {
            return Err(AnalysisError::LoadError("no instruments loaded".to_string()));
        }

        tracing::info!(
            range = %self.range,
            regions = self.cases.len(),
            instruments = self.instruments.len(),
            "series store built"
        );

        Ok(SeriesStore {
            range: self.range,
            cases: self.cases,
            instruments: self.instruments,
        })
    }

    fn check_series(&self, code: &str, range: &DateRange, len: usize) -> Result<()> {
        if *range != self.range || len != self.range.duration() {
            return Err(AnalysisError::LoadError(format!(
                "series '{code}' covers {range} with {len} days, expected {} with {} days",
                self.range,
                self.range.duration()
            )));
        }
        Ok(())
    }
}
