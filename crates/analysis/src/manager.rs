//! Query orchestration over a loaded `SeriesStore`.
//!
//! The manager never mutates its store; every statistic is recomputed from
//! the immutable series on each call, so a shared reference can serve any
//! number of readers.

use std::collections::HashMap;

use chrono::NaiveDate;
use contagion_core::{AnalysisError, AppConfig, DateRange, PriceStream, Result, ThresholdPolicy};
use contagion_signals::{
    correlation, match_spikes, windowed_correlation, FixedThreshold, InflatedAverage,
    MatchedSpikes, ThresholdStrategy,
};

use crate::loader::load_store;
use crate::store::SeriesStore;

/// Query-independent settings of a `SeriesManager`.
#[derive(Debug, Clone)]
pub struct ManagerSettings {
    /// Minimum paired days a lagged correlation must keep
    pub min_points: usize,
    /// Block length of the windowed trend
    pub window_days: usize,
    pub policy: ThresholdPolicy,
    /// Fixed event magnitudes per region code
    pub region_thresholds: HashMap<String, f64>,
    /// Fixed event magnitudes per instrument code
    pub instrument_thresholds: HashMap<String, f64>,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            min_points: 3,
            window_days: 7,
            policy: ThresholdPolicy::InflatedAverage,
            region_thresholds: HashMap::new(),
            instrument_thresholds: HashMap::new(),
        }
    }
}

impl ManagerSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let thresholds = |sources: &[contagion_core::SeriesSource]| {
            sources
                .iter()
                .filter_map(|s| s.spike_threshold.map(|t| (s.code.clone(), t)))
                .collect()
        };

        Self {
            min_points: config.analysis.min_points,
            window_days: config.analysis.window_days,
            policy: config.spikes.policy,
            region_thresholds: thresholds(&config.regions),
            instrument_thresholds: thresholds(&config.instruments),
        }
    }
}

/// Owns the aligned series and answers correlation queries over them.
#[derive(Debug, Clone)]
pub struct SeriesManager {
    store: SeriesStore,
    settings: ManagerSettings,
}

impl SeriesManager {
    /// Creates a manager with default settings (inflated-average thresholds).
    #[must_use]
    pub fn new(store: SeriesStore) -> Self {
        Self {
            store,
            settings: ManagerSettings::default(),
        }
    }

    /// Creates a manager with explicit settings.
    ///
    /// # Errors
    /// Returns `LoadError` if the fixed threshold policy is selected and a
    /// loaded region or instrument has no threshold, or if `window_days` is zero.
    pub fn with_settings(store: SeriesStore, settings: ManagerSettings) -> Result<Self> {
        if settings.window_days == 0 {
            return Err(AnalysisError::LoadError(
                "window_days must be positive".to_string(),
            ));
        }

        if settings.policy == ThresholdPolicy::Fixed {
            if let Some(region) = store
                .regions()
                .find(|r| !settings.region_thresholds.contains_key(*r))
            {
                return Err(AnalysisError::LoadError(format!(
                    "region '{region}' has no fixed spike threshold"
                )));
            }
            if let Some(instrument) = store
                .instruments()
                .find(|i| !settings.instrument_thresholds.contains_key(*i))
            {
                return Err(AnalysisError::LoadError(format!(
                    "instrument '{instrument}' has no fixed spike threshold"
                )));
            }
        }

        Ok(Self { store, settings })
    }

    /// Loads every configured source and applies the configured settings.
    ///
    /// # Errors
    /// Returns `InvalidInput` for an invalid configuration and `LoadError`
    /// for any source that cannot be loaded.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = load_store(config)?;
        Self::with_settings(store, ManagerSettings::from_config(config))
    }

    #[must_use]
    pub const fn store(&self) -> &SeriesStore {
        &self.store
    }

    #[must_use]
    pub const fn settings(&self) -> &ManagerSettings {
        &self.settings
    }

    #[must_use]
    pub const fn range(&self) -> &DateRange {
        self.store.range()
    }

    /// Calendar date of series slot `index`.
    #[must_use]
    pub fn index_to_date(&self, index: usize) -> Option<NaiveDate> {
        self.store.range().date_at(index)
    }

    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.store.regions()
    }

    pub fn instruments(&self) -> impl Iterator<Item = &str> {
        self.store.instruments()
    }

    /// Correlation of a region's cases with an instrument stream at every
    /// lag from `0` to `max_shift` inclusive.
    ///
    /// At lag `k` the case series drops its first `k` days and the delta
    /// series drops its last `k` days, pairing `cases[d + k]` with
    /// `deltas[d]`. Element `k` of the result is the coefficient at lag `k`;
    /// element `0` is the plain correlation of the full series.
    ///
    /// # Errors
    /// - `InvalidInput` if `max_shift` is zero
    /// - `NotFound` for an unloaded region or instrument
    /// - `InsufficientData` if the largest lag leaves fewer than
    ///   `min_points` paired days
    pub fn global_statistics(
        &self,
        stream: PriceStream,
        max_shift: usize,
        instrument: &str,
        region: &str,
    ) -> Result<Vec<f64>> {
        if max_shift == 0 {
            return Err(AnalysisError::InvalidInput(
                "max_shift must be positive".to_string(),
            ));
        }

        let cases = self.store.cases(region)?.to_f64();
        let deltas = self.store.stream(instrument, stream)?.values();
        self.check_lag(cases.len(), max_shift)?;

        let profile = (0..=max_shift)
            .map(|shift| lagged_correlation(&cases, deltas, shift))
            .collect::<Result<Vec<f64>>>()?;

        tracing::debug!(%stream, instrument, region, max_shift, "computed lag profile");
        Ok(profile)
    }

    /// Correlation of matched case and instrument spikes.
    ///
    /// # Errors
    /// - `NotFound` for an unloaded region or instrument
    /// - `DegenerateSeries` if a series has no non-zero day under the
    ///   inflated-average policy
    pub fn local_statistics(
        &self,
        stream: PriceStream,
        instrument: &str,
        region: &str,
        max_gap: usize,
    ) -> Result<f64> {
        let matched = self.matched_spikes(stream, instrument, region, max_gap)?;
        let coefficient = correlation(&matched.case_values, &matched.instrument_values)?;

        tracing::debug!(
            %stream,
            instrument,
            region,
            max_gap,
            pairs = matched.len(),
            coefficient,
            "computed local statistic"
        );
        Ok(coefficient)
    }

    /// The matched spike sequences behind `local_statistics`.
    ///
    /// # Errors
    /// Same as [`SeriesManager::local_statistics`].
    pub fn matched_spikes(
        &self,
        stream: PriceStream,
        instrument: &str,
        region: &str,
        max_gap: usize,
    ) -> Result<MatchedSpikes> {
        let cases = self.store.cases(region)?.to_f64();
        let deltas = self.store.stream(instrument, stream)?.values();

        let case_strategy = self.strategy(&self.settings.region_thresholds, region)?;
        let instrument_strategy = self.strategy(&self.settings.instrument_thresholds, instrument)?;

        match_spikes(
            &cases,
            deltas,
            max_gap,
            case_strategy.as_ref(),
            instrument_strategy.as_ref(),
        )
    }

    /// Correlation per consecutive block of `window_days` at a single lag.
    ///
    /// Applies the same trimming as one step of `global_statistics`, then
    /// correlates each full block; a trailing partial block is dropped.
    ///
    /// # Errors
    /// - `NotFound` for an unloaded region or instrument
    /// - `InsufficientData` if the lag leaves less than one full block
    pub fn weekly_statistics(
        &self,
        stream: PriceStream,
        shift: usize,
        instrument: &str,
        region: &str,
    ) -> Result<Vec<f64>> {
        let cases = self.store.cases(region)?.to_f64();
        let deltas = self.store.stream(instrument, stream)?.values();

        let window = self.settings.window_days;
        let paired = cases.len().saturating_sub(shift);
        if paired < window {
            return Err(AnalysisError::InsufficientData {
                needed: window,
                got: paired,
            });
        }

        let trend = windowed_correlation(&cases[shift..], &deltas[..paired], window)?;
        tracing::debug!(%stream, instrument, region, shift, blocks = trend.len(), "computed windowed trend");
        Ok(trend)
    }

    fn check_lag(&self, len: usize, max_shift: usize) -> Result<()> {
        let paired = len.saturating_sub(max_shift);
        if paired < self.settings.min_points.max(2) {
            return Err(AnalysisError::InsufficientData {
                needed: self.settings.min_points.max(2),
                got: paired,
            });
        }
        Ok(())
    }

    fn strategy(
        &self,
        thresholds: &HashMap<String, f64>,
        code: &str,
    ) -> Result<Box<dyn ThresholdStrategy>> {
        match self.settings.policy {
            ThresholdPolicy::InflatedAverage => Ok(Box::new(InflatedAverage)),
            ThresholdPolicy::Fixed => thresholds
                .get(code)
                .map(|t| Box::new(FixedThreshold(*t)) as Box<dyn ThresholdStrategy>)
                .ok_or_else(|| {
                    AnalysisError::LoadError(format!("'{code}' has no fixed spike threshold"))
                }),
        }
    }
}

fn lagged_correlation(cases: &[f64], deltas: &[f64], shift: usize) -> Result<f64> {
    let paired = cases.len() - shift;
    correlation(&cases[shift..], &deltas[..paired])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use contagion_core::{DailySeries, PriceBar};
    use contagion_signals::bar_deltas;

    fn day(n: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, 1).unwrap() + chrono::Days::new(n)
    }

    /// Store over `cases.len()` days whose close deltas equal `deltas`.
    fn manager_with(cases: &[i64], deltas: &[f64], settings: ManagerSettings) -> SeriesManager {
        assert_eq!(cases.len(), deltas.len());
        let range = DateRange::new(day(1), day(cases.len() as u64)).unwrap();

        let mut level = 100.0;
        let mut bars = vec![PriceBar::new(day(0), level, level, level, level)];
        for (i, delta) in deltas.iter().enumerate() {
            level += delta;
            bars.push(PriceBar::new(day(i as u64 + 1), level, level, level, level));
        }

        let store = SeriesStore::builder(range)
            .region(
                "usa",
                DailySeries::from_dense(range, cases.to_vec()).unwrap(),
            )
            .unwrap()
            .instrument("snp500", bar_deltas(&bars, &range).unwrap())
            .unwrap()
            .build()
            .unwrap();

        SeriesManager::with_settings(store, settings).unwrap()
    }

    fn sample() -> SeriesManager {
        manager_with(
            &[5, 0, 12, 3, 0, 40, 8, 0, 0, 22, 1, 7, 0, 15],
            &[1.0, -2.0, 0.0, 4.0, -1.0, 0.0, 2.0, 3.0, -4.0, 0.0, 1.0, -1.0, 2.0, 0.0],
            ManagerSettings::default(),
        )
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn global_shift_zero_is_plain_correlation() {
        let manager = sample();
        let cases = manager.store().cases("usa").unwrap().to_f64();
        let deltas = manager
            .store()
            .stream("snp500", PriceStream::Close)
            .unwrap()
            .values()
            .to_vec();

        let profile = manager
            .global_statistics(PriceStream::Close, 3, "snp500", "usa")
            .unwrap();

        assert_eq!(profile.len(), 4);
        assert_close(profile[0], correlation(&cases, &deltas).unwrap());
        assert_close(profile[2], correlation(&cases[2..], &deltas[..12]).unwrap());
    }

    #[test]
    fn global_pairs_cases_with_earlier_deltas() {
        // cases are the deltas delayed by two days
        let deltas = [3.0, -1.0, 4.0, -1.0, 5.0, -9.0, 2.0, 6.0, -5.0, 3.0];
        let cases: Vec<i64> = [0.0, 0.0]
            .iter()
            .chain(deltas[..8].iter())
            .map(|d| (*d * 10.0) as i64 + 100)
            .collect();

        let manager = manager_with(&cases, &deltas, ManagerSettings::default());
        let profile = manager
            .global_statistics(PriceStream::Open, 4, "snp500", "usa")
            .unwrap();

        // a perfect linear relationship reports 0.0 unless rounding lands just below 1.0
        assert!(
            profile[2] == 0.0 || (1.0 - profile[2]).abs() < 1e-12,
            "lag 2 was {}",
            profile[2]
        );
        assert!(profile[0].abs() < 0.9);
    }

    #[test]
    fn global_rejects_zero_shift_and_short_series() {
        let manager = sample();

        assert!(matches!(
            manager.global_statistics(PriceStream::Close, 0, "snp500", "usa"),
            Err(AnalysisError::InvalidInput(_))
        ));
        assert_eq!(
            manager.global_statistics(PriceStream::Close, 12, "snp500", "usa"),
            Err(AnalysisError::InsufficientData { needed: 3, got: 2 })
        );
        assert!(manager
            .global_statistics(PriceStream::Close, 11, "snp500", "usa")
            .is_ok());
    }

    #[test]
    fn unknown_codes_are_not_found() {
        let manager = sample();

        assert_eq!(
            manager.global_statistics(PriceStream::High, 2, "snp500", "can"),
            Err(AnalysisError::region_not_found("can"))
        );
        assert_eq!(
            manager.local_statistics(PriceStream::High, "tx60", "usa", 0),
            Err(AnalysisError::instrument_not_found("tx60"))
        );
    }

    #[test]
    fn local_correlates_matched_spikes() {
        let manager = sample();

        let matched = manager
            .matched_spikes(PriceStream::Close, "snp500", "usa", 1)
            .unwrap();
        let local = manager
            .local_statistics(PriceStream::Close, "snp500", "usa", 1)
            .unwrap();

        assert_eq!(matched.case_values.len(), matched.instrument_values.len());
        assert_close(
            local,
            correlation(&matched.case_values, &matched.instrument_values).unwrap(),
        );
        assert!((-1.0..1.0).contains(&local));
    }

    #[test]
    fn local_on_quiet_region_is_degenerate() {
        let manager = manager_with(&[0; 5], &[1.0, -1.0, 2.0, 0.0, 1.0], ManagerSettings::default());

        assert!(matches!(
            manager.local_statistics(PriceStream::Close, "snp500", "usa", 0),
            Err(AnalysisError::DegenerateSeries(_))
        ));
    }

    #[test]
    fn fixed_policy_uses_configured_thresholds() {
        let settings = ManagerSettings {
            policy: ThresholdPolicy::Fixed,
            region_thresholds: HashMap::from([("usa".to_string(), 20.0)]),
            instrument_thresholds: HashMap::from([("snp500".to_string(), 3.0)]),
            ..ManagerSettings::default()
        };
        let manager = manager_with(
            &[5, 0, 12, 3, 0, 40, 8, 0, 0, 22, 1, 7, 0, 15],
            &[1.0, -2.0, 0.0, 4.0, -1.0, 0.0, 2.0, 3.0, -4.0, 0.0, 1.0, -1.0, 2.0, 0.0],
            settings,
        );

        let matched = manager
            .matched_spikes(PriceStream::Close, "snp500", "usa", 0)
            .unwrap();

        // case events on days 5 and 9, instrument events on days 3, 7, 8
        assert_eq!(matched.case_values, vec![0.0, 40.0, 0.0, 0.0, 22.0]);
        assert_eq!(matched.instrument_values, vec![4.0, 0.0, 3.0, -4.0, 0.0]);
        assert_eq!(matched.matched, 0);
    }

    #[test]
    fn fixed_policy_requires_every_threshold() {
        let range = DateRange::new(day(1), day(3)).unwrap();
        let bars: Vec<PriceBar> = (0..4)
            .map(|n| PriceBar::new(day(n), 1.0, 1.0, 1.0, n as f64))
            .collect();
        let store = SeriesStore::builder(range)
            .region("usa", DailySeries::filled(range, 1))
            .unwrap()
            .instrument("snp500", bar_deltas(&bars, &range).unwrap())
            .unwrap()
            .build()
            .unwrap();
        let settings = ManagerSettings {
            policy: ThresholdPolicy::Fixed,
            region_thresholds: HashMap::from([("usa".to_string(), 1.0)]),
            ..ManagerSettings::default()
        };

        assert!(matches!(
            SeriesManager::with_settings(store, settings),
            Err(AnalysisError::LoadError(msg)) if msg.contains("snp500")
        ));
    }

    #[test]
    fn weekly_blocks_follow_the_shift() {
        let manager = sample();
        let cases = manager.store().cases("usa").unwrap().to_f64();
        let deltas = manager
            .store()
            .stream("snp500", PriceStream::Close)
            .unwrap()
            .values()
            .to_vec();

        let unshifted = manager
            .weekly_statistics(PriceStream::Close, 0, "snp500", "usa")
            .unwrap();
        assert_eq!(unshifted.len(), 2);
        assert_close(unshifted[1], correlation(&cases[7..14], &deltas[7..14]).unwrap());

        let shifted = manager
            .weekly_statistics(PriceStream::Close, 2, "snp500", "usa")
            .unwrap();
        assert_eq!(shifted.len(), 1);
        assert_close(shifted[0], correlation(&cases[2..9], &deltas[0..7]).unwrap());

        assert!(matches!(
            manager.weekly_statistics(PriceStream::Close, 8, "snp500", "usa"),
            Err(AnalysisError::InsufficientData { needed: 7, got: 6 })
        ));
    }

    #[test]
    fn index_to_date_follows_range() {
        let manager = sample();
        assert_eq!(manager.index_to_date(0), Some(day(1)));
        assert_eq!(manager.index_to_date(5), Some(day(6)));
        assert_eq!(manager.index_to_date(14), None);
    }

    #[test]
    fn manager_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SeriesManager>();
    }
}
