use std::collections::HashSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::DateRange;
use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub spikes: SpikeConfig,
    #[serde(default)]
    pub regions: Vec<SeriesSource>,
    #[serde(default)]
    pub instruments: Vec<SeriesSource>,
}

/// Calendar window and default query parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Leading days of price levels fetched before `start` for differencing
    pub lookback_days: u64,
    /// Minimum paired days a lagged correlation must keep
    pub min_points: usize,
    /// Default upper lag for the global sweep
    pub max_shift: usize,
    /// Default reaction window for spike matching
    pub max_gap: usize,
    /// Block length of the windowed (weekly) trend
    pub window_days: usize,
}

/// How spike thresholds are resolved for each series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPolicy {
    /// Mean absolute value of the non-zero entries of the series itself
    #[default]
    InflatedAverage,
    /// The `spike_threshold` configured on each region and instrument
    Fixed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpikeConfig {
    pub policy: ThresholdPolicy,
}

/// A region or instrument data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesSource {
    /// Short code, e.g. "usa" or "snp500"
    pub code: String,
    /// Display name; falls back to the code
    #[serde(default)]
    pub name: Option<String>,
    pub path: PathBuf,
    /// Event magnitude used under `ThresholdPolicy::Fixed`
    #[serde(default)]
    pub spike_threshold: Option<f64>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_enabled() -> bool {
    true
}

impl SeriesSource {
    #[must_use]
    pub fn new(code: &str, name: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            code: code.to_string(),
            name: Some(name.to_string()),
            path: path.into(),
            spike_threshold: None,
            enabled: true,
        }
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.spike_threshold = Some(threshold);
        self
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.code)
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            start: date(2020, 1, 1),
            end: date(2021, 1, 1),
            lookback_days: 1,
            min_points: 3,
            max_shift: 31,
            max_gap: 0,
            window_days: 7,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            spikes: SpikeConfig::default(),
            regions: vec![
                SeriesSource::new("can", "Canada", "data/covid-can.csv"),
                SeriesSource::new("chn", "China", "data/covid-chn.csv"),
                SeriesSource::new("usa", "United States of America", "data/covid-usa.csv"),
            ],
            instruments: vec![
                SeriesSource::new("snp500", "SNP500", "data/stock-snp500.csv"),
                SeriesSource::new("tx60", "TX60", "data/stock-tx60.csv"),
            ],
        }
    }
}

impl AppConfig {
    /// The analysis calendar.
    ///
    /// # Errors
    /// Returns `InvalidInput` if `start` is not before `end`.
    pub fn range(&self) -> Result<DateRange> {
        DateRange::new(self.analysis.start, self.analysis.end)
    }

    pub fn enabled_regions(&self) -> impl Iterator<Item = &SeriesSource> {
        self.regions.iter().filter(|s| s.enabled)
    }

    pub fn enabled_instruments(&self) -> impl Iterator<Item = &SeriesSource> {
        self.instruments.iter().filter(|s| s.enabled)
    }

    /// Display name for a region or instrument code.
    #[must_use]
    pub fn display_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.regions
            .iter()
            .chain(self.instruments.iter())
            .find(|s| s.code == code)
            .map_or(code, SeriesSource::display_name)
    }

    /// Checks the settings that cannot be expressed in the types.
    ///
    /// # Errors
    /// Returns `InvalidInput` for a reversed range, a zero-length window,
    /// empty or duplicate codes, no enabled sources of either kind, or a
    /// fixed threshold policy with a missing or non-positive threshold.
    pub fn validate(&self) -> Result<()> {
        self.range()?;

        if self.analysis.window_days == 0 {
            return Err(AnalysisError::InvalidInput(
                "analysis.window_days must be positive".to_string(),
            ));
        }

        for (kind, sources) in [("region", &self.regions), ("instrument", &self.instruments)] {
            let mut seen = HashSet::new();
            for source in sources {
                if source.code.trim().is_empty() {
                    return Err(AnalysisError::InvalidInput(format!("{kind} with empty code")));
                }
                if !seen.insert(source.code.as_str()) {
                    return Err(AnalysisError::InvalidInput(format!(
                        "duplicate {kind} code '{}'",
                        source.code
                    )));
                }
                if self.spikes.policy == ThresholdPolicy::Fixed && source.enabled {
                    match source.spike_threshold {
                        Some(t) if t > 0.0 && t.is_finite() => {}
                        _ => {
                            return Err(AnalysisError::InvalidInput(format!(
                                "{kind} '{}' needs a positive spike_threshold under the fixed policy",
                                source.code
                            )))
                        }
                    }
                }
            }
            if !sources.iter().any(|s| s.enabled) {
                return Err(AnalysisError::InvalidInput(format!("no enabled {kind}s")));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.range().unwrap().duration(), 367);
        assert_eq!(config.display_name("usa"), "United States of America");
        assert_eq!(config.display_name("unknown"), "unknown");
    }

    #[test]
    fn validate_rejects_duplicate_codes() {
        let mut config = AppConfig::default();
        config
            .regions
            .push(SeriesSource::new("usa", "Again", "data/other.csv"));
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::InvalidInput(msg)) if msg.contains("duplicate region")
        ));
    }

    #[test]
    fn fixed_policy_requires_thresholds_on_enabled_sources() {
        let mut config = AppConfig::default();
        config.spikes.policy = ThresholdPolicy::Fixed;
        assert!(config.validate().is_err());

        config.regions = config
            .regions
            .into_iter()
            .map(|s| s.with_threshold(2000.0))
            .collect();
        config.instruments = config
            .instruments
            .into_iter()
            .map(|s| s.with_threshold(25.0))
            .collect();
        assert!(config.validate().is_ok());

        config.instruments[1].spike_threshold = None;
        config.instruments[1].enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_all_disabled() {
        let mut config = AppConfig::default();
        for region in &mut config.regions {
            region.enabled = false;
        }
        assert!(config.validate().is_err());
        assert_eq!(config.enabled_regions().count(), 0);
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{
            "analysis": { "start": "2021-01-01", "end": "2021-03-01" },
            "regions": [{ "code": "usa", "path": "data/covid-usa.csv" }],
            "instruments": [{ "code": "snp500", "path": "data/stock-snp500.csv" }]
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.analysis.window_days, 7);
        assert_eq!(config.analysis.lookback_days, 1);
        assert_eq!(config.spikes.policy, ThresholdPolicy::InflatedAverage);
        assert!(config.regions[0].enabled);
        assert_eq!(config.display_name("usa"), "usa");
    }
}
