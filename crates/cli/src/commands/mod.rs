//! CLI commands for the correlation engine.

pub mod global;
pub mod local;
pub mod query;
pub mod report;
pub mod sources;
pub mod weekly;

pub use global::{run_global, GlobalArgs};
pub use local::{run_local, LocalArgs};
pub use query::{run_query, QueryArgs};
pub use report::{run_report, ReportArgs};
pub use sources::{run_sources, SourcesArgs};
pub use weekly::{run_weekly, WeeklyArgs};

use anyhow::{Context, Result};

use contagion_analysis::SeriesManager;
use contagion_core::{AppConfig, ConfigLoader};

/// Loads the config and every enabled series.
pub(crate) fn open(config_path: &str) -> Result<(AppConfig, SeriesManager)> {
    let config = ConfigLoader::load_from(config_path)?;
    let manager = SeriesManager::from_config(&config)
        .with_context(|| format!("Failed to load series configured in {config_path}"))?;
    Ok((config, manager))
}

/// The region and instrument pairs a command runs over.
///
/// A given code must be loaded; an omitted one expands to every loaded
/// series of that kind.
pub(crate) fn select_pairs(
    manager: &SeriesManager,
    region: Option<&str>,
    instrument: Option<&str>,
) -> Result<Vec<(String, String)>> {
    let regions: Vec<String> = match region {
        Some(code) => {
            manager.store().cases(code)?;
            vec![code.to_string()]
        }
        None => manager.regions().map(str::to_string).collect(),
    };
    let instruments: Vec<String> = match instrument {
        Some(code) => {
            manager.store().deltas(code)?;
            vec![code.to_string()]
        }
        None => manager.instruments().map(str::to_string).collect(),
    };

    Ok(regions
        .iter()
        .flat_map(|r| instruments.iter().map(move |i| (r.clone(), i.clone())))
        .collect())
}

/// "Region v. Instrument" using configured display names.
pub(crate) fn pair_label(config: &AppConfig, region: &str, instrument: &str) -> String {
    format!(
        "{} v. {}",
        config.display_name(region),
        config.display_name(instrument)
    )
}
