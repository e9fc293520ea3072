//! Sources CLI command.
//!
//! Lists configured regions and instruments. With `--check`, each enabled
//! source is loaded and its coverage of the analysis window reported.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use contagion_analysis::{load_instrument, load_region};
use contagion_core::{AppConfig, ConfigLoader, DateRange, SeriesSource};

use crate::output::{self, OutputFormat};

/// Arguments for the sources command.
#[derive(Args, Debug, Clone)]
pub struct SourcesArgs {
    /// Load every enabled source and report its coverage
    #[arg(long)]
    pub check: bool,

    /// Output format: text, json (default: text)
    #[arg(long, default_value = "text")]
    pub format: String,
}

/// One configured source as listed by the command.
#[derive(Debug, Serialize)]
struct SourceStatus {
    kind: &'static str,
    code: String,
    name: String,
    path: String,
    enabled: bool,
    spike_threshold: Option<f64>,
    /// Days with data in the window; only set with `--check`
    #[serde(skip_serializing_if = "Option::is_none")]
    days: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl SourceStatus {
    fn new(kind: &'static str, source: &SeriesSource) -> Self {
        Self {
            kind,
            code: source.code.clone(),
            name: source.display_name().to_string(),
            path: source.path.display().to_string(),
            enabled: source.enabled,
            spike_threshold: source.spike_threshold,
            days: None,
            error: None,
        }
    }

    fn record(&mut self, outcome: contagion_core::Result<usize>) {
        match outcome {
            Ok(days) => self.days = Some(days),
            Err(e) => self.error = Some(e.to_string()),
        }
    }
}

/// Runs the sources command.
///
/// A source that fails to load under `--check` is reported, not raised.
///
/// # Errors
/// Returns an error if the config cannot be loaded.
pub fn run_sources(config_path: &str, args: SourcesArgs) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    let config = ConfigLoader::load_from(config_path)?;
    let range = config.range()?;

    let statuses = collect(&config, &range, args.check);

    match format {
        OutputFormat::Text => {
            println!("Analysis window {range}");
            for status in &statuses {
                let state = if status.enabled {
                    "enabled".green()
                } else {
                    "disabled".dimmed()
                };
                println!(
                    "  {:<10} {:<8} {:<28} {:<8} {}",
                    status.kind, status.code, status.name, state, status.path
                );
                if let Some(days) = status.days {
                    println!("             {days} of {} days with data", range.duration());
                }
                if let Some(error) = &status.error {
                    println!("             {}", error.red());
                }
            }
        }
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "start": range.start(),
            "end": range.end(),
            "sources": statuses,
        }))?,
    }
    Ok(())
}

fn collect(config: &AppConfig, range: &DateRange, check: bool) -> Vec<SourceStatus> {
    let mut statuses = Vec::new();

    for source in &config.regions {
        let mut status = SourceStatus::new("region", source);
        if check && source.enabled {
            status.record(load_region(source, range).map(|s| s.populated()));
        }
        statuses.push(status);
    }
    for source in &config.instruments {
        let mut status = SourceStatus::new("instrument", source);
        if check && source.enabled {
            status.record(
                load_instrument(source, range, config.analysis.lookback_days)
                    .map(|d| d.trading_days()),
            );
        }
        statuses.push(status);
    }

    statuses
}
