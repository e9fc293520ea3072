//! Global (lag sweep) CLI command.
//!
//! Correlates a region's daily cases with an instrument's price deltas at
//! every lag from zero up to the maximum shift.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use contagion_core::PriceStream;
use contagion_data::{CsvStorage, LagRow};

use super::{open, pair_label, select_pairs};
use crate::output::{self, OutputFormat};

/// Arguments for the global command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Price stream: open, high, low, close
    #[arg(long, default_value = "close")]
    pub stream: PriceStream,

    /// Largest lag in days (default: analysis.max_shift from config)
    #[arg(long)]
    pub max_shift: Option<usize>,

    /// Region code (default: every loaded region)
    #[arg(long)]
    pub region: Option<String>,

    /// Instrument code (default: every loaded instrument)
    #[arg(long)]
    pub instrument: Option<String>,

    /// Write the profile as `shift,coefficient` CSV (single pair only)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format: text, json (default: text)
    #[arg(long, default_value = "text")]
    pub format: String,
}

/// Runs the global command.
///
/// # Errors
/// Returns an error if loading fails, a code is unknown, or the lag sweep
/// leaves too few paired days.
pub fn run_global(config_path: &str, args: GlobalArgs) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    let (config, manager) = open(config_path)?;
    let max_shift = args.max_shift.unwrap_or(config.analysis.max_shift);

    let pairs = select_pairs(&manager, args.region.as_deref(), args.instrument.as_deref())?;
    if args.output.is_some() && pairs.len() != 1 {
        bail!("--output needs a single pair; pass both --region and --instrument");
    }

    let mut profiles = Vec::with_capacity(pairs.len());
    for (region, instrument) in &pairs {
        let profile = manager.global_statistics(args.stream, max_shift, instrument, region)?;
        profiles.push((region, instrument, profile));
    }

    if let (Some(path), [(_, _, profile)]) = (&args.output, profiles.as_slice()) {
        let rows: Vec<LagRow> = profile
            .iter()
            .enumerate()
            .map(|(shift, &coefficient)| LagRow { shift, coefficient })
            .collect();
        CsvStorage::write_lag_profile(path, &rows)?;
        tracing::info!(path = %path.display(), rows = rows.len(), "wrote lag profile");
    }

    match format {
        OutputFormat::Text => {
            for (region, instrument, profile) in &profiles {
                println!(
                    "{} ({}, lags 0..={})",
                    pair_label(&config, region, instrument),
                    args.stream,
                    max_shift
                );
                for (shift, &r) in profile.iter().enumerate() {
                    println!("  lag {:>3}  {}", shift, output::coefficient(r));
                }
                println!();
            }
        }
        OutputFormat::Json => {
            let json: Vec<_> = profiles
                .iter()
                .map(|(region, instrument, profile)| {
                    serde_json::json!({
                        "region": region,
                        "instrument": instrument,
                        "label": pair_label(&config, region, instrument),
                        "stream": args.stream,
                        "profile": profile,
                    })
                })
                .collect();
            output::print_json(&json)?;
        }
    }

    Ok(())
}
