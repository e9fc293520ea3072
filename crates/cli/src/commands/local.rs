//! Local (matched spike) CLI command.

use anyhow::Result;
use clap::Args;

use contagion_core::PriceStream;
use contagion_signals::correlation;

use super::{open, pair_label, select_pairs};
use crate::output::{self, OutputFormat};

/// Arguments for the local command.
#[derive(Args, Debug, Clone)]
pub struct LocalArgs {
    /// Price stream: open, high, low, close
    #[arg(long, default_value = "close")]
    pub stream: PriceStream,

    /// Days a price spike may trail or lead a case spike (default: analysis.max_gap)
    #[arg(long)]
    pub max_gap: Option<usize>,

    /// Region code (default: every loaded region)
    #[arg(long)]
    pub region: Option<String>,

    /// Instrument code (default: every loaded instrument)
    #[arg(long)]
    pub instrument: Option<String>,

    /// Output format: text, json (default: text)
    #[arg(long, default_value = "text")]
    pub format: String,
}

/// Runs the local command.
///
/// # Errors
/// Returns an error if loading fails, a code is unknown, or a series has
/// no usable spike threshold.
pub fn run_local(config_path: &str, args: LocalArgs) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    let (config, manager) = open(config_path)?;
    let max_gap = args.max_gap.unwrap_or(config.analysis.max_gap);

    let pairs = select_pairs(&manager, args.region.as_deref(), args.instrument.as_deref())?;
    let mut json = Vec::new();

    for (region, instrument) in &pairs {
        let matched = manager.matched_spikes(args.stream, instrument, region, max_gap)?;
        let coefficient = correlation(&matched.case_values, &matched.instrument_values)?;
        let label = pair_label(&config, region, instrument);

        match format {
            OutputFormat::Text => println!(
                "{label} ({}, gap {max_gap}): {}  [{} matched, {} unmatched]",
                args.stream,
                output::coefficient(coefficient),
                matched.matched,
                matched.unmatched()
            ),
            OutputFormat::Json => json.push(serde_json::json!({
                "region": region,
                "instrument": instrument,
                "label": label,
                "stream": args.stream,
                "max_gap": max_gap,
                "coefficient": coefficient,
                "matched": matched.matched,
                "unmatched": matched.unmatched(),
            })),
        }
    }

    if format == OutputFormat::Json {
        output::print_json(&json)?;
    }
    Ok(())
}
