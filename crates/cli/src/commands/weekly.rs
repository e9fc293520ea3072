//! Weekly trend CLI command.

use anyhow::Result;
use clap::Args;

use contagion_core::PriceStream;

use super::{open, pair_label, select_pairs};
use crate::output::{self, OutputFormat};

/// Arguments for the weekly command.
#[derive(Args, Debug, Clone)]
pub struct WeeklyArgs {
    /// Price stream: open, high, low, close
    #[arg(long, default_value = "close")]
    pub stream: PriceStream,

    /// Lag in days applied before splitting into blocks
    #[arg(long, default_value = "0")]
    pub shift: usize,

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

/// Runs the weekly command.
///
/// # Errors
/// Returns an error if loading fails, a code is unknown, or the lag leaves
/// less than one full block.
pub fn run_weekly(config_path: &str, args: WeeklyArgs) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    let (config, manager) = open(config_path)?;
    let window = manager.settings().window_days;

    let pairs = select_pairs(&manager, args.region.as_deref(), args.instrument.as_deref())?;
    let mut json = Vec::new();

    for (region, instrument) in &pairs {
        let trend = manager.weekly_statistics(args.stream, args.shift, instrument, region)?;
        let label = pair_label(&config, region, instrument);

        match format {
            OutputFormat::Text => {
                println!("{label} ({}, shift {}, {window}-day blocks)", args.stream, args.shift);
                for (block, &r) in trend.iter().enumerate() {
                    // block k starts at case day shift + k * window
                    let first = manager.index_to_date(args.shift + block * window);
                    let first = first.map_or_else(|| "?".to_string(), |d| d.to_string());
                    println!("  {:>3}  {}  {}", block + 1, first, output::coefficient(r));
                }
                println!();
            }
            OutputFormat::Json => json.push(serde_json::json!({
                "region": region,
                "instrument": instrument,
                "label": label,
                "stream": args.stream,
                "shift": args.shift,
                "window_days": window,
                "trend": trend,
            })),
        }
    }

    if format == OutputFormat::Json {
        output::print_json(&json)?;
    }
    Ok(())
}
