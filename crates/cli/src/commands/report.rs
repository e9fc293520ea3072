//! Pair report CLI command.
//!
//! Summarises every loaded region and instrument pair: the lag profile, the
//! strongest lag and the matched-spike coefficient.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use contagion_analysis::{pair_reports, PairReport, ReportRequest};
use contagion_core::PriceStream;

use super::open;
use crate::output::{self, OutputFormat};

/// Arguments for the report command.
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Price stream: open, high, low, close
    #[arg(long, default_value = "close")]
    pub stream: PriceStream,

    /// Largest lag in days (default: analysis.max_shift from config)
    #[arg(long)]
    pub max_shift: Option<usize>,

    /// Spike matching gap in days (default: analysis.max_gap from config)
    #[arg(long)]
    pub max_gap: Option<usize>,

    /// Output format: text, json (default: text)
    #[arg(long, default_value = "text")]
    pub format: String,
}

/// Runs the report command.
///
/// # Errors
/// Returns an error if loading fails or a lag sweep cannot be computed.
pub fn run_report(config_path: &str, args: ReportArgs) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    let (config, manager) = open(config_path)?;

    let mut request = ReportRequest::from_config(&config, args.stream);
    if let Some(max_shift) = args.max_shift {
        request.max_shift = max_shift;
    }
    if let Some(max_gap) = args.max_gap {
        request.max_gap = max_gap;
    }

    let reports = pair_reports(&manager, &config, request)?;
    tracing::info!(pairs = reports.len(), range = %manager.range(), "report complete");

    match format {
        OutputFormat::Text => {
            for report in &reports {
                println!("{}", render(report, request.max_gap));
            }
        }
        OutputFormat::Json => output::print_json(&reports)?,
    }
    Ok(())
}

fn render(report: &PairReport, max_gap: usize) -> String {
    let mut text = format!("{} ({})\n", report.label.bold(), report.stream);

    match &report.strongest_lag {
        Some(lag) => text.push_str(&format!(
            "  strongest lag   {:>3} days  {}\n",
            lag.shift,
            output::coefficient(lag.coefficient)
        )),
        None => text.push_str("  strongest lag   none\n"),
    }

    match (&report.local, &report.local_error) {
        (Some(local), _) => text.push_str(&format!(
            "  local (gap {max_gap})               {}  [{} matched, {} unmatched]\n",
            output::coefficient(local.coefficient),
            local.matched,
            local.unmatched
        )),
        (None, Some(error)) => {
            text.push_str(&format!("  local (gap {max_gap})   {}\n", error.yellow()));
        }
        (None, None) => {}
    }

    text.push_str("  lag profile\n");
    for (shift, &r) in report.lag_profile.iter().enumerate() {
        text.push_str(&format!("    {:>3}  {}\n", shift, output::coefficient(r)));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use contagion_analysis::{LagPoint, LocalSummary};

    fn report() -> PairReport {
        PairReport {
            region: "usa".to_string(),
            instrument: "snp500".to_string(),
            label: "United States of America v. SNP500".to_string(),
            stream: PriceStream::Close,
            lag_profile: vec![0.1, -0.6, 0.3],
            strongest_lag: Some(LagPoint {
                shift: 1,
                coefficient: -0.6,
            }),
            local: Some(LocalSummary {
                coefficient: 0.25,
                matched: 4,
                unmatched: 2,
            }),
            local_error: None,
        }
    }

    #[test]
    fn render_lists_every_lag() {
        colored::control::set_override(false);
        let text = render(&report(), 2);

        assert!(text.starts_with("United States of America v. SNP500 (close)"));
        assert!(text.contains("strongest lag     1 days   -0.6000"));
        assert!(text.contains("[4 matched, 2 unmatched]"));
        assert_eq!(text.lines().filter(|l| l.starts_with("    ")).count(), 3);
    }

    #[test]
    fn render_shows_local_error() {
        colored::control::set_override(false);
        let mut report = report();
        report.local = None;
        report.local_error = Some("series 'usa' has no non-zero values".to_string());

        let text = render(&report, 0);
        assert!(text.contains("local (gap 0)   series 'usa' has no non-zero values"));
    }
}
