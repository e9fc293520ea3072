use clap::{Parser, Subcommand};

mod cache;
mod commands;
mod output;

use commands::{GlobalArgs, LocalArgs, QueryArgs, ReportArgs, SourcesArgs, WeeklyArgs};

#[derive(Parser)]
#[command(name = "contagion")]
#[command(about = "Correlate daily case counts with market price movements", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(
        short,
        long,
        global = true,
        default_value = "config/Config.toml",
        env = "CONTAGION_CONFIG"
    )]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the configured regions and instruments
    Sources(SourcesArgs),
    /// Lagged correlation profile of cases against price deltas
    Global(GlobalArgs),
    /// Correlation of matched case and price spikes
    Local(LocalArgs),
    /// Block-by-block correlation at a single lag
    Weekly(WeeklyArgs),
    /// Summary of every region and instrument pair
    Report(ReportArgs),
    /// Answer a batch of statistic queries read from stdin or a file
    Query(QueryArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries results only
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Sources(args) => commands::run_sources(&cli.config, args),
        Commands::Global(args) => commands::run_global(&cli.config, args),
        Commands::Local(args) => commands::run_local(&cli.config, args),
        Commands::Weekly(args) => commands::run_weekly(&cli.config, args),
        Commands::Report(args) => commands::run_report(&cli.config, args),
        Commands::Query(args) => commands::run_query(&cli.config, args),
    }
}
