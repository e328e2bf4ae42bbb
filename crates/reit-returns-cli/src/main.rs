mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::irr::IrrArgs;
use commands::portfolio::{CompareArgs, PropertiesArgs};
use commands::property::PropertyArgs;

/// Dividend and returns analytics for real estate offerings
#[derive(Parser)]
#[command(
    name = "reitr",
    version,
    about = "Dividend and returns analytics for real estate offerings",
    long_about = "A CLI for per-property dividend analytics with decimal precision. \
                  Builds payment calendars, smoothed monthly dividend series, yield \
                  metrics, valuation curves, return summaries and dated IRR from a \
                  normalized snapshot of dividends, acquisitions, completions and \
                  valuations."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Emit debug logs on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly payment calendar (paid / missed / not applicable) with success rate
    Calendar(PropertyArgs),
    /// Smoothed monthly dividend series with annualized yields
    Series(PropertyArgs),
    /// Quarterly valuation curve
    Curve(PropertyArgs),
    /// Yield, appreciation, total return and IRR summary
    Summary(PropertyArgs),
    /// Calendar, series, curve and summary in one report
    Analyze(PropertyArgs),
    /// Summaries for every property in the snapshot
    Compare(CompareArgs),
    /// List property identifiers in the snapshot
    Properties(PropertiesArgs),
    /// Dated IRR for an arbitrary cash flow schedule
    Irr(IrrArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_directives = if verbose {
        "reit_returns_core=debug,reitr=debug"
    } else {
        "reit_returns_core=warn,reitr=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    // stdout carries the report; logs always go to stderr
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose),
        )
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calendar(args) => commands::property::run_calendar(args),
        Commands::Series(args) => commands::property::run_series(args),
        Commands::Curve(args) => commands::property::run_curve(args),
        Commands::Summary(args) => commands::property::run_summary(args),
        Commands::Analyze(args) => commands::property::run_analyze(args),
        Commands::Compare(args) => commands::portfolio::run_compare(args),
        Commands::Properties(args) => commands::portfolio::run_properties(args),
        Commands::Irr(args) => commands::irr::run_irr(args),
        Commands::Version => {
            println!("reitr {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
