use clap::Args;
use serde_json::Value;

use reit_returns_core::analysis;

use super::SnapshotArgs;

/// Arguments shared by every single-property command
#[derive(Args)]
pub struct PropertyArgs {
    /// Property identifier as it appears in the snapshot
    #[arg(long)]
    pub property: String,

    #[command(flatten)]
    pub snapshot: SnapshotArgs,
}

pub fn run_calendar(args: PropertyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (snapshot, config, as_of) = args.snapshot.load()?;
    let result = analysis::calendar_report(&snapshot, &config, &args.property, as_of)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_series(args: PropertyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (snapshot, config, as_of) = args.snapshot.load()?;
    let result = analysis::series_report(&snapshot, &config, &args.property, as_of)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_curve(args: PropertyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (snapshot, config, as_of) = args.snapshot.load()?;
    let result = analysis::curve_report(&snapshot, &config, &args.property, as_of)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_summary(args: PropertyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (snapshot, config, as_of) = args.snapshot.load()?;
    let result = analysis::summary_report(&snapshot, &config, &args.property, as_of)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_analyze(args: PropertyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (snapshot, config, as_of) = args.snapshot.load()?;
    let result = analysis::analyze_property(&snapshot, &config, &args.property, as_of)?;
    Ok(serde_json::to_value(result)?)
}
