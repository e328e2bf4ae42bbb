use clap::Args;
use serde_json::Value;

use reit_returns_core::analysis;

use super::SnapshotArgs;

/// Arguments for the cross-property comparison
#[derive(Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (snapshot, config, as_of) = args.snapshot.load()?;
    let result = analysis::compare_properties(&snapshot, &config, as_of)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for listing the properties in a snapshot
#[derive(Args)]
pub struct PropertiesArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Only list ids containing this text (case-insensitive)
    #[arg(long)]
    pub search: Option<String>,
}

pub fn run_properties(args: PropertiesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (snapshot, _, _) = args.snapshot.load()?;
    let needle = args.search.map(|s| s.to_lowercase());
    let ids: Vec<String> = snapshot
        .property_ids()
        .into_iter()
        .filter(|id| match needle {
            Some(ref n) => id.to_lowercase().contains(n.as_str()),
            None => true,
        })
        .collect();
    Ok(serde_json::json!({ "properties": ids }))
}
