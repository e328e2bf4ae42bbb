pub mod irr;
pub mod portfolio;
pub mod property;

use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;

use reit_returns_core::{EngineConfig, PortfolioSnapshot};

use crate::input;

/// Where the records come from and how the engine is configured.
#[derive(Args)]
pub struct SnapshotArgs {
    /// Path to the normalized records snapshot (JSON or YAML); stdin when omitted
    #[arg(long)]
    pub input: Option<String>,

    /// Engine configuration file (JSON or YAML): reference price, cutover year, exclusions
    #[arg(long)]
    pub config: Option<String>,

    /// Analysis cut-off date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Override the configured reference price
    #[arg(long)]
    pub reference_price: Option<Decimal>,
}

impl SnapshotArgs {
    pub fn load(
        &self,
    ) -> Result<(PortfolioSnapshot, EngineConfig, NaiveDate), Box<dyn std::error::Error>> {
        let snapshot: PortfolioSnapshot = if let Some(ref path) = self.input {
            input::file::read_structured(path)?
        } else if let Some(data) = input::stdin::read_stdin()? {
            serde_json::from_value(data)?
        } else {
            return Err("--input <snapshot.json> or stdin required".into());
        };

        let mut config: EngineConfig = match self.config {
            Some(ref path) => input::file::read_structured(path)?,
            None => EngineConfig::default(),
        };
        if let Some(price) = self.reference_price {
            config.reference_price = price;
        }

        let as_of = self.as_of.unwrap_or_else(|| Local::now().date_naive());

        tracing::info!(
            dividends = snapshot.dividends.len(),
            valuations = snapshot.valuations.len(),
            exclusions = config.exclusions.windows.len(),
            %as_of,
            "loaded snapshot"
        );

        Ok((snapshot, config, as_of))
    }
}
