use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use reit_returns_core::analysis;
use reit_returns_core::CashFlow;

use crate::input;

/// Arguments for a standalone dated IRR
#[derive(Args)]
pub struct IrrArgs {
    /// Path to a JSON/YAML array of {date, amount} cash flows (overrides --cash-flows)
    #[arg(long)]
    pub input: Option<String>,

    /// Dated cash flows, e.g. "2023-01-01:-10,2024-01-01:11"
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, value_parser = parse_dated_flow)]
    pub cash_flows: Option<Vec<CashFlow>>,
}

fn parse_dated_flow(s: &str) -> Result<CashFlow, String> {
    let (date, amount) = s
        .split_once(':')
        .ok_or_else(|| format!("expected DATE:AMOUNT, got '{s}'"))?;
    let date: NaiveDate = date
        .trim()
        .parse()
        .map_err(|e| format!("invalid date '{date}': {e}"))?;
    let amount: Decimal = amount
        .trim()
        .parse()
        .map_err(|e| format!("invalid amount '{amount}': {e}"))?;
    Ok(CashFlow {
        date,
        amount,
        label: None,
    })
}

pub fn run_irr(args: IrrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let flows: Vec<CashFlow> = if let Some(ref path) = args.input {
        input::file::read_structured(path)?
    } else if let Some(flows) = args.cash_flows {
        flows
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--cash-flows or --input <flows.json> is required".into());
    };

    let result = analysis::dated_irr(&flows)?;
    Ok(serde_json::to_value(result)?)
}
