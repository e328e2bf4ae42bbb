use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Percentages expressed as whole numbers (5 = 5%).
pub type Percent = Decimal;

/// Property identifier as it appears in the upstream records.
pub type PropertyId = String;

/// Nominal per-share offering price every percentage metric is measured against.
pub const REFERENCE_PRICE: Money = dec!(10);

/// A single dividend distribution, per share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendEvent {
    pub property_id: PropertyId,
    pub payment_date: NaiveDate,
    pub per_share_amount: Money,
}

/// Escrow close marks the start of the return-measurement period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionRecord {
    pub property_id: PropertyId,
    pub escrow_close_date: NaiveDate,
    /// Offering date anchoring the valuation curve; escrow close when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipo_date: Option<NaiveDate>,
}

impl AcquisitionRecord {
    pub fn anchor_date(&self) -> NaiveDate {
        self.ipo_date.unwrap_or(self.escrow_close_date)
    }
}

/// Sale / wind-down of a property. Nothing is reported past `ending_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub property_id: PropertyId,
    pub ending_date: NaiveDate,
    pub final_payout_per_share: Money,
}

/// A reported per-share valuation (NAV) at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationPoint {
    pub property_id: PropertyId,
    pub as_of_date: NaiveDate,
    pub per_share_valuation: Money,
}

/// A single cash flow at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    pub date: NaiveDate,
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Calendar month key. Orders by year, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month.clamp(1, 12), 1).unwrap_or(NaiveDate::MIN)
    }

    /// Shift by a signed number of months.
    pub fn offset(&self, months: i32) -> Self {
        let index = self.year * 12 + self.month.clamp(1, 12) as i32 - 1 + months;
        Self::new(index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
    }

    pub fn days_in_month(&self) -> i64 {
        let start = self.first_day();
        match start.checked_add_months(Months::new(1)) {
            Some(next) => (next - start).num_days(),
            None => 31,
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
