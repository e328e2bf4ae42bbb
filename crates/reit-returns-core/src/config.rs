use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ReturnsError;
use crate::types::{Money, PropertyId, YearMonth, REFERENCE_PRICE};
use crate::ReturnsResult;

/// First year in which distributions are reported monthly.
pub const DEFAULT_CUTOVER_YEAR: i32 = 2024;

fn default_reference_price() -> Money {
    REFERENCE_PRICE
}

fn default_cutover_year() -> i32 {
    DEFAULT_CUTOVER_YEAR
}

/// Engine-wide settings, loaded once and shared by every query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Per-share cost basis for all percentage metrics
    #[serde(default = "default_reference_price")]
    pub reference_price: Money,
    /// Distributions dated before Jan 1st of this year are quarterly lump sums
    #[serde(default = "default_cutover_year")]
    pub cutover_year: i32,
    /// Months in which payment status is not reported
    #[serde(default)]
    pub exclusions: ExclusionTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reference_price: REFERENCE_PRICE,
            cutover_year: DEFAULT_CUTOVER_YEAR,
            exclusions: ExclusionTable::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> ReturnsResult<()> {
        if self.reference_price <= Decimal::ZERO {
            return Err(ReturnsError::InvalidInput {
                field: "reference_price".into(),
                reason: "Reference price must be positive".into(),
            });
        }
        self.exclusions.validate()
    }
}

/// A block of months (inclusive) for which payment status is suppressed.
///
/// Without a `property_id` the window applies to every property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<PropertyId>,
    pub year: i32,
    pub start_month: u32,
    pub end_month: u32,
}

impl ExclusionWindow {
    pub fn global(year: i32, start_month: u32, end_month: u32) -> Self {
        Self {
            property_id: None,
            year,
            start_month,
            end_month,
        }
    }

    pub fn for_property(property_id: &str, year: i32, start_month: u32, end_month: u32) -> Self {
        Self {
            property_id: Some(property_id.to_string()),
            year,
            start_month,
            end_month,
        }
    }

    pub fn applies_to(&self, property_id: &str) -> bool {
        match self.property_id.as_deref() {
            Some(id) => id == property_id,
            None => true,
        }
    }

    pub fn contains(&self, property_id: &str, ym: YearMonth) -> bool {
        self.applies_to(property_id)
            && ym.year == self.year
            && (self.start_month..=self.end_month).contains(&ym.month)
    }
}

/// Inspectable table of exclusion windows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionTable {
    pub windows: Vec<ExclusionWindow>,
}

impl ExclusionTable {
    pub fn new(windows: Vec<ExclusionWindow>) -> Self {
        Self { windows }
    }

    pub fn is_excluded(&self, property_id: &str, ym: YearMonth) -> bool {
        self.windows.iter().any(|w| w.contains(property_id, ym))
    }

    pub fn validate(&self) -> ReturnsResult<()> {
        for (i, w) in self.windows.iter().enumerate() {
            if !(1..=12).contains(&w.start_month) || !(1..=12).contains(&w.end_month) {
                return Err(ReturnsError::InvalidInput {
                    field: format!("exclusions[{i}]"),
                    reason: "Months must be between 1 and 12".into(),
                });
            }
            if w.start_month > w.end_month {
                return Err(ReturnsError::InvalidInput {
                    field: format!("exclusions[{i}]"),
                    reason: "start_month must not be after end_month".into(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_global_window_applies_to_all_properties() {
        let table = ExclusionTable::new(vec![ExclusionWindow::global(2023, 1, 3)]);
        assert!(table.is_excluded("A", YearMonth::new(2023, 2)));
        assert!(table.is_excluded("B", YearMonth::new(2023, 3)));
        assert!(!table.is_excluded("A", YearMonth::new(2023, 4)));
        assert!(!table.is_excluded("A", YearMonth::new(2022, 2)));
    }

    #[test]
    fn test_property_window_is_scoped() {
        let table = ExclusionTable::new(vec![ExclusionWindow::for_property("A", 2022, 7, 7)]);
        assert!(table.is_excluded("A", YearMonth::new(2022, 7)));
        assert!(!table.is_excluded("B", YearMonth::new(2022, 7)));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let cfg: EngineConfig = serde_json::from_str(
            r#"{"exclusions": [{"year": 2023, "start_month": 1, "end_month": 2}]}"#,
        )
        .unwrap();
        assert_eq!(cfg.reference_price, dec!(10));
        assert_eq!(cfg.cutover_year, 2024);
        assert_eq!(cfg.exclusions.windows.len(), 1);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_windows() {
        let mut cfg = EngineConfig::default();
        cfg.exclusions = ExclusionTable::new(vec![ExclusionWindow::global(2023, 5, 2)]);
        assert!(cfg.validate().is_err());
        cfg.exclusions = ExclusionTable::new(vec![ExclusionWindow::global(2023, 0, 2)]);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_reference_price() {
        let cfg = EngineConfig {
            reference_price: dec!(0),
            ..EngineConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ReturnsError::InvalidInput { .. })
        ));
    }
}
