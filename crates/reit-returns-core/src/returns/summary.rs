use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calendar::payment_status::payment_grid;
use crate::config::EngineConfig;
use crate::dividends::yields::{self, YieldMetrics};
use crate::metric::{Metric, Unavailable};
use crate::portfolio::PropertyRecords;
use crate::returns::irr;
use crate::types::{Money, Percent, PropertyId};
use crate::valuation::curve::{self, CurrentValuation};

const DAYS_PER_YEAR: Decimal = dec!(365);
const HUNDRED: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Appreciation and total-return figures for one property.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnsMetrics {
    pub appreciation_per_share: Metric<Money>,
    pub appreciation_percent: Metric<Percent>,
    pub total_gross_return_percent: Metric<Percent>,
    pub average_annual_return_percent: Metric<Percent>,
}

/// Cross-property comparable summary of one property's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnsSummary {
    pub property_id: PropertyId,
    pub end_date: NaiveDate,
    pub paid_count: u32,
    pub total_count: u32,
    pub success_rate_percent: Metric<Percent>,
    pub total_dividends: Metric<Money>,
    pub gross_yield_percent: Metric<Percent>,
    pub all_time_average_yield_percent: Metric<Percent>,
    pub ttm_yield_percent: Metric<Percent>,
    pub current_yield_percent: Metric<Percent>,
    /// Always carries a figure for display; check `source` before relying on it
    pub current_valuation: CurrentValuation,
    pub appreciation_per_share: Metric<Money>,
    pub appreciation_percent: Metric<Percent>,
    pub total_gross_return_percent: Metric<Percent>,
    pub average_annual_return_percent: Metric<Percent>,
    pub irr_percent: Metric<Percent>,
}

impl ReturnsSummary {
    /// Names and reasons of every metric that could not be computed.
    pub fn unavailable_metrics(&self) -> Vec<(&'static str, Unavailable)> {
        [
            ("success_rate_percent", self.success_rate_percent.reason()),
            ("total_dividends", self.total_dividends.reason()),
            ("gross_yield_percent", self.gross_yield_percent.reason()),
            (
                "all_time_average_yield_percent",
                self.all_time_average_yield_percent.reason(),
            ),
            ("ttm_yield_percent", self.ttm_yield_percent.reason()),
            ("current_yield_percent", self.current_yield_percent.reason()),
            ("current_valuation", self.current_valuation.metric().reason()),
            ("appreciation_per_share", self.appreciation_per_share.reason()),
            ("appreciation_percent", self.appreciation_percent.reason()),
            (
                "total_gross_return_percent",
                self.total_gross_return_percent.reason(),
            ),
            (
                "average_annual_return_percent",
                self.average_annual_return_percent.reason(),
            ),
            ("irr_percent", self.irr_percent.reason()),
        ]
        .into_iter()
        .filter_map(|(name, reason)| reason.map(|r| (name, r)))
        .collect()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Combine dividends with the current valuation into appreciation and
/// total-return metrics.
pub fn aggregate_returns(
    yields: &YieldMetrics,
    current_valuation: Metric<Money>,
    reference_price: Money,
) -> ReturnsMetrics {
    let appreciation_per_share = current_valuation.map(|v| v - reference_price);
    let appreciation_percent = appreciation_per_share.map(|a| a / reference_price * HUNDRED);
    let total_gross_return_percent = appreciation_per_share
        .map(|a| (a + yields.total_dividends) / reference_price * HUNDRED);
    let average_annual_return_percent = total_gross_return_percent.and_then(|total| {
        yields
            .days_since_acquisition
            .map(|days| total * DAYS_PER_YEAR / Decimal::from(days))
    });

    ReturnsMetrics {
        appreciation_per_share,
        appreciation_percent,
        total_gross_return_percent,
        average_annual_return_percent,
    }
}

/// Compute every summary metric for a property. Each metric is derived
/// independently, so an unavailable input only blanks the metrics built on it.
pub fn summarize(records: &PropertyRecords, config: &EngineConfig, as_of: NaiveDate) -> ReturnsSummary {
    let reference_price = config.reference_price;

    let grid = payment_grid(records, &config.exclusions, as_of);
    let yield_metrics = yields::calculate_yields(records, reference_price, as_of);
    let current = curve::current_valuation(records, reference_price, as_of);
    let valuation = current.metric();

    let current_yield_percent = yields::current_yield(yield_metrics.trailing_amount, valuation);
    let returns = aggregate_returns(&yield_metrics, valuation, reference_price);
    let irr_percent = irr::property_irr(records, reference_price, valuation, as_of)
        .map(|r| r * HUNDRED);

    let summary = ReturnsSummary {
        property_id: records.property_id.clone(),
        end_date: yield_metrics.end_date,
        paid_count: grid.paid_count,
        total_count: grid.total_count,
        success_rate_percent: grid.success_rate_percent,
        total_dividends: Metric::Value(yield_metrics.total_dividends),
        gross_yield_percent: Metric::Value(yield_metrics.gross_yield_percent),
        all_time_average_yield_percent: yield_metrics.all_time_average_yield_percent,
        ttm_yield_percent: yield_metrics.ttm_yield_percent,
        current_yield_percent,
        current_valuation: current,
        appreciation_per_share: returns.appreciation_per_share,
        appreciation_percent: returns.appreciation_percent,
        total_gross_return_percent: returns.total_gross_return_percent,
        average_annual_return_percent: returns.average_annual_return_percent,
        irr_percent,
    };

    for (metric, reason) in summary.unavailable_metrics() {
        tracing::debug!(property = %summary.property_id, metric, %reason, "metric unavailable");
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AcquisitionRecord, DividendEvent, ValuationPoint, REFERENCE_PRICE};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn yields_with(total: Money, days: Metric<i64>) -> YieldMetrics {
        YieldMetrics {
            end_date: d(2024, 12, 31),
            total_dividends: total,
            days_since_acquisition: days,
            gross_yield_percent: total / REFERENCE_PRICE * HUNDRED,
            all_time_average_yield_percent: Metric::Unavailable(Unavailable::ZeroElapsedTime),
            trailing_amount: Metric::Unavailable(Unavailable::ZeroElapsedTime),
            ttm_yield_percent: Metric::Unavailable(Unavailable::ZeroElapsedTime),
        }
    }

    #[test]
    fn test_aggregate_returns() {
        let y = yields_with(dec!(1.5), Metric::Value(730));
        let r = aggregate_returns(&y, Metric::Value(dec!(11)), REFERENCE_PRICE);
        assert_eq!(r.appreciation_per_share, Metric::Value(dec!(1)));
        assert_eq!(r.appreciation_percent, Metric::Value(dec!(10)));
        // (1 + 1.5) / 10 * 100 = 25; 25 / 730 * 365 = 12.5
        assert_eq!(r.total_gross_return_percent, Metric::Value(dec!(25)));
        assert_eq!(r.average_annual_return_percent, Metric::Value(dec!(12.5)));
    }

    #[test]
    fn test_no_valuation_blanks_appreciation_only() {
        let y = yields_with(dec!(1.5), Metric::Value(730));
        let r = aggregate_returns(
            &y,
            Metric::Unavailable(Unavailable::NoValuationData),
            REFERENCE_PRICE,
        );
        assert_eq!(
            r.appreciation_percent,
            Metric::Unavailable(Unavailable::NoValuationData)
        );
        assert_eq!(
            r.average_annual_return_percent,
            Metric::Unavailable(Unavailable::NoValuationData)
        );
    }

    #[test]
    fn test_zero_elapsed_blanks_average_annual_return() {
        let y = yields_with(dec!(0), Metric::Unavailable(Unavailable::ZeroElapsedTime));
        let r = aggregate_returns(&y, Metric::Value(dec!(10)), REFERENCE_PRICE);
        assert_eq!(r.total_gross_return_percent, Metric::Value(dec!(0)));
        assert_eq!(
            r.average_annual_return_percent,
            Metric::Unavailable(Unavailable::ZeroElapsedTime)
        );
    }

    #[test]
    fn test_summary_metrics_are_independent() {
        let rec = PropertyRecords {
            property_id: "P".into(),
            dividends: vec![DividendEvent {
                property_id: "P".into(),
                payment_date: d(2024, 2, 1),
                per_share_amount: dec!(0.10),
            }],
            acquisition: None,
            completion: None,
            valuations: vec![ValuationPoint {
                property_id: "P".into(),
                as_of_date: d(2024, 3, 31),
                per_share_valuation: dec!(10.8),
            }],
        };
        let s = summarize(&rec, &EngineConfig::default(), d(2024, 6, 30));
        assert_eq!(s.gross_yield_percent, Metric::Value(dec!(1)));
        assert_eq!(s.appreciation_per_share, Metric::Value(dec!(0.8)));
        assert_eq!(
            s.irr_percent,
            Metric::Unavailable(Unavailable::MissingAcquisitionDate)
        );
        assert_eq!(
            s.ttm_yield_percent,
            Metric::Unavailable(Unavailable::MissingAcquisitionDate)
        );
        let names: Vec<&str> = s.unavailable_metrics().into_iter().map(|(n, _)| n).collect();
        assert!(names.contains(&"irr_percent"));
        assert!(!names.contains(&"gross_yield_percent"));
    }

    #[test]
    fn test_summary_with_acquisition() {
        let rec = PropertyRecords {
            property_id: "P".into(),
            dividends: vec![],
            acquisition: Some(AcquisitionRecord {
                property_id: "P".into(),
                escrow_close_date: d(2023, 1, 1),
                ipo_date: None,
            }),
            completion: None,
            valuations: vec![ValuationPoint {
                property_id: "P".into(),
                as_of_date: d(2023, 12, 31),
                per_share_valuation: dec!(11),
            }],
        };
        let s = summarize(&rec, &EngineConfig::default(), d(2024, 1, 1));
        let irr = s.irr_percent.into_option().unwrap();
        assert!((irr - dec!(10)).abs() < dec!(0.0001));
        assert_eq!(s.paid_count, 0);
        assert_eq!(s.total_count, 13);
    }
}
