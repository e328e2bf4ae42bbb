use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::ExclusionTable;
use crate::metric::{Metric, Unavailable};
use crate::portfolio::PropertyRecords;
use crate::types::{Money, Percent, PropertyId, YearMonth};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Distribution status of a single property-month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Missed,
    /// Outside the property's lifecycle, in the future, or in an excluded window
    NotApplicable,
}

/// One month of the payment grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCell {
    pub month: u32,
    pub status: PaymentStatus,
    /// Amount paid per share, present only for `Paid` months
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
}

/// Twelve cells, January through December.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentYear {
    pub year: i32,
    pub cells: Vec<PaymentCell>,
}

/// Month-by-year payment history for one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentGrid {
    pub property_id: PropertyId,
    pub years: Vec<PaymentYear>,
    /// Months with a distribution
    pub paid_count: u32,
    /// Months where a distribution was expected (paid + missed)
    pub total_count: u32,
    /// paid / total * 100, one decimal
    pub success_rate_percent: Metric<Percent>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Classify one property-month.
///
/// Checks run in order: future months, completion, the acquisition-month
/// exception, exclusion windows, then months starting before escrow close.
pub fn status(
    records: &PropertyRecords,
    exclusions: &ExclusionTable,
    as_of: NaiveDate,
    ym: YearMonth,
) -> PaymentStatus {
    if ym > YearMonth::of(as_of) {
        return PaymentStatus::NotApplicable;
    }

    let month_start = ym.first_day();
    if let Some(c) = &records.completion {
        if month_start > c.ending_date {
            return PaymentStatus::NotApplicable;
        }
    }

    let paid = records.paid_in(ym) > Decimal::ZERO;

    if paid && records.acquisition_month() == Some(ym) {
        return PaymentStatus::Paid;
    }

    if exclusions.is_excluded(&records.property_id, ym) {
        return PaymentStatus::NotApplicable;
    }

    if let Some(close) = records.escrow_close_date() {
        if month_start < close {
            return PaymentStatus::NotApplicable;
        }
    }

    if paid {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Missed
    }
}

/// Build the full year × month grid for a property.
///
/// Rows span the acquisition year (or the first distribution year when no
/// acquisition is recorded) through the earlier of the as-of and completion
/// years.
pub fn payment_grid(
    records: &PropertyRecords,
    exclusions: &ExclusionTable,
    as_of: NaiveDate,
) -> PaymentGrid {
    let first_year = records
        .escrow_close_date()
        .or_else(|| records.dividends.first().map(|d| d.payment_date))
        .map(|d| d.year());
    let last_year = records.end_date(as_of).year();

    let mut years = Vec::new();
    let mut paid_count = 0u32;
    let mut total_count = 0u32;

    if let Some(first_year) = first_year {
        for year in first_year..=last_year {
            let cells: Vec<PaymentCell> = (1..=12)
                .map(|month| {
                    let ym = YearMonth::new(year, month);
                    let st = status(records, exclusions, as_of, ym);
                    let amount = match st {
                        PaymentStatus::Paid => {
                            paid_count += 1;
                            total_count += 1;
                            Some(records.paid_in(ym))
                        }
                        PaymentStatus::Missed => {
                            total_count += 1;
                            None
                        }
                        PaymentStatus::NotApplicable => None,
                    };
                    PaymentCell {
                        month,
                        status: st,
                        amount,
                    }
                })
                .collect();
            years.push(PaymentYear { year, cells });
        }
    }

    let success_rate_percent = if total_count == 0 {
        Metric::Unavailable(Unavailable::NoApplicableMonths)
    } else {
        let rate = Decimal::from(paid_count) / Decimal::from(total_count) * dec!(100);
        Metric::Value(rate.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
    };

    tracing::debug!(
        property = %records.property_id,
        years = years.len(),
        paid_count,
        total_count,
        "built payment grid"
    );

    PaymentGrid {
        property_id: records.property_id.clone(),
        years,
        paid_count,
        total_count,
        success_rate_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExclusionWindow;
    use crate::types::{AcquisitionRecord, CompletionRecord, DividendEvent};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn div(y: i32, m: u32, day: u32, amount: Decimal) -> DividendEvent {
        DividendEvent {
            property_id: "P".into(),
            payment_date: d(y, m, day),
            per_share_amount: amount,
        }
    }

    fn records(escrow: NaiveDate, dividends: Vec<DividendEvent>) -> PropertyRecords {
        PropertyRecords {
            property_id: "P".into(),
            dividends,
            acquisition: Some(AcquisitionRecord {
                property_id: "P".into(),
                escrow_close_date: escrow,
                ipo_date: None,
            }),
            completion: None,
            valuations: vec![],
        }
    }

    #[test]
    fn test_months_before_acquisition_not_applicable() {
        let rec = records(d(2022, 3, 15), vec![div(2022, 5, 1, dec!(0.05))]);
        let ex = ExclusionTable::default();
        let as_of = d(2022, 12, 31);
        assert_eq!(status(&rec, &ex, as_of, YearMonth::new(2022, 1)), PaymentStatus::NotApplicable);
        assert_eq!(status(&rec, &ex, as_of, YearMonth::new(2022, 2)), PaymentStatus::NotApplicable);
        // Acquisition month with no payment starts before escrow close
        assert_eq!(status(&rec, &ex, as_of, YearMonth::new(2022, 3)), PaymentStatus::NotApplicable);
        assert_eq!(status(&rec, &ex, as_of, YearMonth::new(2022, 4)), PaymentStatus::Missed);
        assert_eq!(status(&rec, &ex, as_of, YearMonth::new(2022, 5)), PaymentStatus::Paid);
    }

    #[test]
    fn test_acquisition_month_paid_when_dividend_exists() {
        let rec = records(d(2022, 3, 15), vec![div(2022, 3, 30, dec!(0.02))]);
        let ex = ExclusionTable::new(vec![ExclusionWindow::global(2022, 3, 3)]);
        assert_eq!(
            status(&rec, &ex, d(2022, 12, 31), YearMonth::new(2022, 3)),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn test_exclusion_window_suppresses_missed_month() {
        let rec = records(d(2022, 1, 1), vec![]);
        let ex = ExclusionTable::new(vec![ExclusionWindow::for_property("P", 2022, 6, 8)]);
        let as_of = d(2022, 12, 31);
        assert_eq!(status(&rec, &ex, as_of, YearMonth::new(2022, 5)), PaymentStatus::Missed);
        assert_eq!(status(&rec, &ex, as_of, YearMonth::new(2022, 7)), PaymentStatus::NotApplicable);
    }

    #[test]
    fn test_exclusion_window_suppresses_paid_month() {
        let rec = records(
            d(2022, 1, 1),
            vec![div(2022, 6, 1, dec!(0.05)), div(2022, 9, 1, dec!(0.05))],
        );
        let ex = ExclusionTable::new(vec![ExclusionWindow::global(2022, 6, 8)]);
        let as_of = d(2022, 12, 31);
        assert_eq!(status(&rec, &ex, as_of, YearMonth::new(2022, 6)), PaymentStatus::NotApplicable);
        assert_eq!(status(&rec, &ex, as_of, YearMonth::new(2022, 9)), PaymentStatus::Paid);

        let grid = payment_grid(&rec, &ex, as_of);
        assert_eq!(grid.years[0].cells[5].amount, None);
        // Jun-Aug excluded: 9 applicable months, only September paid
        assert_eq!(grid.total_count, 9);
        assert_eq!(grid.paid_count, 1);
    }

    #[test]
    fn test_future_months_not_applicable() {
        let rec = records(d(2022, 1, 1), vec![div(2022, 8, 1, dec!(0.05))]);
        let ex = ExclusionTable::default();
        assert_eq!(
            status(&rec, &ex, d(2022, 7, 15), YearMonth::new(2022, 8)),
            PaymentStatus::NotApplicable
        );
        assert_eq!(
            status(&rec, &ex, d(2022, 7, 15), YearMonth::new(2022, 7)),
            PaymentStatus::Missed
        );
    }

    #[test]
    fn test_zero_amount_counts_as_missed() {
        let rec = records(d(2022, 1, 1), vec![div(2022, 2, 1, dec!(0))]);
        assert_eq!(
            status(&rec, &ExclusionTable::default(), d(2022, 12, 31), YearMonth::new(2022, 2)),
            PaymentStatus::Missed
        );
    }

    #[test]
    fn test_grid_stops_at_completion() {
        let mut rec = records(
            d(2021, 1, 1),
            vec![div(2021, 6, 1, dec!(0.05)), div(2022, 3, 1, dec!(0.05))],
        );
        rec.completion = Some(CompletionRecord {
            property_id: "P".into(),
            ending_date: d(2022, 4, 10),
            final_payout_per_share: dec!(12),
        });
        let grid = payment_grid(&rec, &ExclusionTable::default(), d(2024, 6, 30));

        assert_eq!(grid.years.len(), 2);
        assert_eq!(grid.years.last().unwrap().year, 2022);
        for year in &grid.years {
            for cell in &year.cells {
                if YearMonth::new(year.year, cell.month).first_day() > d(2022, 4, 10) {
                    assert_eq!(cell.status, PaymentStatus::NotApplicable);
                }
            }
        }
        // 2021: 12 applicable, 2022: Jan..Apr
        assert_eq!(grid.total_count, 16);
        assert_eq!(grid.paid_count, 2);
        assert_eq!(grid.success_rate_percent, Metric::Value(dec!(12.5)));
    }

    #[test]
    fn test_grid_without_history_has_no_rate() {
        let rec = PropertyRecords {
            property_id: "P".into(),
            dividends: vec![],
            acquisition: None,
            completion: None,
            valuations: vec![],
        };
        let grid = payment_grid(&rec, &ExclusionTable::default(), d(2024, 6, 30));
        assert!(grid.years.is_empty());
        assert_eq!(
            grid.success_rate_percent,
            Metric::Unavailable(Unavailable::NoApplicableMonths)
        );
    }
}
