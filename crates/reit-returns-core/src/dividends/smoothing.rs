use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::portfolio::PropertyRecords;
use crate::types::{Money, YearMonth};

/// Per-share amount attributed to one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAmount {
    pub year: i32,
    pub month: u32,
    pub amount: Money,
}

impl MonthlyAmount {
    pub fn year_month(&self) -> YearMonth {
        YearMonth::new(self.year, self.month)
    }
}

/// First day on which distributions are paid monthly.
pub fn cutover_date(cutover_year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(cutover_year, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Split a quarterly lump sum into three monthly parts, oldest month first.
///
/// Each part is `amount / 3` rounded to three decimals, so the parts add back
/// to `amount` within 0.001.
pub fn split_quarterly(amount: Money) -> [Money; 3] {
    let part = (amount / dec!(3)).round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero);
    [part; 3]
}

/// Convert a property's distributions into a one-entry-per-month series.
///
/// Payments before the cutover cover the quarter ending in the payment
/// month; later payments are monthly already. Amounts falling in the same
/// month are added together.
pub fn smooth_dividends(
    records: &PropertyRecords,
    cutover_year: i32,
    as_of: NaiveDate,
) -> Vec<MonthlyAmount> {
    let cutover = cutover_date(cutover_year);
    let mut by_month: BTreeMap<YearMonth, Money> = BTreeMap::new();

    for event in records.eligible_dividends(as_of) {
        let ym = YearMonth::of(event.payment_date);
        if event.payment_date < cutover {
            let parts = split_quarterly(event.per_share_amount);
            for (offset, part) in (-2..=0).zip(parts) {
                *by_month.entry(ym.offset(offset)).or_insert(Decimal::ZERO) += part;
            }
        } else {
            *by_month.entry(ym).or_insert(Decimal::ZERO) += event.per_share_amount;
        }
    }

    tracing::debug!(
        property = %records.property_id,
        months = by_month.len(),
        "smoothed dividend series"
    );

    by_month
        .into_iter()
        .map(|(ym, amount)| MonthlyAmount {
            year: ym.year,
            month: ym.month,
            amount,
        })
        .collect()
}
