use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::dividends::smoothing::MonthlyAmount;
use crate::metric::{Metric, Unavailable};
use crate::portfolio::PropertyRecords;
use crate::types::{Money, Percent, YearMonth};

const DAYS_PER_YEAR: Decimal = dec!(365);
const HUNDRED: Decimal = dec!(100);
const TRAILING_WINDOW_MONTHS: u32 = 11;

/// A smoothed month together with its annualized yield.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyYieldPoint {
    pub year: i32,
    pub month: u32,
    pub amount: Money,
    /// amount / days_in_month * 365 / reference_price * 100, one decimal
    pub annualized_yield_percent: Percent,
}

/// Dividend yield figures for one property as of the end date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldMetrics {
    /// Earlier of the as-of date and the completion date
    pub end_date: NaiveDate,
    pub total_dividends: Money,
    pub days_since_acquisition: Metric<i64>,
    pub gross_yield_percent: Percent,
    pub all_time_average_yield_percent: Metric<Percent>,
    /// Dividends behind the trailing yield: the last twelve calendar months
    /// once a year has elapsed, otherwise total dividends annualized
    pub trailing_amount: Metric<Money>,
    pub ttm_yield_percent: Metric<Percent>,
}

/// Annualize one month's distribution against the reference price.
pub fn monthly_annualized_yield(amount: Money, ym: YearMonth, reference_price: Money) -> Percent {
    let days = Decimal::from(ym.days_in_month());
    (amount * DAYS_PER_YEAR * HUNDRED / (days * reference_price))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

pub fn monthly_yield_series(series: &[MonthlyAmount], reference_price: Money) -> Vec<MonthlyYieldPoint> {
    series
        .iter()
        .map(|m| MonthlyYieldPoint {
            year: m.year,
            month: m.month,
            amount: m.amount,
            annualized_yield_percent: monthly_annualized_yield(
                m.amount,
                m.year_month(),
                reference_price,
            ),
        })
        .collect()
}

/// First day of the trailing window: eleven months before the end date.
pub fn trailing_window_start(end_date: NaiveDate) -> NaiveDate {
    end_date
        .checked_sub_months(Months::new(TRAILING_WINDOW_MONTHS))
        .unwrap_or(NaiveDate::MIN)
}

fn annualized_percent(total: Money, days: i64, reference_price: Money) -> Percent {
    total * DAYS_PER_YEAR * HUNDRED / (Decimal::from(days) * reference_price)
}

/// Gross, all-time average and trailing yields for a property.
///
/// `reference_price` must be positive; `EngineConfig::validate` enforces it.
pub fn calculate_yields(
    records: &PropertyRecords,
    reference_price: Money,
    as_of: NaiveDate,
) -> YieldMetrics {
    let end_date = records.end_date(as_of);
    let total_dividends = records.total_dividends(as_of);
    let days = records.days_since_acquisition(as_of);

    let gross_yield_percent = total_dividends / reference_price * HUNDRED;

    let all_time_average_yield_percent =
        days.map(|n| annualized_percent(total_dividends, n, reference_price));

    let trailing_amount = days.map(|n| {
        if n >= 365 {
            let window_start = trailing_window_start(end_date);
            records
                .eligible_dividends(as_of)
                .filter(|d| d.payment_date >= window_start)
                .map(|d| d.per_share_amount)
                .sum::<Decimal>()
        } else {
            total_dividends * DAYS_PER_YEAR / Decimal::from(n)
        }
    });
    let ttm_yield_percent = trailing_amount.map(|amount| amount / reference_price * HUNDRED);

    if let Some(reason) = days.reason() {
        tracing::debug!(property = %records.property_id, %reason, "time-based yields unavailable");
    }

    YieldMetrics {
        end_date,
        total_dividends,
        days_since_acquisition: days,
        gross_yield_percent,
        all_time_average_yield_percent,
        trailing_amount,
        ttm_yield_percent,
    }
}

/// Trailing distributions as a percentage of the current valuation.
pub fn current_yield(trailing_amount: Metric<Money>, current_valuation: Metric<Money>) -> Metric<Percent> {
    current_valuation.and_then(|valuation| {
        if valuation.is_zero() {
            return Metric::Unavailable(Unavailable::ZeroValuation);
        }
        trailing_amount.map(|amount| amount / valuation * HUNDRED)
    })
}
