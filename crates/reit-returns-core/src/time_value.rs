use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::ReturnsError;
use crate::types::{CashFlow, Money, Rate};
use crate::ReturnsResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
pub const MAX_IRR_ITERATIONS: u32 = 100;
pub const DEFAULT_IRR_GUESS: Rate = dec!(0.10);
const DAYS_PER_YEAR: Decimal = dec!(365);

/// Years elapsed between `base` and `date` on an actual/365 basis.
pub fn year_fraction(base: NaiveDate, date: NaiveDate) -> Decimal {
    Decimal::from((date - base).num_days()) / DAYS_PER_YEAR
}

/// NPV and its derivative with respect to the rate, in one pass.
/// `None` when `(1 + rate)` is not positive or a power overflows.
fn npv_and_derivative(rate: Rate, flows: &[CashFlow]) -> Option<(Money, Money)> {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }

    let base = flows.first()?.date;
    let mut npv_val = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;

    for cf in flows {
        let years = year_fraction(base, cf.date);
        let discount = one_plus_r.checked_powd(years)?;
        if discount.is_zero() {
            return None;
        }
        npv_val = npv_val.checked_add(cf.amount.checked_div(discount)?)?;
        let slope = (years * cf.amount).checked_div(one_plus_r.checked_mul(discount)?)?;
        dnpv = dnpv.checked_sub(slope)?;
    }

    Some((npv_val, dnpv))
}

/// Net present value of dated cash flows, discounted to the first flow's date.
pub fn xnpv(rate: Rate, flows: &[CashFlow]) -> ReturnsResult<Money> {
    if rate <= dec!(-1) {
        return Err(ReturnsError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }
    if flows.is_empty() {
        return Ok(Decimal::ZERO);
    }
    npv_and_derivative(rate, flows)
        .map(|(npv, _)| npv)
        .ok_or_else(|| ReturnsError::DivisionByZero {
            context: "XNPV discount factor".into(),
        })
}

/// Extended IRR for irregular cash flow dates using Newton-Raphson.
///
/// Stops when either |NPV| or the rate step drops below 1e-7. The rate is
/// clamped to [-0.99, 100] between steps.
pub fn xirr(flows: &[CashFlow], guess: Rate) -> ReturnsResult<Rate> {
    if flows.len() < 2 {
        return Err(ReturnsError::InsufficientData(
            "XIRR requires at least 2 cash flows".into(),
        ));
    }

    let mut rate = guess;
    let mut last_npv = Decimal::ZERO;

    for i in 0..MAX_IRR_ITERATIONS {
        let Some((npv_val, dnpv)) = npv_and_derivative(rate, flows) else {
            return Err(ReturnsError::ConvergenceFailure {
                function: "XIRR".into(),
                iterations: i,
                last_delta: last_npv,
            });
        };
        last_npv = npv_val;

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            tracing::debug!(iterations = i, rate = %rate, "XIRR converged on NPV");
            return Ok(rate);
        }

        if dnpv.is_zero() {
            return Err(ReturnsError::ConvergenceFailure {
                function: "XIRR".into(),
                iterations: i,
                last_delta: npv_val,
            });
        }

        let mut next = rate - npv_val / dnpv;

        // Guard against divergence; a pinned rate is not a converged one
        let mut clamped = false;
        if next < dec!(-0.99) {
            next = dec!(-0.99);
            clamped = true;
        } else if next > dec!(100.0) {
            next = dec!(100.0);
            clamped = true;
        }

        if !clamped && (next - rate).abs() < CONVERGENCE_THRESHOLD {
            tracing::debug!(iterations = i + 1, rate = %next, "XIRR converged on step");
            return Ok(next);
        }
        rate = next;
    }

    Err(ReturnsError::ConvergenceFailure {
        function: "XIRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta: last_npv,
    })
}
