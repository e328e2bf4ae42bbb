use chrono::NaiveDate;

use crate::metric::{Metric, Unavailable};
use crate::portfolio::PropertyRecords;
use crate::time_value::{self, DEFAULT_IRR_GUESS};
use crate::types::{CashFlow, Money, Rate};

/// Investor cash flows for one share: the reference price paid at escrow
/// close, every eligible distribution, and the current valuation received
/// at the end date.
pub fn build_cash_flows(
    records: &PropertyRecords,
    reference_price: Money,
    current_valuation: Metric<Money>,
    as_of: NaiveDate,
) -> Metric<Vec<CashFlow>> {
    let Some(escrow_close) = records.escrow_close_date() else {
        return Metric::Unavailable(Unavailable::MissingAcquisitionDate);
    };

    current_valuation.map(|terminal| {
        let mut flows = vec![CashFlow {
            date: escrow_close,
            amount: -reference_price,
            label: Some("investment".into()),
        }];
        flows.extend(records.eligible_dividends(as_of).map(|d| CashFlow {
            date: d.payment_date,
            amount: d.per_share_amount,
            label: Some("dividend".into()),
        }));
        flows.push(CashFlow {
            date: records.end_date(as_of),
            amount: terminal,
            label: Some("terminal value".into()),
        });
        flows
    })
}

/// Solve for the annual rate setting NPV to zero.
///
/// Solver failures (too few flows, flat derivative, iteration cap) are
/// reported as `NonConvergentIrr`, never as an error.
pub fn solve_irr(flows: &[CashFlow]) -> Metric<Rate> {
    match time_value::xirr(flows, DEFAULT_IRR_GUESS) {
        Ok(rate) => Metric::Value(rate),
        Err(e) => {
            tracing::warn!(flows = flows.len(), error = %e, "IRR unavailable");
            Metric::Unavailable(Unavailable::NonConvergentIrr)
        }
    }
}

/// IRR of holding one share from escrow close to the end date.
pub fn property_irr(
    records: &PropertyRecords,
    reference_price: Money,
    current_valuation: Metric<Money>,
    as_of: NaiveDate,
) -> Metric<Rate> {
    build_cash_flows(records, reference_price, current_valuation, as_of)
        .and_then(|flows| solve_irr(&flows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AcquisitionRecord, DividendEvent, REFERENCE_PRICE};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn records() -> PropertyRecords {
        PropertyRecords {
            property_id: "P".into(),
            dividends: vec![
                DividendEvent {
                    property_id: "P".into(),
                    payment_date: d(2023, 7, 1),
                    per_share_amount: dec!(0.25),
                },
                DividendEvent {
                    property_id: "P".into(),
                    payment_date: d(2024, 7, 1),
                    per_share_amount: dec!(0.25),
                },
            ],
            acquisition: Some(AcquisitionRecord {
                property_id: "P".into(),
                escrow_close_date: d(2023, 1, 1),
                ipo_date: None,
            }),
            completion: None,
            valuations: vec![],
        }
    }

    #[test]
    fn test_cash_flows_shape() {
        let flows = build_cash_flows(&records(), REFERENCE_PRICE, Metric::Value(dec!(10.5)), d(2024, 3, 31))
            .into_option()
            .unwrap();
        // investment, one dividend inside the window, terminal value
        assert_eq!(flows.len(), 3);
        assert_eq!(flows[0].amount, dec!(-10));
        assert_eq!(flows[0].date, d(2023, 1, 1));
        assert_eq!(flows[1].amount, dec!(0.25));
        assert_eq!(flows[2].amount, dec!(10.5));
        assert_eq!(flows[2].date, d(2024, 3, 31));
    }

    #[test]
    fn test_one_year_ten_percent() {
        let flows = vec![
            CashFlow {
                date: d(2023, 1, 1),
                amount: dec!(-10),
                label: None,
            },
            CashFlow {
                date: d(2024, 1, 1),
                amount: dec!(11),
                label: None,
            },
        ];
        let r = solve_irr(&flows).into_option().unwrap();
        assert!((r - dec!(0.10)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_irr_is_idempotent() {
        let rec = records();
        let a = property_irr(&rec, REFERENCE_PRICE, Metric::Value(dec!(10.2)), d(2024, 12, 31));
        let b = property_irr(&rec, REFERENCE_PRICE, Metric::Value(dec!(10.2)), d(2024, 12, 31));
        assert_eq!(a, b);
        assert!(a.is_available());
    }

    #[test]
    fn test_irr_unavailable_without_valuation() {
        let r = property_irr(
            &records(),
            REFERENCE_PRICE,
            Metric::Unavailable(Unavailable::NoValuationData),
            d(2024, 12, 31),
        );
        assert_eq!(r, Metric::Unavailable(Unavailable::NoValuationData));
    }

    #[test]
    fn test_irr_unavailable_without_acquisition() {
        let mut rec = records();
        rec.acquisition = None;
        let r = property_irr(&rec, REFERENCE_PRICE, Metric::Value(dec!(11)), d(2024, 12, 31));
        assert_eq!(r, Metric::Unavailable(Unavailable::MissingAcquisitionDate));
    }

    #[test]
    fn test_single_flow_is_non_convergent() {
        let flows = vec![CashFlow {
            date: d(2023, 1, 1),
            amount: dec!(-10),
            label: None,
        }];
        assert_eq!(
            solve_irr(&flows),
            Metric::Unavailable(Unavailable::NonConvergentIrr)
        );
    }

    #[test]
    fn test_no_sign_change_is_non_convergent() {
        let flows = vec![
            CashFlow {
                date: d(2023, 1, 1),
                amount: dec!(-10),
                label: None,
            },
            CashFlow {
                date: d(2024, 1, 1),
                amount: Decimal::ZERO,
                label: None,
            },
            CashFlow {
                date: d(2025, 1, 1),
                amount: dec!(-1),
                label: None,
            },
        ];
        assert_eq!(
            solve_irr(&flows),
            Metric::Unavailable(Unavailable::NonConvergentIrr)
        );
    }
}
