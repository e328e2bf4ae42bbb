use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ReturnsError;
use crate::metric::{Metric, Unavailable};
use crate::types::*;
use crate::ReturnsResult;

/// Already-normalized records for every property, as handed over by ingestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    #[serde(default)]
    pub dividends: Vec<DividendEvent>,
    #[serde(default)]
    pub acquisitions: Vec<AcquisitionRecord>,
    #[serde(default)]
    pub completions: Vec<CompletionRecord>,
    #[serde(default)]
    pub valuations: Vec<ValuationPoint>,
}

impl PortfolioSnapshot {
    /// Distinct property ids across all record kinds, sorted.
    pub fn property_ids(&self) -> Vec<PropertyId> {
        let ids: BTreeSet<&str> = self
            .dividends
            .iter()
            .map(|d| d.property_id.as_str())
            .chain(self.acquisitions.iter().map(|a| a.property_id.as_str()))
            .chain(self.completions.iter().map(|c| c.property_id.as_str()))
            .chain(self.valuations.iter().map(|v| v.property_id.as_str()))
            .collect();
        ids.into_iter().map(String::from).collect()
    }

    /// Collect one property's records, with dividends and valuations sorted by date.
    pub fn property(&self, property_id: &str) -> ReturnsResult<PropertyRecords> {
        let mut dividends: Vec<DividendEvent> = self
            .dividends
            .iter()
            .filter(|d| d.property_id == property_id)
            .cloned()
            .collect();
        dividends.sort_by_key(|d| d.payment_date);

        let mut valuations: Vec<ValuationPoint> = self
            .valuations
            .iter()
            .filter(|v| v.property_id == property_id)
            .cloned()
            .collect();
        valuations.sort_by_key(|v| v.as_of_date);

        let acquisition = self
            .acquisitions
            .iter()
            .find(|a| a.property_id == property_id)
            .cloned();
        let completion = self
            .completions
            .iter()
            .find(|c| c.property_id == property_id)
            .cloned();

        if dividends.is_empty()
            && valuations.is_empty()
            && acquisition.is_none()
            && completion.is_none()
        {
            return Err(ReturnsError::UnknownProperty(property_id.to_string()));
        }

        tracing::debug!(
            property = property_id,
            dividends = dividends.len(),
            valuations = valuations.len(),
            acquired = acquisition.is_some(),
            completed = completion.is_some(),
            "collected property records"
        );

        Ok(PropertyRecords {
            property_id: property_id.to_string(),
            dividends,
            acquisition,
            completion,
            valuations,
        })
    }
}

/// Immutable view of a single property's lifecycle and history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRecords {
    pub property_id: PropertyId,
    /// Sorted ascending by payment date
    pub dividends: Vec<DividendEvent>,
    pub acquisition: Option<AcquisitionRecord>,
    pub completion: Option<CompletionRecord>,
    /// Sorted ascending by valuation date
    pub valuations: Vec<ValuationPoint>,
}

impl PropertyRecords {
    /// Last day any metric may look at: the as-of date, or the completion date if earlier.
    pub fn end_date(&self, as_of: NaiveDate) -> NaiveDate {
        match &self.completion {
            Some(c) if c.ending_date < as_of => c.ending_date,
            _ => as_of,
        }
    }

    pub fn escrow_close_date(&self) -> Option<NaiveDate> {
        self.acquisition.as_ref().map(|a| a.escrow_close_date)
    }

    pub fn acquisition_month(&self) -> Option<YearMonth> {
        self.escrow_close_date().map(YearMonth::of)
    }

    /// Dividends that count toward returns: paid on or before the end date and
    /// not before escrow close (payments within the escrow-close month count).
    pub fn eligible_dividends(&self, as_of: NaiveDate) -> impl Iterator<Item = &DividendEvent> {
        let end = self.end_date(as_of);
        let escrow = self.escrow_close_date();
        self.dividends.iter().filter(move |d| {
            d.payment_date <= end
                && match escrow {
                    Some(close) => {
                        d.payment_date >= close
                            || YearMonth::of(d.payment_date) == YearMonth::of(close)
                    }
                    None => true,
                }
        })
    }

    pub fn total_dividends(&self, as_of: NaiveDate) -> Money {
        self.eligible_dividends(as_of)
            .map(|d| d.per_share_amount)
            .sum::<Decimal>()
    }

    /// Sum of all distributions paid within a calendar month.
    pub fn paid_in(&self, ym: YearMonth) -> Money {
        self.dividends
            .iter()
            .filter(|d| YearMonth::of(d.payment_date) == ym)
            .map(|d| d.per_share_amount)
            .sum::<Decimal>()
    }

    /// Days from escrow close to the end date.
    pub fn days_since_acquisition(&self, as_of: NaiveDate) -> Metric<i64> {
        let Some(close) = self.escrow_close_date() else {
            return Metric::Unavailable(Unavailable::MissingAcquisitionDate);
        };
        let days = (self.end_date(as_of) - close).num_days();
        if days <= 0 {
            Metric::Unavailable(Unavailable::ZeroElapsedTime)
        } else {
            Metric::Value(days)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn snapshot() -> PortfolioSnapshot {
        PortfolioSnapshot {
            dividends: vec![
                DividendEvent {
                    property_id: "B".into(),
                    payment_date: d(2023, 2, 1),
                    per_share_amount: dec!(0.05),
                },
                DividendEvent {
                    property_id: "A".into(),
                    payment_date: d(2023, 5, 1),
                    per_share_amount: dec!(0.10),
                },
                DividendEvent {
                    property_id: "A".into(),
                    payment_date: d(2023, 3, 20),
                    per_share_amount: dec!(0.02),
                },
                DividendEvent {
                    property_id: "A".into(),
                    payment_date: d(2023, 2, 1),
                    per_share_amount: dec!(0.07),
                },
            ],
            acquisitions: vec![AcquisitionRecord {
                property_id: "A".into(),
                escrow_close_date: d(2023, 3, 15),
                ipo_date: None,
            }],
            completions: vec![],
            valuations: vec![ValuationPoint {
                property_id: "C".into(),
                as_of_date: d(2023, 6, 30),
                per_share_valuation: dec!(11),
            }],
        }
    }

    #[test]
    fn test_property_ids_cover_all_record_kinds() {
        assert_eq!(snapshot().property_ids(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_property_sorts_dividends() {
        let rec = snapshot().property("A").unwrap();
        let dates: Vec<NaiveDate> = rec.dividends.iter().map(|d| d.payment_date).collect();
        assert_eq!(dates, vec![d(2023, 2, 1), d(2023, 3, 20), d(2023, 5, 1)]);
    }

    #[test]
    fn test_unknown_property_is_an_error() {
        assert!(matches!(
            snapshot().property("Z"),
            Err(ReturnsError::UnknownProperty(_))
        ));
    }

    #[test]
    fn test_eligible_dividends_skip_pre_acquisition_months() {
        let rec = snapshot().property("A").unwrap();
        // Feb payment predates escrow month; Mar 20 falls after escrow close
        assert_eq!(rec.total_dividends(d(2023, 12, 31)), dec!(0.12));
    }

    #[test]
    fn test_days_since_acquisition() {
        let rec = snapshot().property("A").unwrap();
        assert_eq!(rec.days_since_acquisition(d(2023, 3, 25)), Metric::Value(10));
        assert_eq!(
            rec.days_since_acquisition(d(2023, 3, 15)),
            Metric::Unavailable(Unavailable::ZeroElapsedTime)
        );
        let b = snapshot().property("B").unwrap();
        assert_eq!(
            b.days_since_acquisition(d(2023, 3, 25)),
            Metric::Unavailable(Unavailable::MissingAcquisitionDate)
        );
    }
}
