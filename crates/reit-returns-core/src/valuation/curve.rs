use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::metric::{Metric, Unavailable};
use crate::portfolio::PropertyRecords;
use crate::types::{Money, PropertyId, ValuationPoint};

/// Valuations within this distance of the reference price are placeholders.
pub const PLACEHOLDER_EPSILON: Decimal = dec!(0.001);
/// A reported valuation this close to a grid date is used as-is.
pub const MATCH_WINDOW_DAYS: i64 = 45;
/// Grid spacing in months.
pub const GRID_STEP_MONTHS: u32 = 3;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One sample of the resampled valuation curve. `None` marks a gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub date: NaiveDate,
    pub value: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationCurve {
    pub property_id: PropertyId,
    pub points: Vec<CurvePoint>,
}

impl ValuationCurve {
    fn empty(property_id: &str) -> Self {
        Self {
            property_id: property_id.to_string(),
            points: vec![],
        }
    }
}

/// Where the current valuation figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationSource {
    /// Final payout of a completed property
    Completion,
    /// Latest reported valuation point
    Reported,
    /// Nothing reported; reference price shown for display only
    ReferenceFallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentValuation {
    pub value: Money,
    pub source: ValuationSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of_date: Option<NaiveDate>,
}

impl CurrentValuation {
    /// The valuation as an input to return calculations. The display fallback
    /// is not a real valuation and reports `NoValuationData`.
    pub fn metric(&self) -> Metric<Money> {
        match self.source {
            ValuationSource::ReferenceFallback => Metric::Unavailable(Unavailable::NoValuationData),
            _ => Metric::Value(self.value),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Completion payout, else latest reported valuation on or before the end
/// date, else the reference price flagged as a fallback.
pub fn current_valuation(
    records: &PropertyRecords,
    reference_price: Money,
    as_of: NaiveDate,
) -> CurrentValuation {
    if let Some(c) = &records.completion {
        return CurrentValuation {
            value: c.final_payout_per_share,
            source: ValuationSource::Completion,
            as_of_date: Some(c.ending_date),
        };
    }

    let end = records.end_date(as_of);
    match records.valuations.iter().rev().find(|v| v.as_of_date <= end) {
        Some(latest) => CurrentValuation {
            value: latest.per_share_valuation,
            source: ValuationSource::Reported,
            as_of_date: Some(latest.as_of_date),
        },
        None => CurrentValuation {
            value: reference_price,
            source: ValuationSource::ReferenceFallback,
            as_of_date: None,
        },
    }
}

/// Resample a property's sparse valuations onto a quarterly grid.
///
/// The grid starts at the offering date with the reference price. Leading
/// valuations still sitting at the reference price are dropped as
/// placeholders; grid dates before the first real valuation are gaps, and
/// later grid dates without a nearby report carry the last value forward.
pub fn build_curve(records: &PropertyRecords, reference_price: Money, as_of: NaiveDate) -> ValuationCurve {
    let end = records.end_date(as_of);
    let visible: Vec<&ValuationPoint> = records
        .valuations
        .iter()
        .filter(|v| v.as_of_date <= end)
        .collect();

    let anchor_date = match (&records.acquisition, visible.first()) {
        (Some(acq), _) => acq.anchor_date(),
        (None, Some(first)) => first.as_of_date,
        (None, None) => return ValuationCurve::empty(&records.property_id),
    };
    // Offering after the end date: nothing to plot
    if anchor_date > end {
        return ValuationCurve::empty(&records.property_id);
    }

    let retained: &[&ValuationPoint] = match visible
        .iter()
        .position(|v| (v.per_share_valuation - reference_price).abs() > PLACEHOLDER_EPSILON)
    {
        Some(idx) => &visible[idx..],
        None => &[],
    };

    let anchor = CurvePoint {
        date: anchor_date,
        value: Some(reference_price),
    };
    let (Some(first), Some(last)) = (retained.first(), retained.last()) else {
        return ValuationCurve {
            property_id: records.property_id.clone(),
            points: vec![anchor],
        };
    };

    let mut points = Vec::new();
    let mut last_used = false;
    let mut step = 0u32;

    loop {
        let Some(grid_date) = anchor_date.checked_add_months(Months::new(step * GRID_STEP_MONTHS)) else {
            break;
        };
        if step > 0 && (grid_date > last.as_of_date || grid_date > end) {
            break;
        }

        let nearby = retained
            .iter()
            .filter(|v| (v.as_of_date - grid_date).num_days().abs() <= MATCH_WINDOW_DAYS)
            .min_by_key(|v| (v.as_of_date - grid_date).num_days().abs());

        let value = if let Some(v) = nearby {
            if v.as_of_date == last.as_of_date {
                last_used = true;
            }
            Some(v.per_share_valuation)
        } else if step == 0 {
            anchor.value
        } else if grid_date < first.as_of_date {
            None
        } else {
            retained
                .iter()
                .rev()
                .find(|v| v.as_of_date <= grid_date)
                .map(|v| v.per_share_valuation)
        };

        points.push(CurvePoint {
            date: grid_date,
            value,
        });
        step += 1;
    }

    if !last_used && points.last().map_or(true, |p| p.date < last.as_of_date) {
        points.push(CurvePoint {
            date: last.as_of_date,
            value: Some(last.per_share_valuation),
        });
    }

    tracing::debug!(
        property = %records.property_id,
        samples = points.len(),
        discarded = visible.len() - retained.len(),
        "built valuation curve"
    );

    ValuationCurve {
        property_id: records.property_id.clone(),
        points,
    }
}
