use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a metric could not be computed for a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum Unavailable {
    #[error("no acquisition (escrow close) date recorded")]
    MissingAcquisitionDate,
    #[error("no time has elapsed since acquisition")]
    ZeroElapsedTime,
    #[error("IRR did not converge")]
    NonConvergentIrr,
    #[error("no valuation data reported")]
    NoValuationData,
    #[error("current valuation is zero")]
    ZeroValuation,
    #[error("no applicable payment months")]
    NoApplicableMonths,
}

/// A single derived figure: either a value or an explicit reason it is absent.
///
/// Every metric in a summary is computed independently, so one `Unavailable`
/// never prevents its siblings from carrying a value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric<T> {
    Value(T),
    Unavailable(Unavailable),
}

impl<T> Metric<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Metric::Value(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Metric::Value(v) => Some(v),
            Metric::Unavailable(_) => None,
        }
    }

    pub fn reason(&self) -> Option<Unavailable> {
        match self {
            Metric::Value(_) => None,
            Metric::Unavailable(r) => Some(*r),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Metric<U> {
        match self {
            Metric::Value(v) => Metric::Value(f(v)),
            Metric::Unavailable(r) => Metric::Unavailable(r),
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Metric<U>) -> Metric<U> {
        match self {
            Metric::Value(v) => f(v),
            Metric::Unavailable(r) => Metric::Unavailable(r),
        }
    }
}
