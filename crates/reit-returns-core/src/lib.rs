pub mod config;
pub mod dividends;
pub mod error;
pub mod metric;
pub mod portfolio;
pub mod time_value;
pub mod types;
pub mod valuation;

#[cfg(feature = "calendar")]
pub mod calendar;

#[cfg(feature = "returns")]
pub mod returns;

#[cfg(feature = "returns")]
pub mod analysis;

pub use config::{EngineConfig, ExclusionTable, ExclusionWindow};
pub use error::ReturnsError;
pub use metric::{Metric, Unavailable};
pub use portfolio::{PortfolioSnapshot, PropertyRecords};
pub use types::*;

/// Standard result type for all reit-returns operations
pub type ReturnsResult<T> = Result<T, ReturnsError>;
