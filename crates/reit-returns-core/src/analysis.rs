use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::calendar::payment_status::{self, PaymentGrid};
use crate::config::EngineConfig;
use crate::dividends::smoothing;
use crate::dividends::yields::{self, MonthlyYieldPoint};
use crate::metric::Metric;
use crate::portfolio::PortfolioSnapshot;
use crate::returns::irr;
use crate::returns::summary::{self, ReturnsSummary};
use crate::types::*;
use crate::valuation::curve::{self, ValuationCurve};
use crate::ReturnsResult;

/// Everything the engine derives for a single property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyAnalysis {
    pub payment_grid: PaymentGrid,
    pub monthly_series: Vec<MonthlyYieldPoint>,
    pub valuation_curve: ValuationCurve,
    pub summary: ReturnsSummary,
}

/// Result of a standalone dated-IRR calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrrOutput {
    pub irr: Metric<Rate>,
    pub irr_percent: Metric<Percent>,
    pub cash_flow_count: usize,
    pub net_cash_flow: Money,
}

fn assumptions(config: &EngineConfig, property_id: Option<&str>, as_of: NaiveDate) -> serde_json::Value {
    serde_json::json!({
        "property_id": property_id,
        "as_of": as_of.to_string(),
        "reference_price": config.reference_price.to_string(),
        "cutover_year": config.cutover_year,
        "exclusion_windows": config.exclusions.windows.len(),
    })
}

fn summary_warnings(summary: &ReturnsSummary) -> Vec<String> {
    summary
        .unavailable_metrics()
        .into_iter()
        .map(|(name, reason)| format!("{}: {name} unavailable ({reason})", summary.property_id))
        .collect()
}

/// Month-by-year payment status grid for a property.
pub fn calendar_report(
    snapshot: &PortfolioSnapshot,
    config: &EngineConfig,
    property_id: &str,
    as_of: NaiveDate,
) -> ReturnsResult<ComputationOutput<PaymentGrid>> {
    let start = Instant::now();
    config.validate()?;
    let records = snapshot.property(property_id)?;

    let grid = payment_status::payment_grid(&records, &config.exclusions, as_of);
    let mut warnings = Vec::new();
    if let Some(reason) = grid.success_rate_percent.reason() {
        warnings.push(format!("success_rate_percent unavailable ({reason})"));
    }
    if records.acquisition.is_none() {
        warnings.push("No acquisition record; months before the first distribution are not suppressed".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Distribution calendar: paid / missed / not applicable per month",
        &assumptions(config, Some(property_id), as_of),
        warnings,
        elapsed,
        grid,
    ))
}

/// Smoothed monthly distribution series with annualized yields.
pub fn series_report(
    snapshot: &PortfolioSnapshot,
    config: &EngineConfig,
    property_id: &str,
    as_of: NaiveDate,
) -> ReturnsResult<ComputationOutput<Vec<MonthlyYieldPoint>>> {
    let start = Instant::now();
    config.validate()?;
    let records = snapshot.property(property_id)?;

    let smoothed = smoothing::smooth_dividends(&records, config.cutover_year, as_of);
    let series = yields::monthly_yield_series(&smoothed, config.reference_price);
    let mut warnings = Vec::new();
    if series.is_empty() {
        warnings.push("No eligible distributions to smooth".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Quarterly-to-monthly smoothing; monthly yield annualized on actual days",
        &assumptions(config, Some(property_id), as_of),
        warnings,
        elapsed,
        series,
    ))
}

/// Quarterly-resampled per-share valuation curve.
pub fn curve_report(
    snapshot: &PortfolioSnapshot,
    config: &EngineConfig,
    property_id: &str,
    as_of: NaiveDate,
) -> ReturnsResult<ComputationOutput<ValuationCurve>> {
    let start = Instant::now();
    config.validate()?;
    let records = snapshot.property(property_id)?;

    let valuation_curve = curve::build_curve(&records, config.reference_price, as_of);
    let mut warnings = Vec::new();
    if valuation_curve.points.len() <= 1 {
        warnings.push("No valuation differing from the reference price has been reported".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Valuation curve: 3-month grid, 45-day match window, carry-forward",
        &assumptions(config, Some(property_id), as_of),
        warnings,
        elapsed,
        valuation_curve,
    ))
}

/// Returns summary (yields, appreciation, total return, IRR) for a property.
pub fn summary_report(
    snapshot: &PortfolioSnapshot,
    config: &EngineConfig,
    property_id: &str,
    as_of: NaiveDate,
) -> ReturnsResult<ComputationOutput<ReturnsSummary>> {
    let start = Instant::now();
    config.validate()?;
    let records = snapshot.property(property_id)?;

    let summary = summary::summarize(&records, config, as_of);
    let warnings = summary_warnings(&summary);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Per-share returns against the reference price: yields, appreciation, XIRR (actual/365)",
        &assumptions(config, Some(property_id), as_of),
        warnings,
        elapsed,
        summary,
    ))
}

/// Grid, series, curve and summary for one property in a single pass.
pub fn analyze_property(
    snapshot: &PortfolioSnapshot,
    config: &EngineConfig,
    property_id: &str,
    as_of: NaiveDate,
) -> ReturnsResult<ComputationOutput<PropertyAnalysis>> {
    let start = Instant::now();
    config.validate()?;
    let records = snapshot.property(property_id)?;

    let smoothed = smoothing::smooth_dividends(&records, config.cutover_year, as_of);
    let analysis = PropertyAnalysis {
        payment_grid: payment_status::payment_grid(&records, &config.exclusions, as_of),
        monthly_series: yields::monthly_yield_series(&smoothed, config.reference_price),
        valuation_curve: curve::build_curve(&records, config.reference_price, as_of),
        summary: summary::summarize(&records, config, as_of),
    };
    let warnings = summary_warnings(&analysis.summary);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Full property analysis: calendar, smoothed series, valuation curve, returns",
        &assumptions(config, Some(property_id), as_of),
        warnings,
        elapsed,
        analysis,
    ))
}

/// Returns summary for every property in the snapshot, sorted by id.
pub fn compare_properties(
    snapshot: &PortfolioSnapshot,
    config: &EngineConfig,
    as_of: NaiveDate,
) -> ReturnsResult<ComputationOutput<Vec<ReturnsSummary>>> {
    let start = Instant::now();
    config.validate()?;

    let mut warnings = Vec::new();
    let mut summaries = Vec::new();
    for id in snapshot.property_ids() {
        match snapshot.property(&id) {
            Ok(records) => {
                let s = summary::summarize(&records, config, as_of);
                warnings.extend(summary_warnings(&s));
                summaries.push(s);
            }
            Err(e) => {
                tracing::warn!(property = %id, error = %e, "skipping property");
                warnings.push(format!("{id}: skipped ({e})"));
            }
        }
    }

    tracing::info!(properties = summaries.len(), "compared properties");

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Cross-property returns comparison against the reference price",
        &assumptions(config, None, as_of),
        warnings,
        elapsed,
        summaries,
    ))
}

/// IRR of an arbitrary dated cash-flow series, first flow as the base date.
pub fn dated_irr(flows: &[CashFlow]) -> ReturnsResult<ComputationOutput<IrrOutput>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let irr_metric = irr::solve_irr(flows);
    if let Some(reason) = irr_metric.reason() {
        warnings.push(format!("irr unavailable ({reason})"));
    }

    let output = IrrOutput {
        irr: irr_metric,
        irr_percent: irr_metric.map(|r| r * dec!(100)),
        cash_flow_count: flows.len(),
        net_cash_flow: flows.iter().map(|cf| cf.amount).sum(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "XIRR: Newton-Raphson on actual/365 year fractions",
        &serde_json::json!({ "guess": crate::time_value::DEFAULT_IRR_GUESS.to_string() }),
        warnings,
        elapsed,
        output,
    ))
}
