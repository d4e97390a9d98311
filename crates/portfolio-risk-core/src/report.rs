//! Risk report assembly.
//!
//! Runs the full pipeline over one request:
//!
//! 1. **Normalise** fund and direct holdings into comparable assets
//! 2. **Aggregate** exposures along the six dimensions
//! 3. **History** of the trailing eight quarters of cash flows
//! 4. **Forecast** of the next eight quarters and the liquidity summary
//! 5. **Policy** evaluation against the merged limits
//! 6. **Scores** and **scenarios** from the figures above
//!
//! The computation is total and deterministic: the same request and
//! `as_of` always produce an identical report.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::arith::{saturating_div, saturating_sum};
use crate::exposure::{aggregate_exposures, percentage_of, ExposureBreakdown};
use crate::forecast::{forecast_liquidity, DistributionBasis, LiquiditySchedulePoint, LiquiditySummary};
use crate::history::{build_history, RiskHistoryPoint};
use crate::normalizer::{normalize_holdings, AssetClassifier, KeywordAssetClassifier};
use crate::policy::{evaluate_policy, PolicyBreach, PolicyConfig, PolicyMetrics, PolicyOverrides};
use crate::scenarios::{resolve_scenarios, run_scenarios, ScenarioBaseline, ScenarioInput, ScenarioResult};
use crate::scoring::{compute_risk_scores, RiskScores};
use crate::types::{
    CapitalCallEvent, DirectHolding, DistributionEvent, FundHolding, Money, Percent, Ratio,
};
use crate::{PortfolioRiskError, PortfolioRiskResult};

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Everything one report is computed from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskReportInput {
    #[serde(default)]
    pub funds: Vec<FundHolding>,
    #[serde(default)]
    pub direct_investments: Vec<DirectHolding>,
    #[serde(default)]
    pub capital_calls: Vec<CapitalCallEvent>,
    #[serde(default)]
    pub distributions: Vec<DistributionEvent>,
    /// Partial policy, merged over the defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<PolicyOverrides>,
    /// Partial scenarios; the default set is used when absent or empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_configs: Option<Vec<ScenarioInput>>,
}

impl RiskReportInput {
    /// Decode a JSON request.
    pub fn from_json(json: &str) -> PortfolioRiskResult<Self> {
        if json.trim().is_empty() {
            return Err(PortfolioRiskError::InvalidInput {
                field: "request".into(),
                reason: "request body is empty".into(),
            });
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Policy limits in force for this request.
    pub fn effective_policy(&self) -> PolicyConfig {
        PolicyConfig::merged(self.policy.as_ref())
    }
}

/// Portfolio-wide aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    /// Fund NAV plus direct value, positive holdings only.
    pub total_portfolio: Money,
    pub total_fund_nav: Money,
    pub total_direct_value: Money,
    pub total_commitment: Money,
    pub total_paid_in: Money,
    pub unfunded_commitment: Money,
    /// Unfunded as a percentage of total commitment.
    pub unfunded_ratio: Percent,
    pub fund_count: usize,
    pub direct_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighted_tvpi: Option<Ratio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighted_dpi: Option<Ratio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighted_irr: Option<Decimal>,
    pub average_leverage: Ratio,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub as_of: NaiveDate,
    pub metrics: PortfolioMetrics,
    pub exposures: ExposureBreakdown,
    pub liquidity: LiquiditySummary,
    pub liquidity_schedule: Vec<LiquiditySchedulePoint>,
    pub scores: RiskScores,
    pub scenarios: Vec<ScenarioResult>,
    pub breaches: Vec<PolicyBreach>,
    pub history: Vec<RiskHistoryPoint>,
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Compute a report with the keyword asset-class classifier.
pub fn compute_risk_report(input: &RiskReportInput, as_of: NaiveDate) -> RiskReport {
    compute_risk_report_with(input, as_of, &KeywordAssetClassifier)
}

/// Compute a report with a caller-supplied asset-class classifier.
pub fn compute_risk_report_with(
    input: &RiskReportInput,
    as_of: NaiveDate,
    classifier: &dyn AssetClassifier,
) -> RiskReport {
    let policy = input.effective_policy();

    let assets = normalize_holdings(&input.funds, &input.direct_investments, classifier);
    let exposures = aggregate_exposures(&assets);

    let history = build_history(&input.capital_calls, &input.distributions, as_of);
    let forecast = forecast_liquidity(
        &input.funds,
        &input.capital_calls,
        &input.distributions,
        &history,
        policy.target_liquidity_buffer,
        as_of,
    );

    let metrics = portfolio_metrics(&input.funds, &input.direct_investments, exposures.asset_class.total);

    let breaches = evaluate_policy(
        &policy,
        &exposures,
        &input.funds,
        &PolicyMetrics {
            total_portfolio: metrics.total_portfolio,
            unfunded_ratio: metrics.unfunded_ratio,
            liquidity_coverage: forecast.summary.liquidity_coverage,
            average_leverage: metrics.average_leverage,
        },
    );

    let scores = compute_risk_scores(
        &exposures,
        forecast.summary.liquidity_coverage,
        metrics.weighted_tvpi,
        breaches.len(),
        &policy,
    );

    let scenario_configs = resolve_scenarios(input.scenario_configs.as_deref());
    let scenarios = run_scenarios(
        &scenario_configs,
        &ScenarioBaseline {
            total_portfolio: metrics.total_portfolio,
            next_12m_calls: forecast.summary.next_12m_calls,
            next_12m_distributions: forecast.summary.next_12m_distributions,
            recommended_reserve: forecast.summary.recommended_reserve,
        },
    );

    let mut warnings = Vec::new();
    if history.undated_events > 0 {
        warnings.push(format!(
            "{} cash-flow event(s) without a usable date were excluded from the history and forecast",
            history.undated_events
        ));
    }
    if forecast.estimated_call_quarters > 0 {
        warnings.push(format!(
            "Capital calls for {} quarter(s) were estimated from unscheduled commitment of {}",
            forecast.estimated_call_quarters,
            forecast.summary.unscheduled_calls.round_dp(2)
        ));
    }
    if forecast.estimated_distribution_quarters > 0 && !forecast.default_quarterly_distribution.is_zero() {
        let basis = match forecast.distribution_basis {
            DistributionBasis::HistoricalAverage => "the historical quarterly average",
            DistributionBasis::NavFallback => "2% of fund NAV per quarter",
        };
        warnings.push(format!(
            "Distributions for {} quarter(s) were estimated from {}",
            forecast.estimated_distribution_quarters, basis
        ));
    }

    tracing::debug!(
        %as_of,
        funds = metrics.fund_count,
        directs = metrics.direct_count,
        total = %metrics.total_portfolio,
        breaches = breaches.len(),
        overall = %scores.overall,
        "risk report computed"
    );

    RiskReport {
        as_of,
        metrics,
        exposures,
        liquidity: forecast.summary,
        liquidity_schedule: forecast.schedule,
        scores,
        scenarios,
        breaches,
        history: history.points,
        warnings,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn portfolio_metrics(
    funds: &[FundHolding],
    directs: &[DirectHolding],
    total_portfolio: Money,
) -> PortfolioMetrics {
    let positive = |v: Decimal| v.max(Decimal::ZERO);

    let total_fund_nav = saturating_sum(funds.iter().map(|f| positive(f.nav)));
    let total_direct_value = saturating_sum(directs.iter().map(|d| positive(d.value())));
    let total_commitment = saturating_sum(funds.iter().map(|f| positive(f.commitment)));
    let total_paid_in = saturating_sum(funds.iter().map(|f| positive(f.paid_in)));
    let unfunded_commitment = saturating_sum(funds.iter().map(FundHolding::unfunded));

    let leverages: Vec<Decimal> = funds.iter().filter_map(|f| f.leverage).collect();
    let average_leverage = mean(&leverages).unwrap_or(Decimal::ZERO);

    PortfolioMetrics {
        total_portfolio,
        total_fund_nav,
        total_direct_value,
        total_commitment,
        total_paid_in,
        unfunded_commitment,
        unfunded_ratio: percentage_of(unfunded_commitment, total_commitment),
        fund_count: funds.len(),
        direct_count: directs.len(),
        weighted_tvpi: paid_in_weighted(funds, |f| f.tvpi),
        weighted_dpi: paid_in_weighted(funds, |f| f.dpi),
        weighted_irr: paid_in_weighted(funds, |f| f.irr),
        average_leverage,
    }
}

/// Paid-in weighted mean over funds reporting the metric. Falls back to the
/// plain mean when none of them has positive paid-in.
fn paid_in_weighted<F>(funds: &[FundHolding], metric: F) -> Option<Decimal>
where
    F: Fn(&FundHolding) -> Option<Decimal>,
{
    let reporting: Vec<(Decimal, Decimal)> = funds
        .iter()
        .filter_map(|f| metric(f).map(|m| (m, f.paid_in.max(Decimal::ZERO))))
        .collect();
    if reporting.is_empty() {
        return None;
    }

    let weight = saturating_sum(reporting.iter().map(|(_, w)| *w));
    if weight.is_zero() {
        let values: Vec<Decimal> = reporting.iter().map(|(m, _)| *m).collect();
        return mean(&values);
    }
    let weighted = saturating_sum(reporting.iter().map(|(m, w)| m.saturating_mul(*w)));
    Some(saturating_div(weighted, weight))
}

fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        None
    } else {
        let total = saturating_sum(values.iter().copied());
        Some(total / Decimal::from(values.len() as u64))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
