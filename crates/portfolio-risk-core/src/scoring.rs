//! Composite risk scoring.
//!
//! Four diagnostic sub-scores on a 0-100 scale (higher is riskier) and
//! their unweighted mean:
//!
//! - **Concentration** -- largest asset-class and manager shares, 70/30
//! - **Liquidity** -- coverage against the policy minimum
//! - **Performance** -- paid-in weighted TVPI against the acceptable floor
//! - **Policy** -- 15 points per breach
//!
//! Sub-scores are rounded to one decimal before averaging so `overall`
//! is always reproducible from the published components.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::defaults::{
    CONCENTRATION_ASSET_CLASS_WEIGHT, CONCENTRATION_MANAGER_WEIGHT, LIQUIDITY_SCORE_AT_MINIMUM,
    LIQUIDITY_SCORE_BELOW_MINIMUM, LIQUIDITY_SHORTFALL_SLOPE, LIQUIDITY_SURPLUS_SLOPE,
    PERFORMANCE_SCORE_CEILING, PERFORMANCE_SCORE_ON_TARGET, PERFORMANCE_SHORTFALL_SLOPE,
    POLICY_POINTS_PER_BREACH, SCORE_CEILING,
};
use crate::arith::saturating_div;
use crate::exposure::ExposureBreakdown;
use crate::policy::PolicyConfig;
use crate::types::Ratio;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScores {
    pub concentration: Decimal,
    pub liquidity: Decimal,
    pub performance: Decimal,
    pub policy: Decimal,
    pub overall: Decimal,
}

/// Score a portfolio from its already-computed risk inputs.
pub fn compute_risk_scores(
    exposures: &ExposureBreakdown,
    liquidity_coverage: Ratio,
    weighted_tvpi: Option<Ratio>,
    breach_count: usize,
    policy: &PolicyConfig,
) -> RiskScores {
    let concentration = score(concentration_score(exposures));
    let liquidity = score(liquidity_score(
        liquidity_coverage,
        policy.min_liquidity_coverage,
    ));
    let performance = score(performance_score(
        weighted_tvpi,
        policy.min_acceptable_tvpi,
    ));
    let policy = score(policy_score(breach_count));

    let overall =
        round_one((concentration + liquidity + performance + policy) / Decimal::from(4u32));

    tracing::debug!(
        %concentration,
        %liquidity,
        %performance,
        %policy,
        %overall,
        "risk scores computed"
    );

    RiskScores {
        concentration,
        liquidity,
        performance,
        policy,
        overall,
    }
}

fn concentration_score(exposures: &ExposureBreakdown) -> Decimal {
    let asset_class = exposures
        .asset_class
        .top_percentage()
        .saturating_mul(CONCENTRATION_ASSET_CLASS_WEIGHT);
    let manager = exposures
        .manager
        .top_percentage()
        .saturating_mul(CONCENTRATION_MANAGER_WEIGHT);
    asset_class.saturating_add(manager)
}

fn liquidity_score(coverage: Ratio, minimum: Ratio) -> Decimal {
    if coverage >= minimum {
        let surplus = coverage.saturating_sub(minimum);
        LIQUIDITY_SCORE_AT_MINIMUM.saturating_sub(surplus.saturating_mul(LIQUIDITY_SURPLUS_SLOPE))
    } else {
        let shortfall = minimum.saturating_sub(coverage);
        LIQUIDITY_SCORE_BELOW_MINIMUM
            .saturating_add(shortfall.saturating_mul(LIQUIDITY_SHORTFALL_SLOPE))
    }
}

fn performance_score(tvpi: Option<Ratio>, target: Ratio) -> Decimal {
    match tvpi {
        Some(tvpi) if target > Decimal::ZERO && tvpi < target => {
            let shortfall = saturating_div(target.saturating_sub(tvpi), target);
            PERFORMANCE_SCORE_ON_TARGET
                .saturating_add(shortfall.saturating_mul(PERFORMANCE_SHORTFALL_SLOPE))
                .min(PERFORMANCE_SCORE_CEILING)
        }
        _ => PERFORMANCE_SCORE_ON_TARGET,
    }
}

fn policy_score(breach_count: usize) -> Decimal {
    Decimal::from(breach_count as u64).saturating_mul(POLICY_POINTS_PER_BREACH)
}

/// Clamp to [0, 100] and round to one decimal.
fn score(raw: Decimal) -> Decimal {
    round_one(raw.clamp(Decimal::ZERO, SCORE_CEILING))
}

fn round_one(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
