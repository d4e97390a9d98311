//! Liquidity stress scenarios.
//!
//! Each scenario shocks portfolio value and scales the next-twelve-month
//! call and distribution totals, then re-measures the gap and coverage
//! against the recommended reserve. Scenarios are independent pure
//! functions of the already computed totals.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use std::borrow::Cow;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::defaults::{BASE_CASE, DEFAULT_SCENARIOS};
use crate::forecast::coverage_ratio;
use crate::types::{Money, Ratio};

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// A fully specified scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub name: Cow<'static, str>,
    /// Fractional change in portfolio value (-0.15 = -15%).
    pub nav_shock: Decimal,
    pub call_multiplier: Decimal,
    pub distribution_multiplier: Decimal,
}

/// A caller-supplied scenario; missing fields come from the Base Case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioInput {
    #[serde(
        deserialize_with = "crate::types::lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        deserialize_with = "crate::types::lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub nav_shock: Option<Decimal>,
    #[serde(
        deserialize_with = "crate::types::lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub call_multiplier: Option<Decimal>,
    #[serde(
        deserialize_with = "crate::types::lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub distribution_multiplier: Option<Decimal>,
}

impl ScenarioInput {
    /// Complete this input against the Base Case. `position` is 1-based and
    /// names unnamed scenarios.
    pub fn resolve(&self, position: usize) -> ScenarioConfig {
        let name = match self.name.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => Cow::Owned(n.to_string()),
            _ => Cow::Owned(format!("Scenario {}", position)),
        };
        ScenarioConfig {
            name,
            nav_shock: self.nav_shock.unwrap_or(BASE_CASE.nav_shock),
            call_multiplier: self.call_multiplier.unwrap_or(BASE_CASE.call_multiplier),
            distribution_multiplier: self
                .distribution_multiplier
                .unwrap_or(BASE_CASE.distribution_multiplier),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub nav_shock: Decimal,
    pub call_multiplier: Decimal,
    pub distribution_multiplier: Decimal,
    pub projected_nav: Money,
    /// projected_nav - current portfolio value
    pub nav_change: Money,
    pub projected_calls: Money,
    pub projected_distributions: Money,
    /// Calls not covered by distributions plus reserve, floored at zero.
    pub liquidity_gap: Money,
    pub coverage_ratio: Ratio,
}

/// Portfolio figures every scenario starts from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioBaseline {
    pub total_portfolio: Money,
    pub next_12m_calls: Money,
    pub next_12m_distributions: Money,
    pub recommended_reserve: Money,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Caller scenarios completed against the Base Case, or the default set when
/// none are supplied.
pub fn resolve_scenarios(inputs: Option<&[ScenarioInput]>) -> Vec<ScenarioConfig> {
    match inputs {
        Some(list) if !list.is_empty() => list
            .iter()
            .enumerate()
            .map(|(i, s)| s.resolve(i + 1))
            .collect(),
        _ => DEFAULT_SCENARIOS.to_vec(),
    }
}

/// Evaluate one scenario.
pub fn run_scenario(scenario: &ScenarioConfig, baseline: &ScenarioBaseline) -> ScenarioResult {
    let projected_nav = baseline
        .total_portfolio
        .saturating_mul(Decimal::ONE.saturating_add(scenario.nav_shock))
        .max(Decimal::ZERO);
    let projected_calls = baseline.next_12m_calls.saturating_mul(scenario.call_multiplier);
    let projected_distributions = baseline
        .next_12m_distributions
        .saturating_mul(scenario.distribution_multiplier);
    let resources = projected_distributions.saturating_add(baseline.recommended_reserve);

    ScenarioResult {
        name: scenario.name.to_string(),
        nav_shock: scenario.nav_shock,
        call_multiplier: scenario.call_multiplier,
        distribution_multiplier: scenario.distribution_multiplier,
        projected_nav,
        nav_change: projected_nav.saturating_sub(baseline.total_portfolio),
        projected_calls,
        projected_distributions,
        liquidity_gap: projected_calls.saturating_sub(resources).max(Decimal::ZERO),
        coverage_ratio: coverage_ratio(resources, projected_calls),
    }
}

/// Evaluate every scenario in order.
pub fn run_scenarios(scenarios: &[ScenarioConfig], baseline: &ScenarioBaseline) -> Vec<ScenarioResult> {
    let results: Vec<ScenarioResult> = scenarios
        .iter()
        .map(|s| run_scenario(s, baseline))
        .collect();
    tracing::debug!(scenarios = results.len(), "scenarios evaluated");
    results
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
