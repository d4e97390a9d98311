//! Investment-policy limits and breach detection.
//!
//! Covers:
//! 1. **Configuration** -- a complete threshold set, with caller overrides
//!    merged field by field over [`DEFAULT_POLICY`]
//! 2. **Concentration limits** -- every entry of the six exposure dimensions
//!    and every single fund, against maximum percentages
//! 3. **Liquidity limits** -- unfunded commitment ratio (maximum) and
//!    liquidity coverage (minimum)
//! 4. **Leverage limit** -- average fund leverage (maximum)
//! 5. **Severity grading** -- by how far the value overshoots its limit
//!
//! A breach is recorded only on strict exceedance (strict shortfall for
//! minimum limits). Nothing here fails; a compliant portfolio yields an
//! empty list.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::defaults::{DEFAULT_POLICY, SEVERITY_HIGH_CEILING, SEVERITY_MEDIUM_CEILING};
use crate::exposure::{percentage_of, Dimension, ExposureBreakdown};
use crate::types::{FundHolding, Percent, Ratio};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Complete policy threshold set. Percent limits are whole numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub max_single_fund_exposure: Percent,
    pub max_asset_class_exposure: Percent,
    pub max_geography_exposure: Percent,
    pub max_manager_exposure: Percent,
    pub max_vintage_exposure: Percent,
    pub max_currency_exposure: Percent,
    pub max_sector_exposure: Percent,
    /// Unfunded commitment as a percentage of total commitment.
    pub max_unfunded_commitment_ratio: Percent,
    pub min_liquidity_coverage: Ratio,
    pub max_portfolio_leverage: Ratio,
    pub min_acceptable_tvpi: Ratio,
    /// Reserve held against commitments, as a fraction (0.10 = 10%).
    pub target_liquidity_buffer: Decimal,
    pub concentration_alerts: bool,
    pub liquidity_alerts: bool,
    pub leverage_alerts: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        DEFAULT_POLICY
    }
}

/// Caller-supplied partial policy. Malformed values decode as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyOverrides {
    #[serde(
        deserialize_with = "crate::types::lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_single_fund_exposure: Option<Percent>,
    #[serde(
        deserialize_with = "crate::types::lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_asset_class_exposure: Option<Percent>,
    #[serde(
        deserialize_with = "crate::types::lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_geography_exposure: Option<Percent>,
    #[serde(
        deserialize_with = "crate::types::lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_manager_exposure: Option<Percent>,
    #[serde(
        deserialize_with = "crate::types::lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_vintage_exposure: Option<Percent>,
    #[serde(
        deserialize_with = "crate::types::lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_currency_exposure: Option<Percent>,
    #[serde(
        deserialize_with = "crate::types::lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_sector_exposure: Option<Percent>,
    #[serde(
        deserialize_with = "crate::types::lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_unfunded_commitment_ratio: Option<Percent>,
    #[serde(
        deserialize_with = "crate::types::lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_liquidity_coverage: Option<Ratio>,
    #[serde(
        deserialize_with = "crate::types::lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_portfolio_leverage: Option<Ratio>,
    #[serde(
        deserialize_with = "crate::types::lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_acceptable_tvpi: Option<Ratio>,
    #[serde(
        deserialize_with = "crate::types::lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_liquidity_buffer: Option<Decimal>,
    #[serde(
        deserialize_with = "crate::types::lenient_opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub concentration_alerts: Option<bool>,
    #[serde(
        deserialize_with = "crate::types::lenient_opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub liquidity_alerts: Option<bool>,
    #[serde(
        deserialize_with = "crate::types::lenient_opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub leverage_alerts: Option<bool>,
}

impl PolicyOverrides {
    /// Fields set in `top` win; everything else comes from `self`.
    pub fn layered_with(&self, top: &PolicyOverrides) -> PolicyOverrides {
        PolicyOverrides {
            max_single_fund_exposure: top
                .max_single_fund_exposure
                .or(self.max_single_fund_exposure),
            max_asset_class_exposure: top
                .max_asset_class_exposure
                .or(self.max_asset_class_exposure),
            max_geography_exposure: top.max_geography_exposure.or(self.max_geography_exposure),
            max_manager_exposure: top.max_manager_exposure.or(self.max_manager_exposure),
            max_vintage_exposure: top.max_vintage_exposure.or(self.max_vintage_exposure),
            max_currency_exposure: top.max_currency_exposure.or(self.max_currency_exposure),
            max_sector_exposure: top.max_sector_exposure.or(self.max_sector_exposure),
            max_unfunded_commitment_ratio: top
                .max_unfunded_commitment_ratio
                .or(self.max_unfunded_commitment_ratio),
            min_liquidity_coverage: top.min_liquidity_coverage.or(self.min_liquidity_coverage),
            max_portfolio_leverage: top.max_portfolio_leverage.or(self.max_portfolio_leverage),
            min_acceptable_tvpi: top.min_acceptable_tvpi.or(self.min_acceptable_tvpi),
            target_liquidity_buffer: top
                .target_liquidity_buffer
                .or(self.target_liquidity_buffer),
            concentration_alerts: top.concentration_alerts.or(self.concentration_alerts),
            liquidity_alerts: top.liquidity_alerts.or(self.liquidity_alerts),
            leverage_alerts: top.leverage_alerts.or(self.leverage_alerts),
        }
    }
}

impl PolicyConfig {
    /// Apply overrides on top of [`DEFAULT_POLICY`].
    pub fn merged(overrides: Option<&PolicyOverrides>) -> PolicyConfig {
        let d = DEFAULT_POLICY;
        let Some(o) = overrides else {
            return d;
        };
        PolicyConfig {
            max_single_fund_exposure: o
                .max_single_fund_exposure
                .unwrap_or(d.max_single_fund_exposure),
            max_asset_class_exposure: o
                .max_asset_class_exposure
                .unwrap_or(d.max_asset_class_exposure),
            max_geography_exposure: o.max_geography_exposure.unwrap_or(d.max_geography_exposure),
            max_manager_exposure: o.max_manager_exposure.unwrap_or(d.max_manager_exposure),
            max_vintage_exposure: o.max_vintage_exposure.unwrap_or(d.max_vintage_exposure),
            max_currency_exposure: o.max_currency_exposure.unwrap_or(d.max_currency_exposure),
            max_sector_exposure: o.max_sector_exposure.unwrap_or(d.max_sector_exposure),
            max_unfunded_commitment_ratio: o
                .max_unfunded_commitment_ratio
                .unwrap_or(d.max_unfunded_commitment_ratio),
            min_liquidity_coverage: o.min_liquidity_coverage.unwrap_or(d.min_liquidity_coverage),
            max_portfolio_leverage: o.max_portfolio_leverage.unwrap_or(d.max_portfolio_leverage),
            min_acceptable_tvpi: o.min_acceptable_tvpi.unwrap_or(d.min_acceptable_tvpi),
            target_liquidity_buffer: o
                .target_liquidity_buffer
                .unwrap_or(d.target_liquidity_buffer),
            concentration_alerts: o.concentration_alerts.unwrap_or(d.concentration_alerts),
            liquidity_alerts: o.liquidity_alerts.unwrap_or(d.liquidity_alerts),
            leverage_alerts: o.leverage_alerts.unwrap_or(d.leverage_alerts),
        }
    }

    /// Maximum percentage for an exposure dimension.
    pub fn exposure_limit(&self, dimension: Dimension) -> Percent {
        match dimension {
            Dimension::AssetClass => self.max_asset_class_exposure,
            Dimension::Geography => self.max_geography_exposure,
            Dimension::Manager => self.max_manager_exposure,
            Dimension::Vintage => self.max_vintage_exposure,
            Dimension::Currency => self.max_currency_exposure,
            Dimension::Sector => self.max_sector_exposure,
        }
    }
}

// ---------------------------------------------------------------------------
// Breaches
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreachDimension {
    AssetClass,
    Geography,
    Manager,
    Vintage,
    Currency,
    Sector,
    SingleFund,
    UnfundedCommitment,
    LiquidityCoverage,
    Leverage,
}

impl From<Dimension> for BreachDimension {
    fn from(d: Dimension) -> Self {
        match d {
            Dimension::AssetClass => BreachDimension::AssetClass,
            Dimension::Geography => BreachDimension::Geography,
            Dimension::Manager => BreachDimension::Manager,
            Dimension::Vintage => BreachDimension::Vintage,
            Dimension::Currency => BreachDimension::Currency,
            Dimension::Sector => BreachDimension::Sector,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreachSeverity {
    Medium,
    High,
    Critical,
}

impl fmt::Display for BreachSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreachSeverity::Medium => write!(f, "MEDIUM"),
            BreachSeverity::High => write!(f, "HIGH"),
            BreachSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Whether a limit caps a value from above or floors it from below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    Maximum,
    Minimum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyBreach {
    pub dimension: BreachDimension,
    /// What breached: a manager, a geography, a fund, or the portfolio.
    pub label: String,
    pub current: Decimal,
    pub limit: Decimal,
    pub severity: BreachSeverity,
    pub message: String,
}

/// Portfolio-level figures the evaluator checks besides exposures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyMetrics {
    pub total_portfolio: Decimal,
    /// Percent of total commitment.
    pub unfunded_ratio: Percent,
    pub liquidity_coverage: Ratio,
    pub average_leverage: Ratio,
}

/// Grade a value against its limit; `None` when within the limit.
///
/// The excess ratio is `current / limit` for maxima and `limit / current`
/// for minima. A limit (or, for minima, a current value) at or below zero
/// leaves no meaningful ratio, so any strict breach of it is CRITICAL, as is
/// a ratio too large to represent.
pub fn grade_breach(current: Decimal, limit: Decimal, kind: LimitKind) -> Option<BreachSeverity> {
    let ratio = match kind {
        LimitKind::Maximum => {
            if current <= limit {
                return None;
            }
            if limit <= Decimal::ZERO {
                return Some(BreachSeverity::Critical);
            }
            current.checked_div(limit)
        }
        LimitKind::Minimum => {
            if current >= limit {
                return None;
            }
            if current <= Decimal::ZERO {
                return Some(BreachSeverity::Critical);
            }
            limit.checked_div(current)
        }
    };
    Some(ratio.map_or(BreachSeverity::Critical, severity_for_ratio))
}

fn severity_for_ratio(ratio: Decimal) -> BreachSeverity {
    if ratio <= SEVERITY_MEDIUM_CEILING {
        BreachSeverity::Medium
    } else if ratio <= SEVERITY_HIGH_CEILING {
        BreachSeverity::High
    } else {
        BreachSeverity::Critical
    }
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Check every configured limit. Order: the six exposure dimensions, single
/// funds (input order), unfunded ratio, liquidity coverage, leverage.
pub fn evaluate_policy(
    policy: &PolicyConfig,
    exposures: &ExposureBreakdown,
    funds: &[FundHolding],
    metrics: &PolicyMetrics,
) -> Vec<PolicyBreach> {
    let mut breaches = Vec::new();

    if policy.concentration_alerts {
        for exposure in exposures.iter() {
            let limit = policy.exposure_limit(exposure.dimension);
            for entry in &exposure.entries {
                if let Some(severity) = grade_breach(entry.percentage, limit, LimitKind::Maximum) {
                    breaches.push(PolicyBreach {
                        dimension: exposure.dimension.into(),
                        label: entry.name.clone(),
                        current: entry.percentage,
                        limit,
                        severity,
                        message: format!(
                            "{} exposure to {} is {}% against a limit of {}%",
                            exposure.dimension,
                            entry.name,
                            entry.percentage.round_dp(1),
                            limit.round_dp(1)
                        ),
                    });
                }
            }
        }

        let limit = policy.max_single_fund_exposure;
        for fund in funds.iter().filter(|f| f.nav > Decimal::ZERO) {
            let share = percentage_of(fund.nav, metrics.total_portfolio);
            if let Some(severity) = grade_breach(share, limit, LimitKind::Maximum) {
                let label = if fund.name.trim().is_empty() {
                    fund.id.clone()
                } else {
                    fund.name.clone()
                };
                breaches.push(PolicyBreach {
                    dimension: BreachDimension::SingleFund,
                    message: format!(
                        "Fund {} is {}% of the portfolio against a limit of {}%",
                        label,
                        share.round_dp(1),
                        limit.round_dp(1)
                    ),
                    label,
                    current: share,
                    limit,
                    severity,
                });
            }
        }
    }

    if policy.liquidity_alerts {
        let limit = policy.max_unfunded_commitment_ratio;
        if let Some(severity) = grade_breach(metrics.unfunded_ratio, limit, LimitKind::Maximum) {
            breaches.push(PolicyBreach {
                dimension: BreachDimension::UnfundedCommitment,
                label: "Portfolio".into(),
                current: metrics.unfunded_ratio,
                limit,
                severity,
                message: format!(
                    "Unfunded commitments are {}% of total commitment against a limit of {}%",
                    metrics.unfunded_ratio.round_dp(1),
                    limit.round_dp(1)
                ),
            });
        }

        let limit = policy.min_liquidity_coverage;
        if let Some(severity) = grade_breach(metrics.liquidity_coverage, limit, LimitKind::Minimum)
        {
            breaches.push(PolicyBreach {
                dimension: BreachDimension::LiquidityCoverage,
                label: "Portfolio".into(),
                current: metrics.liquidity_coverage,
                limit,
                severity,
                message: format!(
                    "Liquidity coverage of {}x is below the minimum of {}x",
                    metrics.liquidity_coverage.round_dp(2),
                    limit.round_dp(2)
                ),
            });
        }
    }

    if policy.leverage_alerts {
        let limit = policy.max_portfolio_leverage;
        if let Some(severity) = grade_breach(metrics.average_leverage, limit, LimitKind::Maximum) {
            breaches.push(PolicyBreach {
                dimension: BreachDimension::Leverage,
                label: "Portfolio".into(),
                current: metrics.average_leverage,
                limit,
                severity,
                message: format!(
                    "Average portfolio leverage of {}x exceeds the limit of {}x",
                    metrics.average_leverage.round_dp(2),
                    limit.round_dp(2)
                ),
            });
        }
    }

    tracing::debug!(breaches = breaches.len(), "policy evaluated");
    breaches
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposure::aggregate_exposures;
    use crate::normalizer::{normalize_holdings, KeywordAssetClassifier};
    use rust_decimal_macros::dec;

    fn quiet_metrics(total: Decimal) -> PolicyMetrics {
        PolicyMetrics {
            total_portfolio: total,
            unfunded_ratio: Decimal::ZERO,
            liquidity_coverage: dec!(5),
            average_leverage: Decimal::ZERO,
        }
    }

    fn fund(id: &str, nav: Decimal, domicile: &str, manager: &str) -> FundHolding {
        FundHolding {
            id: id.into(),
            name: format!("Fund {}", id),
            manager: Some(manager.into()),
            domicile: Some(domicile.into()),
            commitment: nav,
            paid_in: nav,
            nav,
            ..Default::default()
        }
    }

    fn evaluate(policy: &PolicyConfig, funds: &[FundHolding]) -> Vec<PolicyBreach> {
        let assets = normalize_holdings(funds, &[], &KeywordAssetClassifier);
        let exposures = aggregate_exposures(&assets);
        let total = exposures.asset_class.total;
        evaluate_policy(policy, &exposures, funds, &quiet_metrics(total))
    }

    #[test]
    fn test_grade_tiers() {
        let l = dec!(20);
        assert_eq!(grade_breach(dec!(20), l, LimitKind::Maximum), None);
        assert_eq!(grade_breach(dec!(20.01), l, LimitKind::Maximum), Some(BreachSeverity::Medium));
        assert_eq!(grade_breach(dec!(24), l, LimitKind::Maximum), Some(BreachSeverity::Medium));
        assert_eq!(grade_breach(dec!(24.01), l, LimitKind::Maximum), Some(BreachSeverity::High));
        assert_eq!(grade_breach(dec!(28), l, LimitKind::Maximum), Some(BreachSeverity::High));
        assert_eq!(grade_breach(dec!(28.01), l, LimitKind::Maximum), Some(BreachSeverity::Critical));
        assert_eq!(grade_breach(dec!(100), l, LimitKind::Maximum), Some(BreachSeverity::Critical));
    }

    #[test]
    fn test_grade_minimum_inverted() {
        let l = dec!(1.2);
        assert_eq!(grade_breach(dec!(1.2), l, LimitKind::Minimum), None);
        assert_eq!(grade_breach(dec!(5), l, LimitKind::Minimum), None);
        assert_eq!(grade_breach(dec!(1.1), l, LimitKind::Minimum), Some(BreachSeverity::Medium));
        assert_eq!(grade_breach(dec!(0.9), l, LimitKind::Minimum), Some(BreachSeverity::High));
        assert_eq!(grade_breach(dec!(0.5), l, LimitKind::Minimum), Some(BreachSeverity::Critical));
        assert_eq!(grade_breach(Decimal::ZERO, l, LimitKind::Minimum), Some(BreachSeverity::Critical));
    }

    #[test]
    fn test_grade_non_positive_limit() {
        assert_eq!(
            grade_breach(dec!(0.1), Decimal::ZERO, LimitKind::Maximum),
            Some(BreachSeverity::Critical)
        );
        assert_eq!(grade_breach(Decimal::ZERO, Decimal::ZERO, LimitKind::Maximum), None);
    }

    #[test]
    fn test_grade_unrepresentable_ratio_is_critical() {
        let tiny = dec!(0.0000000000000000000000000001);
        assert_eq!(
            grade_breach(dec!(100), tiny, LimitKind::Maximum),
            Some(BreachSeverity::Critical)
        );
        assert_eq!(
            grade_breach(tiny, Decimal::MAX, LimitKind::Minimum),
            Some(BreachSeverity::Critical)
        );
    }

    #[test]
    fn test_tiny_manager_limit_flags_every_manager() {
        let funds = vec![
            fund("a", dec!(700_000), "Luxembourg", "Acme"),
            fund("b", dec!(800_000), "Ireland", "Beta"),
        ];
        let policy = PolicyConfig {
            max_manager_exposure: dec!(0.0000000000000000000000000001),
            ..DEFAULT_POLICY
        };
        let managers: Vec<PolicyBreach> = evaluate(&policy, &funds)
            .into_iter()
            .filter(|b| b.dimension == BreachDimension::Manager)
            .collect();
        assert_eq!(managers.len(), 2);
        assert!(managers.iter().all(|b| b.severity == BreachSeverity::Critical));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(BreachSeverity::Medium < BreachSeverity::High);
        assert!(BreachSeverity::High < BreachSeverity::Critical);
    }

    #[test]
    fn test_merge_fills_missing_fields() {
        let o = PolicyOverrides {
            max_manager_exposure: Some(dec!(35)),
            leverage_alerts: Some(false),
            ..Default::default()
        };
        let p = PolicyConfig::merged(Some(&o));
        assert_eq!(p.max_manager_exposure, dec!(35));
        assert!(!p.leverage_alerts);
        assert_eq!(p.max_geography_exposure, DEFAULT_POLICY.max_geography_exposure);
        assert_eq!(PolicyConfig::merged(None), DEFAULT_POLICY);
    }

    #[test]
    fn test_overrides_decode_leniently() {
        let o: PolicyOverrides = serde_json::from_str(
            r#"{"max_manager_exposure":"30","max_geography_exposure":"lots","liquidity_alerts":"false"}"#,
        )
        .unwrap();
        assert_eq!(o.max_manager_exposure, Some(dec!(30)));
        assert_eq!(o.max_geography_exposure, None);
        assert_eq!(o.liquidity_alerts, Some(false));
    }

    #[test]
    fn test_layering_prefers_top() {
        let base = PolicyOverrides {
            max_manager_exposure: Some(dec!(30)),
            max_sector_exposure: Some(dec!(45)),
            ..Default::default()
        };
        let top = PolicyOverrides {
            max_manager_exposure: Some(dec!(25)),
            ..Default::default()
        };
        let merged = base.layered_with(&top);
        assert_eq!(merged.max_manager_exposure, Some(dec!(25)));
        assert_eq!(merged.max_sector_exposure, Some(dec!(45)));
    }

    #[test]
    fn test_manager_concentration_breach() {
        let funds = vec![
            fund("a", dec!(700_000), "Luxembourg", "Acme"),
            fund("b", dec!(800_000), "Ireland", "Acme"),
        ];
        let breaches = evaluate(&DEFAULT_POLICY, &funds);
        let manager = breaches
            .iter()
            .find(|b| b.dimension == BreachDimension::Manager)
            .unwrap();
        assert_eq!(manager.label, "Acme");
        assert_eq!(manager.current, dec!(100));
        assert_eq!(manager.severity, BreachSeverity::Critical);
        assert!(manager.message.contains("Acme"));
    }

    #[test]
    fn test_no_breach_at_exact_limit() {
        let policy = PolicyConfig {
            max_manager_exposure: dec!(50),
            max_geography_exposure: dec!(100),
            max_single_fund_exposure: dec!(100),
            ..DEFAULT_POLICY
        };
        let funds = vec![
            fund("a", dec!(100), "X", "M1"),
            fund("b", dec!(100), "Y", "M2"),
        ];
        let breaches = evaluate(&policy, &funds);
        assert!(breaches
            .iter()
            .all(|b| b.dimension != BreachDimension::Manager));
    }

    #[test]
    fn test_single_fund_breach() {
        let funds = vec![
            fund("a", dec!(30), "X", "M1"),
            fund("b", dec!(10), "Y", "M2"),
            fund("c", dec!(10), "Z", "M3"),
            fund("d", dec!(10), "W", "M4"),
            fund("e", dec!(40), "V", "M5"),
        ];
        let policy = PolicyConfig {
            concentration_alerts: true,
            ..DEFAULT_POLICY
        };
        let breaches = evaluate(&policy, &funds);
        let singles: Vec<&PolicyBreach> = breaches
            .iter()
            .filter(|b| b.dimension == BreachDimension::SingleFund)
            .collect();
        // 30% -> 1.2x (MEDIUM), 40% -> 1.6x (CRITICAL)
        assert_eq!(singles.len(), 2);
        assert_eq!(singles[0].label, "Fund a");
        assert_eq!(singles[0].severity, BreachSeverity::Medium);
        assert_eq!(singles[1].label, "Fund e");
        assert_eq!(singles[1].severity, BreachSeverity::Critical);
    }

    #[test]
    fn test_concentration_toggle_off() {
        let policy = PolicyConfig {
            concentration_alerts: false,
            ..DEFAULT_POLICY
        };
        let funds = vec![fund("a", dec!(100), "X", "M")];
        assert!(evaluate(&policy, &funds).is_empty());
    }

    #[test]
    fn test_liquidity_and_leverage_checks() {
        let exposures = aggregate_exposures(&[]);
        let metrics = PolicyMetrics {
            total_portfolio: Decimal::ZERO,
            unfunded_ratio: dec!(75),
            liquidity_coverage: dec!(0.8),
            average_leverage: dec!(2.5),
        };
        let breaches = evaluate_policy(&DEFAULT_POLICY, &exposures, &[], &metrics);
        let dims: Vec<BreachDimension> = breaches.iter().map(|b| b.dimension).collect();
        assert_eq!(
            dims,
            vec![
                BreachDimension::UnfundedCommitment,
                BreachDimension::LiquidityCoverage,
                BreachDimension::Leverage
            ]
        );
        // 75 / 60 = 1.25 -> HIGH; 1.2 / 0.8 = 1.5 -> CRITICAL; 2.5 / 2 = 1.25 -> HIGH
        assert_eq!(breaches[0].severity, BreachSeverity::High);
        assert_eq!(breaches[1].severity, BreachSeverity::Critical);
        assert_eq!(breaches[2].severity, BreachSeverity::High);
    }

    #[test]
    fn test_liquidity_toggle_off() {
        let policy = PolicyConfig {
            liquidity_alerts: false,
            ..DEFAULT_POLICY
        };
        let metrics = PolicyMetrics {
            total_portfolio: Decimal::ZERO,
            unfunded_ratio: dec!(99),
            liquidity_coverage: Decimal::ZERO,
            average_leverage: Decimal::ZERO,
        };
        let breaches = evaluate_policy(&policy, &aggregate_exposures(&[]), &[], &metrics);
        assert!(breaches.is_empty());
    }
}
