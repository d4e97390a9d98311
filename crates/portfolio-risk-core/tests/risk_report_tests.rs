use chrono::NaiveDate;
use portfolio_risk_core::defaults::COVERAGE_SENTINEL;
use portfolio_risk_core::normalizer::AssetClassifier;
use portfolio_risk_core::policy::{BreachDimension, BreachSeverity, PolicyOverrides};
use portfolio_risk_core::scenarios::ScenarioInput;
use portfolio_risk_core::{
    compute_risk_report, compute_risk_report_with, CapitalCallEvent, DirectHolding,
    DistributionEvent, FundHolding, RiskReportInput,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

// ===========================================================================
// End-to-end risk report tests
// ===========================================================================

fn approx_eq(a: Decimal, b: Decimal, eps: Decimal) -> bool {
    (a - b).abs() < eps
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn as_of() -> NaiveDate {
    d(2025, 1, 15)
}

fn two_fund_input() -> RiskReportInput {
    RiskReportInput {
        funds: vec![
            FundHolding {
                id: "fund-a".into(),
                name: "Fund A".into(),
                manager: Some("Acme".into()),
                domicile: Some("Luxembourg".into()),
                commitment: dec!(1_000_000),
                paid_in: dec!(600_000),
                nav: dec!(700_000),
                ..Default::default()
            },
            FundHolding {
                id: "fund-b".into(),
                name: "Fund B".into(),
                manager: Some("Acme".into()),
                domicile: Some("Ireland".into()),
                commitment: dec!(500_000),
                paid_in: dec!(500_000),
                nav: dec!(800_000),
                ..Default::default()
            },
        ],
        ..Default::default()
    }
}

fn mixed_input() -> RiskReportInput {
    RiskReportInput {
        funds: vec![
            FundHolding {
                id: "f1".into(),
                name: "Northwind Buyout IV".into(),
                manager: Some("Northwind".into()),
                domicile: Some("Delaware".into()),
                commitment: dec!(2_000_000),
                paid_in: dec!(1_200_000),
                nav: dec!(1_500_000),
                vintage: Some(2019),
                strategy: Some("Mid-market buyout".into()),
                base_currency: Some("USD".into()),
                leverage: Some(dec!(1.8)),
                tvpi: Some(dec!(1.35)),
                dpi: Some(dec!(0.4)),
                ..Default::default()
            },
            FundHolding {
                id: "f2".into(),
                name: "Harbor Credit Opportunities".into(),
                manager: Some("Harbor".into()),
                domicile: Some("Luxembourg".into()),
                commitment: dec!(1_000_000),
                paid_in: dec!(900_000),
                nav: dec!(950_000),
                vintage: Some(2021),
                base_currency: Some("EUR".into()),
                tvpi: Some(dec!(1.1)),
                ..Default::default()
            },
        ],
        direct_investments: vec![DirectHolding {
            id: "d1".into(),
            name: "Co-invest Alpha".into(),
            current_value: Some(dec!(400_000)),
            geography: Some("United Kingdom".into()),
            currency: Some("GBP".into()),
            sector: Some("Healthcare".into()),
            ..Default::default()
        }],
        capital_calls: vec![
            CapitalCallEvent {
                fund_id: "f1".into(),
                amount: dec!(200_000),
                due_date: Some(d(2024, 3, 10)),
                ..Default::default()
            },
            CapitalCallEvent {
                fund_id: "f2".into(),
                amount: dec!(100_000),
                due_date: Some(d(2024, 10, 5)),
                ..Default::default()
            },
            CapitalCallEvent {
                fund_id: "f1".into(),
                amount: dec!(150_000),
                due_date: Some(d(2025, 2, 20)),
                ..Default::default()
            },
        ],
        distributions: vec![
            DistributionEvent {
                fund_id: "f1".into(),
                amount: dec!(80_000),
                distribution_date: Some(d(2024, 6, 30)),
            },
            DistributionEvent {
                fund_id: "f2".into(),
                amount: dec!(40_000),
                distribution_date: Some(d(2024, 12, 15)),
            },
        ],
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Two-fund example
// ---------------------------------------------------------------------------

#[test]
fn test_two_fund_geography_split() {
    let report = compute_risk_report(&two_fund_input(), as_of());
    let geo = &report.exposures.geography;
    assert_eq!(geo.total, dec!(1_500_000));
    assert_eq!(geo.entries[0].name, "Ireland");
    assert!(approx_eq(geo.entries[0].percentage, dec!(53.3), dec!(0.05)));
    assert_eq!(geo.entries[1].name, "Luxembourg");
    assert!(approx_eq(geo.entries[1].percentage, dec!(46.7), dec!(0.05)));
}

#[test]
fn test_two_fund_manager_breach_is_critical() {
    let report = compute_risk_report(&two_fund_input(), as_of());
    assert_eq!(report.exposures.manager.entries.len(), 1);
    assert_eq!(report.exposures.manager.entries[0].percentage, dec!(100));

    let breach = report
        .breaches
        .iter()
        .find(|b| b.dimension == BreachDimension::Manager)
        .expect("manager breach");
    assert_eq!(breach.label, "Acme");
    assert_eq!(breach.limit, dec!(20));
    assert_eq!(breach.severity, BreachSeverity::Critical);
}

#[test]
fn test_two_fund_metrics() {
    let m = compute_risk_report(&two_fund_input(), as_of()).metrics;
    assert_eq!(m.total_portfolio, dec!(1_500_000));
    assert_eq!(m.total_commitment, dec!(1_500_000));
    assert_eq!(m.total_paid_in, dec!(1_100_000));
    assert_eq!(m.unfunded_commitment, dec!(400_000));
    assert_eq!(m.fund_count, 2);
    assert_eq!(m.weighted_tvpi, None);
}

// ---------------------------------------------------------------------------
// Empty input
// ---------------------------------------------------------------------------

fn assert_finite_tree(value: &Value, path: &str) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                assert_finite_tree(v, &format!("{}.{}", path, k));
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                assert_finite_tree(v, &format!("{}[{}]", path, i));
            }
        }
        Value::Number(n) => {
            assert!(
                n.as_f64().is_some_and(f64::is_finite),
                "non-finite number at {}",
                path
            );
        }
        Value::String(s) => {
            let lower = s.to_lowercase();
            assert!(
                lower != "nan" && !lower.contains("inf"),
                "non-finite value at {}: {}",
                path,
                s
            );
        }
        _ => {}
    }
}

#[test]
fn test_empty_input_is_all_zero() {
    let report = compute_risk_report(&RiskReportInput::default(), as_of());

    assert_eq!(report.metrics.total_portfolio, Decimal::ZERO);
    for exposure in report.exposures.iter() {
        assert!(exposure.entries.is_empty());
        assert_eq!(exposure.total, Decimal::ZERO);
    }
    assert!(report.breaches.is_empty());
    assert!(report.warnings.is_empty());
    assert_eq!(report.liquidity.next_12m_calls, Decimal::ZERO);
    assert_eq!(report.liquidity.next_24m_distributions, Decimal::ZERO);
    assert_eq!(report.liquidity.recommended_reserve, Decimal::ZERO);
    assert_eq!(report.liquidity.reserve_gap, Decimal::ZERO);
    assert_eq!(report.liquidity.deployment_years, Decimal::ZERO);
    // Nothing owed: coverage reports the sentinel rather than zero.
    assert_eq!(report.liquidity.liquidity_coverage, COVERAGE_SENTINEL);
    assert_eq!(report.history.len(), 8);
    assert_eq!(report.liquidity_schedule.len(), 8);
    assert_eq!(report.scenarios.len(), 3);

    let tree = serde_json::to_value(&report).unwrap();
    assert_finite_tree(&tree, "report");
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn test_report_is_deterministic() {
    let input = mixed_input();
    let first = compute_risk_report(&input, as_of());
    let second = compute_risk_report(&input, as_of());
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_percentages_sum_to_hundred() {
    let report = compute_risk_report(&mixed_input(), as_of());
    for exposure in report.exposures.iter() {
        assert!(!exposure.entries.is_empty());
        let sum: Decimal = exposure.entries.iter().map(|e| e.percentage).sum();
        assert!(
            approx_eq(sum, dec!(100), dec!(0.0001)),
            "{} sums to {}",
            exposure.dimension,
            sum
        );
    }
}

#[test]
fn test_history_sums_in_window_calls() {
    let report = compute_risk_report(&mixed_input(), as_of());
    // Window 2023-Q2 .. 2025-Q1 up to 2025-01-15: the 2025-02-20 call is future.
    let total: Decimal = report.history.iter().map(|p| p.capital_calls).sum();
    assert_eq!(total, dec!(300_000));
    assert_eq!(
        report.history.last().unwrap().cumulative_calls,
        dec!(300_000)
    );
    let dist_total: Decimal = report.history.iter().map(|p| p.distributions).sum();
    assert_eq!(dist_total, dec!(120_000));
}

#[test]
fn test_identity_scenario_matches_forecast() {
    let mut input = mixed_input();
    input.scenario_configs = Some(vec![ScenarioInput::default()]);
    let report = compute_risk_report(&input, as_of());
    assert_eq!(report.scenarios.len(), 1);
    let s = &report.scenarios[0];
    assert_eq!(s.name, "Scenario 1");
    assert_eq!(s.projected_calls, report.liquidity.next_12m_calls);
    assert_eq!(s.projected_distributions, report.liquidity.next_12m_distributions);
    assert_eq!(s.projected_nav, report.metrics.total_portfolio);
    assert!(approx_eq(
        s.coverage_ratio,
        report.liquidity.liquidity_coverage,
        dec!(0.000001)
    ));
}

#[test]
fn test_overall_score_is_mean() {
    let report = compute_risk_report(&mixed_input(), as_of());
    let s = &report.scores;
    let mean = (s.concentration + s.liquidity + s.performance + s.policy) / dec!(4);
    assert!(approx_eq(s.overall, mean, dec!(0.051)));
    for v in [s.concentration, s.liquidity, s.performance, s.policy, s.overall] {
        assert!(v >= Decimal::ZERO && v <= dec!(100));
    }
}

#[test]
fn test_severity_rises_with_excess() {
    // Acme holds 100% of the two-fund portfolio; vary the manager limit.
    let severity_at = |limit: Decimal| {
        let mut input = two_fund_input();
        input.policy = Some(PolicyOverrides {
            max_manager_exposure: Some(limit),
            ..Default::default()
        });
        compute_risk_report(&input, as_of())
            .breaches
            .iter()
            .find(|b| b.dimension == BreachDimension::Manager)
            .map(|b| b.severity)
    };
    assert_eq!(severity_at(dec!(100)), None);
    assert_eq!(severity_at(dec!(90)), Some(BreachSeverity::Medium));
    assert_eq!(severity_at(dec!(80)), Some(BreachSeverity::High));
    assert_eq!(severity_at(dec!(60)), Some(BreachSeverity::Critical));
}

// ---------------------------------------------------------------------------
// Collaborators and decoding
// ---------------------------------------------------------------------------

struct SingleBucket;

impl AssetClassifier for SingleBucket {
    fn classify(&self, _fund: &FundHolding) -> String {
        "Alternatives".into()
    }
}

#[test]
fn test_injected_classifier() {
    let report = compute_risk_report_with(&two_fund_input(), as_of(), &SingleBucket);
    let classes: Vec<&str> = report
        .exposures
        .asset_class
        .entries
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(classes, vec!["Alternatives"]);
}

#[test]
fn test_lenient_json_request() {
    let json = r#"{
        "funds": [
            {"id": "f1", "name": "Fund One", "commitment": "1,000,000", "paid_in": 400000,
             "nav": "garbage", "manager": "Acme"}
        ],
        "direct_investments": [],
        "capital_calls": [
            {"fund_id": "f1", "amount": "25000", "due_date": "not a date"}
        ],
        "policy": {"max_manager_exposure": "abc", "min_liquidity_coverage": "1.5"}
    }"#;
    let input = RiskReportInput::from_json(json).unwrap();
    assert_eq!(input.funds[0].nav, Decimal::ZERO);
    assert_eq!(input.funds[0].commitment, dec!(1_000_000));

    let policy = input.effective_policy();
    assert_eq!(policy.max_manager_exposure, dec!(20));
    assert_eq!(policy.min_liquidity_coverage, dec!(1.5));

    let report = compute_risk_report(&input, as_of());
    assert_eq!(report.metrics.total_portfolio, Decimal::ZERO);
    assert!(report.exposures.manager.entries.is_empty());
    assert!(report.warnings.iter().any(|w| w.contains("without a usable date")));
}

#[test]
fn test_lenient_fields_fall_back_instead_of_failing() {
    let json = r#"{
        "funds": [
            {"name": "Growth II", "vintage": "2019", "nav": "500", "manager": null}
        ],
        "capital_calls": [
            {"amount": 100, "due_date": "2025-02-01", "payment_status": 5}
        ]
    }"#;
    let input = RiskReportInput::from_json(json).unwrap();
    assert_eq!(input.funds[0].id, "");
    assert_eq!(input.funds[0].vintage, Some(2019));
    assert_eq!(input.capital_calls[0].fund_id, "");
    assert_eq!(input.capital_calls[0].payment_status, None);

    let report = compute_risk_report(&input, as_of());
    assert_eq!(report.exposures.vintage.amount_of("2019"), dec!(500));
    assert_eq!(report.exposures.manager.amount_of("Unknown"), dec!(500));
    assert_eq!(report.liquidity.pending_calls, dec!(100));
}

// ---------------------------------------------------------------------------
// Extreme caller values
// ---------------------------------------------------------------------------

#[test]
fn test_tiny_policy_limit_grades_critical() {
    let json = r#"{
        "funds": [{"id": "a", "manager": "Acme", "commitment": 100, "paid_in": 100, "nav": 100}],
        "policy": {"max_manager_exposure": "0.0000000000000000000000000001"}
    }"#;
    let input = RiskReportInput::from_json(json).unwrap();
    let report = compute_risk_report(&input, as_of());

    let manager = report
        .breaches
        .iter()
        .find(|b| b.dimension == BreachDimension::Manager)
        .unwrap();
    assert_eq!(manager.label, "Acme");
    assert_eq!(manager.severity, BreachSeverity::Critical);
}

#[test]
fn test_huge_call_multiplier_saturates() {
    let json = r#"{
        "funds": [{"id": "a", "commitment": 8000000000, "paid_in": 0, "nav": 0}],
        "scenario_configs": [{"name": "Runaway", "call_multiplier": "100000000000000000000"}]
    }"#;
    let input = RiskReportInput::from_json(json).unwrap();
    let report = compute_risk_report(&input, as_of());

    assert_eq!(report.liquidity.next_12m_calls, dec!(4_000_000_000));
    let runaway = &report.scenarios[0];
    assert_eq!(runaway.name, "Runaway");
    assert_eq!(runaway.projected_calls, Decimal::MAX);
    assert!(runaway.liquidity_gap > Decimal::ZERO);
    assert!(runaway.coverage_ratio < Decimal::ONE);

    let tree = serde_json::to_value(&report).unwrap();
    assert_finite_tree(&tree, "report");
}

#[test]
fn test_holdings_at_decimal_bound_do_not_overflow() {
    let big = FundHolding {
        id: "big".into(),
        commitment: Decimal::MAX,
        paid_in: Decimal::ZERO,
        nav: Decimal::MAX,
        tvpi: Some(Decimal::MAX),
        leverage: Some(Decimal::MAX),
        ..Default::default()
    };
    let input = RiskReportInput {
        funds: vec![big.clone(), FundHolding { id: "big-2".into(), ..big }],
        direct_investments: vec![DirectHolding {
            id: "d".into(),
            current_value: Some(Decimal::MAX),
            ..Default::default()
        }],
        capital_calls: vec![CapitalCallEvent {
            fund_id: "big".into(),
            amount: Decimal::MAX,
            due_date: Some(d(2025, 2, 1)),
            ..Default::default()
        }],
        distributions: vec![DistributionEvent {
            fund_id: "big".into(),
            amount: Decimal::MAX,
            distribution_date: Some(d(2024, 6, 1)),
        }],
        ..Default::default()
    };
    let report = compute_risk_report(&input, as_of());

    assert_eq!(report.metrics.total_portfolio, Decimal::MAX);
    assert_eq!(report.metrics.total_commitment, Decimal::MAX);
    assert!(report.scores.overall >= Decimal::ZERO && report.scores.overall <= dec!(100));
    assert!(!report.breaches.is_empty());
}
