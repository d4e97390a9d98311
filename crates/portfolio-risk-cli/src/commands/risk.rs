use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use portfolio_risk_core::exposure::Dimension;
use portfolio_risk_core::scenarios::ScenarioInput;
use portfolio_risk_core::{compute_risk_report, RiskReport, RiskReportInput};

use crate::input;

/// Where the request comes from and which policy file to layer over it.
#[derive(Args)]
pub struct RequestArgs {
    /// Path to the JSON request (funds, direct_investments, capital_calls,
    /// distributions, policy, scenario_configs). Reads stdin when omitted.
    #[arg(long)]
    pub input: Option<String>,

    /// JSON or YAML policy overrides, layered over the request's own policy
    #[arg(long)]
    pub policy: Option<String>,
}

/// Arguments for the full report and the single-section views
#[derive(Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub request: RequestArgs,
}

/// Arguments for the exposure breakdown
#[derive(Args)]
pub struct ExposuresArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Only show one dimension
    #[arg(long)]
    pub dimension: Option<DimensionArg>,
}

/// Arguments for liquidity stress testing
#[derive(Args)]
pub struct StressTestArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// JSON or YAML list of scenarios, replacing the request's own list
    #[arg(long)]
    pub scenarios: Option<String>,

    /// Name for an ad-hoc scenario given by the flags below
    #[arg(long)]
    pub name: Option<String>,

    /// Ad-hoc fractional NAV shock (e.g. -0.2 for -20%)
    #[arg(long, allow_hyphen_values = true)]
    pub nav_shock: Option<Decimal>,

    /// Ad-hoc multiplier on next-twelve-month capital calls
    #[arg(long)]
    pub call_multiplier: Option<Decimal>,

    /// Ad-hoc multiplier on next-twelve-month distributions
    #[arg(long)]
    pub distribution_multiplier: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DimensionArg {
    AssetClass,
    Geography,
    Manager,
    Vintage,
    Currency,
    Sector,
}

impl From<DimensionArg> for Dimension {
    fn from(d: DimensionArg) -> Self {
        match d {
            DimensionArg::AssetClass => Dimension::AssetClass,
            DimensionArg::Geography => Dimension::Geography,
            DimensionArg::Manager => Dimension::Manager,
            DimensionArg::Vintage => Dimension::Vintage,
            DimensionArg::Currency => Dimension::Currency,
            DimensionArg::Sector => Dimension::Sector,
        }
    }
}

/// One row of the flattened exposure table.
#[derive(Serialize)]
struct ExposureRow<'a> {
    dimension: Dimension,
    name: &'a str,
    amount: Decimal,
    percentage: Decimal,
}

pub fn run_report(args: ReportArgs, as_of: NaiveDate) -> Result<Value, Box<dyn std::error::Error>> {
    let report = build_report(&args.request, as_of)?;
    Ok(serde_json::to_value(report)?)
}

pub fn run_exposures(
    args: ExposuresArgs,
    as_of: NaiveDate,
) -> Result<Value, Box<dyn std::error::Error>> {
    let report = build_report(&args.request, as_of)?;
    let wanted: Option<Dimension> = args.dimension.map(Into::into);

    let rows: Vec<ExposureRow<'_>> = report
        .exposures
        .iter()
        .filter(|e| wanted.map_or(true, |d| d == e.dimension))
        .flat_map(|e| {
            e.entries.iter().map(move |entry| ExposureRow {
                dimension: e.dimension,
                name: &entry.name,
                amount: entry.amount,
                percentage: entry.percentage,
            })
        })
        .collect();
    Ok(serde_json::to_value(rows)?)
}

pub fn run_liquidity(args: ReportArgs, as_of: NaiveDate) -> Result<Value, Box<dyn std::error::Error>> {
    let report = build_report(&args.request, as_of)?;
    Ok(serde_json::json!({
        "as_of": report.as_of,
        "result": report.liquidity,
        "schedule": report.liquidity_schedule,
        "warnings": report.warnings,
    }))
}

pub fn run_history(args: ReportArgs, as_of: NaiveDate) -> Result<Value, Box<dyn std::error::Error>> {
    let report = build_report(&args.request, as_of)?;
    Ok(serde_json::to_value(report.history)?)
}

pub fn run_breaches(args: ReportArgs, as_of: NaiveDate) -> Result<Value, Box<dyn std::error::Error>> {
    let report = build_report(&args.request, as_of)?;
    Ok(serde_json::to_value(report.breaches)?)
}

pub fn run_scores(args: ReportArgs, as_of: NaiveDate) -> Result<Value, Box<dyn std::error::Error>> {
    let report = build_report(&args.request, as_of)?;
    Ok(serde_json::json!({
        "as_of": report.as_of,
        "result": report.scores,
        "warnings": report.warnings,
    }))
}

pub fn run_stress_test(
    args: StressTestArgs,
    as_of: NaiveDate,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut request = load_request(&args.request)?;

    if let Some(ref path) = args.scenarios {
        request.scenario_configs = Some(input::file::read_scenarios(path)?);
    }
    if let Some(adhoc) = adhoc_scenario(&args) {
        request.scenario_configs = Some(vec![adhoc]);
    }

    let report = compute_risk_report(&request, as_of);
    Ok(serde_json::to_value(report.scenarios)?)
}

/// An ad-hoc scenario when any of its flags was given.
fn adhoc_scenario(args: &StressTestArgs) -> Option<ScenarioInput> {
    let any = args.name.is_some()
        || args.nav_shock.is_some()
        || args.call_multiplier.is_some()
        || args.distribution_multiplier.is_some();
    any.then(|| ScenarioInput {
        name: args.name.clone(),
        nav_shock: args.nav_shock,
        call_multiplier: args.call_multiplier,
        distribution_multiplier: args.distribution_multiplier,
    })
}

fn build_report(args: &RequestArgs, as_of: NaiveDate) -> Result<RiskReport, Box<dyn std::error::Error>> {
    let request = load_request(args)?;
    Ok(compute_risk_report(&request, as_of))
}

fn load_request(args: &RequestArgs) -> Result<RiskReportInput, Box<dyn std::error::Error>> {
    let mut request: RiskReportInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json> or stdin required".into());
    };

    if let Some(ref path) = args.policy {
        let overrides = input::file::read_policy(path)?;
        let base = request.policy.take().unwrap_or_default();
        request.policy = Some(base.layered_with(&overrides));
    }

    tracing::debug!(
        funds = request.funds.len(),
        directs = request.direct_investments.len(),
        calls = request.capital_calls.len(),
        distributions = request.distributions.len(),
        "request loaded"
    );
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn stress_args() -> StressTestArgs {
        StressTestArgs {
            request: RequestArgs {
                input: None,
                policy: None,
            },
            scenarios: None,
            name: None,
            nav_shock: None,
            call_multiplier: None,
            distribution_multiplier: None,
        }
    }

    #[test]
    fn test_no_adhoc_scenario_without_flags() {
        assert!(adhoc_scenario(&stress_args()).is_none());
    }

    #[test]
    fn test_adhoc_scenario_from_flags() {
        let args = StressTestArgs {
            nav_shock: Some(dec!(-0.25)),
            ..stress_args()
        };
        let s = adhoc_scenario(&args).unwrap();
        assert_eq!(s.nav_shock, Some(dec!(-0.25)));
        assert_eq!(s.call_multiplier, None);
        assert_eq!(s.name, None);
    }

    #[test]
    fn test_dimension_arg_mapping() {
        assert_eq!(Dimension::from(DimensionArg::Manager), Dimension::Manager);
        assert_eq!(Dimension::from(DimensionArg::AssetClass), Dimension::AssetClass);
    }
}
