use napi::Result as NapiResult;
use napi_derive::napi;

use portfolio_risk_core::defaults::{DEFAULT_POLICY, DEFAULT_SCENARIOS};
use portfolio_risk_core::{compute_risk_report as compute_report, parse_as_of, RiskReportInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Risk report
// ---------------------------------------------------------------------------

/// Compute a risk report from a JSON request. `as_of` is `YYYY-MM-DD`;
/// today's date is used when it is omitted.
#[napi]
pub fn compute_risk_report(input_json: String, as_of: Option<String>) -> NapiResult<String> {
    let input = RiskReportInput::from_json(&input_json).map_err(to_napi_error)?;
    let as_of = match as_of {
        Some(raw) => parse_as_of(&raw).map_err(to_napi_error)?,
        None => chrono::Local::now().date_naive(),
    };
    let output = compute_report(&input, as_of);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[napi]
pub fn default_policy() -> NapiResult<String> {
    serde_json::to_string(&DEFAULT_POLICY).map_err(to_napi_error)
}

#[napi]
pub fn default_scenarios() -> NapiResult<String> {
    serde_json::to_string(&DEFAULT_SCENARIOS).map_err(to_napi_error)
}
