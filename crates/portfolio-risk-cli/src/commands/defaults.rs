use serde_json::Value;

use portfolio_risk_core::defaults::{DEFAULT_POLICY, DEFAULT_SCENARIOS};

/// The policy limits applied when a request supplies none.
pub fn run_default_policy() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(DEFAULT_POLICY)?)
}

/// The scenarios run when a request supplies none.
pub fn run_default_scenarios() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(DEFAULT_SCENARIOS)?)
}
