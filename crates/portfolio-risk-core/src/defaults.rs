//! Every default the engine applies, in one place.
//!
//! - **Labels** substituted for missing optional fields during normalisation
//! - **Horizons** for the historical and forward liquidity schedules
//! - **Severity cut-offs** used to grade policy breaches
//! - **Scoring weights** for the composite risk score
//! - **`DEFAULT_POLICY`** and **`DEFAULT_SCENARIOS`**, merged field by field
//!   with whatever the caller supplies
//!
//! Percentages are whole numbers (20 = 20%); fractions are decimals
//! (0.10 = 10%); ratios are plain multiples.

use std::borrow::Cow;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::policy::PolicyConfig;
use crate::scenarios::ScenarioConfig;

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

pub const UNKNOWN_LABEL: &str = "Unknown";
pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_FUND_SECTOR: &str = "Generalist";
/// Asset class assigned by the keyword classifier when nothing matches.
pub const DEFAULT_FUND_ASSET_CLASS: &str = "Private Equity";

pub const DIRECT_HOLDINGS_LABEL: &str = "Direct Holdings";
pub const DIRECT_VINTAGE_LABEL: &str = "Direct";
pub const DIRECT_ASSET_CLASS: &str = "Direct Investments";

// ---------------------------------------------------------------------------
// Horizons
// ---------------------------------------------------------------------------

/// Quarters in both the trailing history and the forward forecast.
pub const HORIZON_QUARTERS: usize = 8;
/// Forecast buckets that make up the next twelve months.
pub const NEAR_TERM_QUARTERS: usize = 4;
/// Window for calls treated as pending cash-management items.
pub const PENDING_CALL_WINDOW_DAYS: u64 = 90;
/// Dates before this year are negative epoch timestamps and are unusable.
pub const EARLIEST_USABLE_YEAR: i32 = 1970;
/// Quarterly distribution as a share of fund NAV when there is no history.
pub const FALLBACK_QUARTERLY_DISTRIBUTION_RATE: Decimal = dec!(0.02);

// ---------------------------------------------------------------------------
// Ratios
// ---------------------------------------------------------------------------

/// Reported coverage when there are no calls to cover.
pub const COVERAGE_SENTINEL: Decimal = dec!(5.0);
/// Floor on the coverage denominator so tiny call totals do not explode it.
pub const MIN_COVERAGE_DENOMINATOR: Decimal = dec!(1);

// ---------------------------------------------------------------------------
// Breach severity
// ---------------------------------------------------------------------------

/// Excess ratios in (1.0, 1.2] grade MEDIUM.
pub const SEVERITY_MEDIUM_CEILING: Decimal = dec!(1.2);
/// Excess ratios in (1.2, 1.4] grade HIGH; above grades CRITICAL.
pub const SEVERITY_HIGH_CEILING: Decimal = dec!(1.4);

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

pub const SCORE_CEILING: Decimal = dec!(100);

pub const CONCENTRATION_ASSET_CLASS_WEIGHT: Decimal = dec!(0.7);
pub const CONCENTRATION_MANAGER_WEIGHT: Decimal = dec!(0.3);

pub const LIQUIDITY_SCORE_AT_MINIMUM: Decimal = dec!(30);
/// Points removed per 1.0x of coverage above the policy minimum.
pub const LIQUIDITY_SURPLUS_SLOPE: Decimal = dec!(20);
pub const LIQUIDITY_SCORE_BELOW_MINIMUM: Decimal = dec!(70);
/// Points added per 1.0x of coverage below the policy minimum.
pub const LIQUIDITY_SHORTFALL_SLOPE: Decimal = dec!(100);

pub const PERFORMANCE_SCORE_ON_TARGET: Decimal = dec!(20);
pub const PERFORMANCE_SCORE_CEILING: Decimal = dec!(80);
/// Points added per 100% relative TVPI shortfall against target.
pub const PERFORMANCE_SHORTFALL_SLOPE: Decimal = dec!(100);

pub const POLICY_POINTS_PER_BREACH: Decimal = dec!(15);

// ---------------------------------------------------------------------------
// Policy and scenarios
// ---------------------------------------------------------------------------

pub const DEFAULT_POLICY: PolicyConfig = PolicyConfig {
    max_single_fund_exposure: dec!(25),
    max_asset_class_exposure: dec!(50),
    max_geography_exposure: dec!(40),
    max_manager_exposure: dec!(20),
    max_vintage_exposure: dec!(30),
    max_currency_exposure: dec!(75),
    max_sector_exposure: dec!(35),
    max_unfunded_commitment_ratio: dec!(60),
    min_liquidity_coverage: dec!(1.2),
    max_portfolio_leverage: dec!(2.0),
    min_acceptable_tvpi: dec!(1.2),
    target_liquidity_buffer: dec!(0.10),
    concentration_alerts: true,
    liquidity_alerts: true,
    leverage_alerts: true,
};

pub const BASE_CASE: ScenarioConfig = ScenarioConfig {
    name: Cow::Borrowed("Base Case"),
    nav_shock: dec!(0),
    call_multiplier: dec!(1.0),
    distribution_multiplier: dec!(1.0),
};

pub const DEFAULT_SCENARIOS: [ScenarioConfig; 3] = [
    BASE_CASE,
    ScenarioConfig {
        name: Cow::Borrowed("Downside"),
        nav_shock: dec!(-0.15),
        call_multiplier: dec!(1.25),
        distribution_multiplier: dec!(0.75),
    },
    ScenarioConfig {
        name: Cow::Borrowed("Severe Stress"),
        nav_shock: dec!(-0.35),
        call_multiplier: dec!(1.5),
        distribution_multiplier: dec!(0.5),
    },
];
