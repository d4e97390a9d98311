//! Forward liquidity forecast.
//!
//! Projects eight quarters of capital calls and distributions starting with
//! the as-of quarter, in two passes:
//!
//! 1. **Scheduled**: every dated event on or after `as_of` lands in its
//!    quarter; events past the horizon are dropped.
//! 2. **Estimated**: commitment not covered by scheduled calls is spread
//!    over quarters with no scheduled call, front-loaded, at
//!    `max(historical average call, unscheduled / 8)` per quarter until the
//!    pool runs out. Quarters with no scheduled distribution receive the
//!    historical average distribution, or 2% of fund NAV without history.
//!
//! Summary metrics (12/24-month totals, pending calls, reserve, coverage,
//! deployment pace) are derived from the finished schedule.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::arith::{saturating_div, saturating_sum};
use crate::calendar::{is_usable_date, FiscalQuarter};
use crate::defaults::{
    COVERAGE_SENTINEL, FALLBACK_QUARTERLY_DISTRIBUTION_RATE, HORIZON_QUARTERS,
    MIN_COVERAGE_DENOMINATOR, NEAR_TERM_QUARTERS, PENDING_CALL_WINDOW_DAYS,
};
use crate::history::{dated_flows, CashFlowHistory};
use crate::types::{CapitalCallEvent, DatedFlow, DistributionEvent, FundHolding, Money, Ratio};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquiditySchedulePoint {
    /// `{year}-Q{n}`
    pub quarter: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Calls from dated notices.
    pub scheduled_calls: Money,
    /// Calls allocated from unscheduled commitment.
    pub estimated_calls: Money,
    pub capital_calls: Money,
    pub scheduled_distributions: Money,
    pub estimated_distributions: Money,
    pub distributions: Money,
    /// distributions - capital_calls
    pub net_cash_flow: Money,
}

/// How quarters without scheduled distributions were filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionBasis {
    HistoricalAverage,
    NavFallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquiditySummary {
    pub next_12m_calls: Money,
    pub next_12m_distributions: Money,
    pub next_24m_calls: Money,
    pub next_24m_distributions: Money,
    /// Unpaid calls due within the next 90 days.
    pub pending_calls: Money,
    pub total_commitment: Money,
    pub unfunded_commitment: Money,
    /// Unfunded commitment not covered by scheduled calls.
    pub unscheduled_calls: Money,
    pub recommended_reserve: Money,
    pub reserve_gap: Money,
    /// (reserve + 12m distributions) / 12m calls, sentinel when no calls.
    pub liquidity_coverage: Ratio,
    /// Years to draw the unfunded commitment at the 12-month call pace.
    pub deployment_years: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityForecast {
    pub schedule: Vec<LiquiditySchedulePoint>,
    pub summary: LiquiditySummary,
    pub default_quarterly_call: Money,
    pub default_quarterly_distribution: Money,
    pub distribution_basis: DistributionBasis,
    /// Quarters that received an estimated call.
    pub estimated_call_quarters: usize,
    /// Quarters that received an estimated distribution.
    pub estimated_distribution_quarters: usize,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Forecast the next eight quarters of liquidity, starting at `as_of`'s quarter.
pub fn forecast_liquidity(
    funds: &[FundHolding],
    calls: &[CapitalCallEvent],
    distributions: &[DistributionEvent],
    history: &CashFlowHistory,
    target_liquidity_buffer: Decimal,
    as_of: NaiveDate,
) -> LiquidityForecast {
    let current = FiscalQuarter::containing(as_of);
    let quarters: Vec<FiscalQuarter> = (0..HORIZON_QUARTERS as i32)
        .map(|i| current.shift(i))
        .collect();

    // Pass 1: scheduled events.
    let (call_flows, dist_flows, _) = dated_flows(calls, distributions);
    let scheduled_calls = bucket_upcoming(&call_flows, &quarters, as_of);
    let scheduled_distributions = bucket_upcoming(&dist_flows, &quarters, as_of);

    // Pass 2: spread unscheduled commitment.
    let unfunded_commitment = saturating_sum(funds.iter().map(FundHolding::unfunded));
    let scheduled_total = saturating_sum(scheduled_calls.iter().copied());
    let unscheduled_calls = unfunded_commitment
        .saturating_sub(scheduled_total)
        .max(Decimal::ZERO);
    let default_quarterly_call = history
        .average_quarterly_calls()
        .max(unscheduled_calls / Decimal::from(HORIZON_QUARTERS as u64));

    let mut pool = unscheduled_calls;
    let mut estimated_calls = vec![Decimal::ZERO; HORIZON_QUARTERS];
    for (estimate, scheduled) in estimated_calls.iter_mut().zip(&scheduled_calls) {
        if scheduled.is_zero() && pool > Decimal::ZERO {
            let allocation = default_quarterly_call.min(pool);
            *estimate = allocation;
            pool = pool.saturating_sub(allocation);
        }
    }

    let (default_quarterly_distribution, distribution_basis) =
        if history.total_distributions() > Decimal::ZERO {
            (
                history.average_quarterly_distributions(),
                DistributionBasis::HistoricalAverage,
            )
        } else {
            let fund_nav = saturating_sum(funds.iter().map(|f| f.nav.max(Decimal::ZERO)));
            (
                fund_nav.saturating_mul(FALLBACK_QUARTERLY_DISTRIBUTION_RATE),
                DistributionBasis::NavFallback,
            )
        };

    let estimated_distributions: Vec<Money> = scheduled_distributions
        .iter()
        .map(|s| {
            if s.is_zero() {
                default_quarterly_distribution
            } else {
                Decimal::ZERO
            }
        })
        .collect();

    let schedule: Vec<LiquiditySchedulePoint> = quarters
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let capital_calls = scheduled_calls[i].saturating_add(estimated_calls[i]);
            let distributions =
                scheduled_distributions[i].saturating_add(estimated_distributions[i]);
            LiquiditySchedulePoint {
                quarter: q.key(),
                start_date: q.start_date(),
                end_date: q.end_date(),
                scheduled_calls: scheduled_calls[i],
                estimated_calls: estimated_calls[i],
                capital_calls,
                scheduled_distributions: scheduled_distributions[i],
                estimated_distributions: estimated_distributions[i],
                distributions,
                net_cash_flow: distributions.saturating_sub(capital_calls),
            }
        })
        .collect();

    let total_commitment = saturating_sum(funds.iter().map(|f| f.commitment.max(Decimal::ZERO)));
    let summary = summarize(
        &schedule,
        calls,
        as_of,
        total_commitment,
        unfunded_commitment,
        unscheduled_calls,
        target_liquidity_buffer,
    );

    let estimated_call_quarters = estimated_calls.iter().filter(|c| !c.is_zero()).count();
    let estimated_distribution_quarters = estimated_distributions
        .iter()
        .filter(|d| !d.is_zero())
        .count();

    tracing::debug!(
        next_12m_calls = %summary.next_12m_calls,
        next_12m_distributions = %summary.next_12m_distributions,
        unscheduled = %unscheduled_calls,
        coverage = %summary.liquidity_coverage,
        "liquidity forecast built"
    );

    LiquidityForecast {
        schedule,
        summary,
        default_quarterly_call,
        default_quarterly_distribution,
        distribution_basis,
        estimated_call_quarters,
        estimated_distribution_quarters,
    }
}

/// Coverage of `obligations` by `resources`, the sentinel when nothing is owed.
pub fn coverage_ratio(resources: Money, obligations: Money) -> Ratio {
    if obligations <= Decimal::ZERO {
        COVERAGE_SENTINEL
    } else {
        saturating_div(resources, obligations.max(MIN_COVERAGE_DENOMINATOR))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn bucket_upcoming(flows: &[DatedFlow], quarters: &[FiscalQuarter], as_of: NaiveDate) -> Vec<Money> {
    let mut buckets = vec![Decimal::ZERO; quarters.len()];
    for flow in flows.iter().filter(|f| f.date >= as_of) {
        if let Some(i) = quarters.iter().position(|q| q.contains(flow.date)) {
            buckets[i] = buckets[i].saturating_add(flow.amount);
        }
    }
    buckets
}

/// Unpaid calls due between `as_of` and the end of the pending window.
pub fn pending_calls(calls: &[CapitalCallEvent], as_of: NaiveDate) -> Money {
    let window_end = as_of
        .checked_add_days(Days::new(PENDING_CALL_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MAX);
    saturating_sum(
        calls
            .iter()
            .filter(|c| !c.is_paid())
            .filter(|c| {
                c.due_date
                    .is_some_and(|d| is_usable_date(d) && d >= as_of && d <= window_end)
            })
            .map(|c| c.amount.max(Decimal::ZERO)),
    )
}

fn summarize(
    schedule: &[LiquiditySchedulePoint],
    calls: &[CapitalCallEvent],
    as_of: NaiveDate,
    total_commitment: Money,
    unfunded_commitment: Money,
    unscheduled_calls: Money,
    target_liquidity_buffer: Decimal,
) -> LiquiditySummary {
    let near = &schedule[..NEAR_TERM_QUARTERS.min(schedule.len())];
    let next_12m_calls = saturating_sum(near.iter().map(|p| p.capital_calls));
    let next_12m_distributions = saturating_sum(near.iter().map(|p| p.distributions));
    let next_24m_calls = saturating_sum(schedule.iter().map(|p| p.capital_calls));
    let next_24m_distributions = saturating_sum(schedule.iter().map(|p| p.distributions));

    let recommended_reserve =
        total_commitment.saturating_mul(target_liquidity_buffer.max(Decimal::ZERO));
    let resources = recommended_reserve.saturating_add(next_12m_distributions);
    let reserve_gap = next_12m_calls.saturating_sub(resources).max(Decimal::ZERO);
    let liquidity_coverage = coverage_ratio(resources, next_12m_calls);

    let deployment_years = if unfunded_commitment <= Decimal::ZERO || next_12m_calls <= Decimal::ZERO
    {
        Decimal::ZERO
    } else {
        saturating_div(unfunded_commitment, next_12m_calls)
    };

    LiquiditySummary {
        next_12m_calls,
        next_12m_distributions,
        next_24m_calls,
        next_24m_distributions,
        pending_calls: pending_calls(calls, as_of),
        total_commitment,
        unfunded_commitment,
        unscheduled_calls,
        recommended_reserve,
        reserve_gap,
        liquidity_coverage,
        deployment_years,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
