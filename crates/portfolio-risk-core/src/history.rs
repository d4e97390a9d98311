//! Cash-flow history.
//!
//! Rebuilds the trailing eight quarters (ending with the as-of quarter) of
//! capital calls and distributions, with running cumulative totals.
//!
//! - Calls are dated by due date, falling back to upload date
//! - Events dated after `as_of` belong to the forecast, not the history
//! - Undated or pre-epoch events are skipped and counted
//! - Negative amounts are clamped to zero

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::arith::saturating_sum;
use crate::calendar::{is_usable_date, FiscalQuarter};
use crate::defaults::HORIZON_QUARTERS;
use crate::types::{CapitalCallEvent, DatedFlow, DistributionEvent, Money};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskHistoryPoint {
    /// `{year}-Q{n}`
    pub quarter: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub capital_calls: Money,
    pub distributions: Money,
    /// distributions - capital_calls
    pub net_cash_flow: Money,
    pub cumulative_calls: Money,
    pub cumulative_distributions: Money,
    pub cumulative_net: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowHistory {
    pub points: Vec<RiskHistoryPoint>,
    /// Events with no usable date, excluded from every bucket.
    pub undated_events: usize,
}

impl CashFlowHistory {
    pub fn total_calls(&self) -> Money {
        saturating_sum(self.points.iter().map(|p| p.capital_calls))
    }

    pub fn total_distributions(&self) -> Money {
        saturating_sum(self.points.iter().map(|p| p.distributions))
    }

    /// Mean quarterly call over the full window, empty quarters included.
    pub fn average_quarterly_calls(&self) -> Money {
        average(self.total_calls(), self.points.len())
    }

    pub fn average_quarterly_distributions(&self) -> Money {
        average(self.total_distributions(), self.points.len())
    }
}

fn average(total: Money, count: usize) -> Money {
    if count == 0 {
        Decimal::ZERO
    } else {
        total / Decimal::from(count as u64)
    }
}

/// Calls and distributions that carry a usable date, amounts clamped at
/// zero, plus the number of events dropped for lacking one.
pub(crate) fn dated_flows(
    calls: &[CapitalCallEvent],
    distributions: &[DistributionEvent],
) -> (Vec<DatedFlow>, Vec<DatedFlow>, usize) {
    let mut undated = 0usize;
    let mut keep = |date: Option<NaiveDate>, amount: Money| match date {
        Some(d) if is_usable_date(d) => Some(DatedFlow {
            date: d,
            amount: amount.max(Decimal::ZERO),
        }),
        _ => {
            undated += 1;
            None
        }
    };
    let call_flows: Vec<DatedFlow> = calls
        .iter()
        .filter_map(|c| keep(c.effective_date(), c.amount))
        .collect();
    let dist_flows: Vec<DatedFlow> = distributions
        .iter()
        .filter_map(|d| keep(d.distribution_date, d.amount))
        .collect();
    (call_flows, dist_flows, undated)
}

fn sum_in_quarter(flows: &[DatedFlow], quarter: FiscalQuarter, as_of: NaiveDate) -> Money {
    saturating_sum(
        flows
            .iter()
            .filter(|f| f.date <= as_of && quarter.contains(f.date))
            .map(|f| f.amount),
    )
}

/// Build the trailing-quarter history ending with the quarter containing `as_of`.
pub fn build_history(
    calls: &[CapitalCallEvent],
    distributions: &[DistributionEvent],
    as_of: NaiveDate,
) -> CashFlowHistory {
    let (call_flows, dist_flows, undated_events) = dated_flows(calls, distributions);
    let current = FiscalQuarter::containing(as_of);

    let mut cumulative_calls = Decimal::ZERO;
    let mut cumulative_distributions = Decimal::ZERO;
    let mut points = Vec::with_capacity(HORIZON_QUARTERS);

    for offset in (0..HORIZON_QUARTERS as i32).rev() {
        let quarter = current.shift(-offset);
        let capital_calls = sum_in_quarter(&call_flows, quarter, as_of);
        let distributions = sum_in_quarter(&dist_flows, quarter, as_of);
        cumulative_calls = cumulative_calls.saturating_add(capital_calls);
        cumulative_distributions = cumulative_distributions.saturating_add(distributions);

        points.push(RiskHistoryPoint {
            quarter: quarter.key(),
            start_date: quarter.start_date(),
            end_date: quarter.end_date(),
            capital_calls,
            distributions,
            net_cash_flow: distributions.saturating_sub(capital_calls),
            cumulative_calls,
            cumulative_distributions,
            cumulative_net: cumulative_distributions.saturating_sub(cumulative_calls),
        });
    }

    tracing::debug!(
        quarters = points.len(),
        total_calls = %cumulative_calls,
        total_distributions = %cumulative_distributions,
        undated_events,
        "cash-flow history built"
    );

    CashFlowHistory {
        points,
        undated_events,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
