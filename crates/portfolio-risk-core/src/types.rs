use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::PortfolioRiskError;
use crate::PortfolioRiskResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Whole-number percentages (46.7 = 46.7%).
pub type Percent = Decimal;

/// Plain multiples (coverage, leverage, TVPI).
pub type Ratio = Decimal;

// ---------------------------------------------------------------------------
// Holdings
// ---------------------------------------------------------------------------

/// A commitment to a private fund.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundHolding {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub manager: Option<String>,
    /// Legal jurisdiction of the fund, used as the geography dimension.
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub domicile: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub commitment: Money,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub paid_in: Money,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub nav: Money,
    #[serde(
        default,
        deserialize_with = "lenient_opt_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub vintage: Option<i32>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub asset_class: Option<String>,
    /// Free-text strategy description, consulted when `asset_class` is absent.
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub strategy: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub sector: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub base_currency: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub leverage: Option<Ratio>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub tvpi: Option<Ratio>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub dpi: Option<Ratio>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub irr: Option<Decimal>,
}

impl FundHolding {
    /// Committed capital not yet called, floored at zero.
    pub fn unfunded(&self) -> Money {
        self.commitment.saturating_sub(self.paid_in).max(Decimal::ZERO)
    }
}

/// A direct (non-fund) investment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectHolding {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_value: Option<Money>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub investment_amount: Option<Money>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub asset_class: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub sector: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub geography: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub currency: Option<String>,
}

impl DirectHolding {
    /// Mark if present, else cost, else zero.
    pub fn value(&self) -> Money {
        self.current_value
            .or(self.investment_amount)
            .unwrap_or(Decimal::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Cash-flow events
// ---------------------------------------------------------------------------

/// Settlement state of a capital call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapitalCallEvent {
    #[serde(default, deserialize_with = "lenient_string")]
    pub fund_id: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Money,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub upload_date: Option<NaiveDate>,
    /// Unrecognised statuses decode as `Unknown`, non-text values as absent.
    #[serde(
        default,
        deserialize_with = "lenient_payment_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub payment_status: Option<PaymentStatus>,
}

impl CapitalCallEvent {
    /// Due date when known, otherwise the date the notice was received.
    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.due_date.or(self.upload_date)
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == Some(PaymentStatus::Paid)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionEvent {
    #[serde(default, deserialize_with = "lenient_string")]
    pub fund_id: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Money,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub distribution_date: Option<NaiveDate>,
}

/// A dated, sign-normalised cash movement used by the time-bucketing stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DatedFlow {
    pub date: NaiveDate,
    pub amount: Money,
}

// ---------------------------------------------------------------------------
// Lenient decoding
// ---------------------------------------------------------------------------

/// Parse an event date. Accepts `YYYY-MM-DD`, RFC 3339 and naive
/// `YYYY-MM-DDTHH:MM:SS` timestamps; anything else is `None`.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|ts| ts.date())
}

/// Parse the report date supplied at the boundary (CLI flag, binding argument).
pub fn parse_as_of(raw: &str) -> PortfolioRiskResult<NaiveDate> {
    parse_event_date(raw).ok_or_else(|| {
        PortfolioRiskError::DateError(format!(
            "'{}' is not a date (expected YYYY-MM-DD or RFC 3339)",
            raw
        ))
    })
}

fn decimal_from_value(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().replace(',', ""),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(decimal_from_value)
        .unwrap_or(Decimal::ZERO))
}

pub(crate) fn lenient_opt_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(decimal_from_value))
}

pub(crate) fn lenient_opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => s.trim().to_lowercase().parse().ok(),
        _ => None,
    })
}

fn text_from_value(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(text_from_value).unwrap_or_default())
}

pub(crate) fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(text_from_value))
}

/// Whole-number years, given as a number or numeric text.
fn lenient_opt_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(decimal_from_value)
        .filter(|year| year.fract().is_zero())
        .and_then(|year| i32::try_from(year).ok()))
}

fn lenient_payment_status<'de, D>(deserializer: D) -> Result<Option<PaymentStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => Some(match s.trim().to_lowercase().as_str() {
            "pending" => PaymentStatus::Pending,
            "paid" => PaymentStatus::Paid,
            "overdue" => PaymentStatus::Overdue,
            _ => PaymentStatus::Unknown,
        }),
        _ => None,
    })
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Value::as_str).and_then(parse_event_date))
}
