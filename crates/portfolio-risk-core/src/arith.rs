//! Overflow-free decimal helpers.
//!
//! Amounts, policy limits and scenario multipliers all arrive from the
//! caller, so aggregation and ratios pin at the `Decimal` range instead of
//! panicking.

use rust_decimal::Decimal;

/// Sum pinned at `Decimal::MAX` / `Decimal::MIN`.
pub fn saturating_sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}

/// `numerator / denominator`, pinned at the signed bound when the quotient
/// is out of range. Division by zero yields zero.
pub fn saturating_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    match numerator.checked_div(denominator) {
        Some(quotient) => quotient,
        None if numerator.is_sign_negative() == denominator.is_sign_negative() => Decimal::MAX,
        None => Decimal::MIN,
    }
}
