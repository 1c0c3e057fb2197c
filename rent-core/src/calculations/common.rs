//! Common utility functions for rent and tax calculations.
//!
//! Rounding and proration helpers shared by the tax rules, the period
//! aggregator and the reports.

use rust_decimal::{Decimal, RoundingStrategy};

/// Average length of a month in days, used to turn a monthly rent into a
/// daily rate.
///
/// The value is a fixed approximation rather than the actual length of each
/// calendar month; report figures depend on it staying exactly `30.44`.
pub const AVERAGE_MONTH_DAYS: Decimal = Decimal::from_parts(3044, 0, 0, false, 2);

/// Rounds a decimal value to exactly two decimal places (kopecks) using
/// half-up rounding.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use rent_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a decimal value to whole rubles, half away from zero.
///
/// Chart series and report totals are shown in whole rubles.
///
/// ```
/// use rust_decimal_macros::dec;
/// use rent_core::calculations::common::round_to_ruble;
///
/// assert_eq!(round_to_ruble(dec!(29566.36)), dec!(29566));
/// assert_eq!(round_to_ruble(dec!(1182.5)), dec!(1183));
/// ```
pub fn round_to_ruble(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Daily rate for a monthly rent: `monthly_rent / 30.44`.
pub fn daily_rate(monthly_rent: Decimal) -> Decimal {
    monthly_rent / AVERAGE_MONTH_DAYS
}

/// Rent earned over `days` days at the average daily rate. Not rounded.
///
/// ```
/// use rust_decimal_macros::dec;
/// use rent_core::calculations::common::{prorate, round_half_up};
///
/// assert_eq!(round_half_up(prorate(dec!(30440), 10)), dec!(10000.00));
/// ```
pub fn prorate(
    monthly_rent: Decimal,
    days: i64,
) -> Decimal {
    daily_rate(monthly_rent) * Decimal::from(days)
}

/// `part / whole` as a percentage, or zero when `whole` is zero.
pub fn percentage(
    part: Decimal,
    whole: Decimal,
) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part / whole * Decimal::ONE_HUNDRED
}
