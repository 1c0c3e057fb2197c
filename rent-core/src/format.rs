//! Russian-locale formatting and parsing of money, percentages and labels.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::calculations::common::round_half_up;

const MILLION: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
const THOUSAND: Decimal = Decimal::from_parts(1_000, 0, 0, false, 0);

/// Label given to the sum of properties that did not make a top list.
pub const OTHER_PROPERTIES_LABEL: &str = "Прочие объекты";

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid amount '{input}'")]
pub struct ParseAmountError {
    input: String,
}

/// Formats rubles the way `ru-RU` does: thousands separated by spaces, a
/// decimal comma, and kopecks only when present.
///
/// ```
/// use rust_decimal_macros::dec;
/// use rent_core::format::format_rub;
///
/// assert_eq!(format_rub(dec!(30000)), "30 000 ₽");
/// assert_eq!(format_rub(dec!(1182.5)), "1 182,5 ₽");
/// assert_eq!(format_rub(dec!(-950)), "-950 ₽");
/// ```
pub fn format_rub(value: Decimal) -> String {
    format!("{} ₽", format_grouped(round_half_up(value)))
}

/// Short form used on chart axes and tooltips.
///
/// ```
/// use rust_decimal_macros::dec;
/// use rent_core::format::format_rub_compact;
///
/// assert_eq!(format_rub_compact(dec!(1234567)), "1,2 млн ₽");
/// assert_eq!(format_rub_compact(dec!(30000)), "30 тыс ₽");
/// assert_eq!(format_rub_compact(dec!(950)), "950 ₽");
/// ```
pub fn format_rub_compact(value: Decimal) -> String {
    if value >= MILLION {
        let millions =
            (value / MILLION).round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        return format!("{} млн ₽", fixed(millions, 1).replace('.', ","));
    }
    if value >= THOUSAND {
        let thousands =
            (value / THOUSAND).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        return format!("{} тыс ₽", fixed(thousands, 0));
    }
    format_rub(value)
}

/// Formats a percentage with one decimal place, e.g. `4.0%`.
pub fn format_percent(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{}%", fixed(rounded, 1))
}

/// Shortens `name` to `max_chars` characters, ending in `...` when cut.
///
/// ```
/// use rent_core::format::truncate_label;
///
/// assert_eq!(truncate_label("Квартира на Ленина", 25), "Квартира на Ленина");
/// assert_eq!(
///     truncate_label("Квартира на Ленинском проспекте, 12", 25),
///     "Квартира на Ленинском ..."
/// );
/// ```
pub fn truncate_label(
    name: &str,
    max_chars: usize,
) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    let kept: String = name.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Parses an amount typed in either `30 000,50` or `30000.50` form.
/// Empty input is zero.
pub fn parse_amount(s: &str) -> Result<Decimal, ParseAmountError> {
    let normalized: String = s
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '₽')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::warn!(input = %s, "invalid amount: {}", e);
        ParseAmountError {
            input: s.to_string(),
        }
    })
}

fn fixed(
    value: Decimal,
    dp: u32,
) -> String {
    let mut value = value;
    value.rescale(dp);
    value.to_string()
}

fn format_grouped(value: Decimal) -> String {
    let text = value.normalize().to_string();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped},{frac}"),
        None => format!("{sign}{grouped}"),
    }
}
