//! Rate conversion between transaction legs and amount formatting.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::currency::{Currency, RateDirection, SymbolPosition};
use crate::errors::{LedgerError, Result};

/// Fraction digits shown to users.
pub const DISPLAY_SCALE: u32 = 2;
/// Fraction digits kept for intermediate converted amounts.
pub const INTERNAL_SCALE: u32 = 6;

/// Rounds half-up (away from zero on a tie) to [`DISPLAY_SCALE`].
pub fn round_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds half-up to [`INTERNAL_SCALE`].
pub fn round_internal(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(INTERNAL_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts `amount` with `rate`. A zero rate is the "no conversion"
/// placeholder and, like a unit rate, leaves the amount untouched.
pub fn convert(amount: Decimal, rate: Decimal, direction: RateDirection) -> Result<Decimal> {
    if rate.is_zero() || rate == Decimal::ONE {
        return Ok(amount);
    }
    let converted = match direction {
        RateDirection::Divide => amount.checked_div(rate).map(round_internal),
        RateDirection::Multiply => amount.checked_mul(rate),
    };
    converted.ok_or_else(|| {
        LedgerError::Overflow(format!("{} converted with rate {} ({:?})", amount, rate, direction))
    })
}

/// Formats an amount with two fraction digits using the currency's display
/// settings. Without a currency the bare number is returned.
pub fn format_amount(amount: Decimal, currency: Option<&Currency>) -> String {
    let rounded = round_display(amount);
    let mut body = format!("{:.2}", rounded.abs());
    if currency.map_or(false, |c| c.use_thousand_separator) {
        body = group_thousands(&body, ',');
    }
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    match currency {
        Some(currency) if currency.show_format_symbol && !currency.format_symbol.is_empty() => {
            match currency.symbol_position {
                SymbolPosition::Before => format!("{}{}{}", sign, currency.format_symbol, body),
                SymbolPosition::After => format!("{}{} {}", sign, body, currency.format_symbol),
            }
        }
        _ => format!("{}{}", sign, body),
    }
}

fn group_thousands(body: &str, separator: char) -> String {
    let (int_part, fraction) = match body.find('.') {
        Some(pos) => body.split_at(pos),
        None => (body, ""),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (count, ch) in int_part.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped.push_str(fraction);
    grouped
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[test]
    fn zero_and_unit_rates_are_identity() {
        let amount = dec("123.45");
        assert_eq!(convert(amount, Decimal::ZERO, RateDirection::Divide).unwrap(), amount);
        assert_eq!(convert(amount, Decimal::ONE, RateDirection::Divide).unwrap(), amount);
        assert_eq!(convert(amount, Decimal::ZERO, RateDirection::Multiply).unwrap(), amount);
    }

    #[test]
    fn divide_rounds_half_up_to_internal_scale() {
        let converted = convert(dec("100"), dec("3"), RateDirection::Divide).unwrap();
        assert_eq!(converted, dec("33.333333"));
        let converted = convert(dec("2"), dec("3"), RateDirection::Divide).unwrap();
        assert_eq!(converted, dec("0.666667"));
    }

    #[test]
    fn multiply_scales_amount() {
        assert_eq!(
            convert(dec("10.00"), dec("75.5"), RateDirection::Multiply).unwrap(),
            dec("755.000")
        );
    }

    #[test]
    fn out_of_range_conversion_is_an_error() {
        let err = convert(Decimal::MAX, dec("2"), RateDirection::Multiply).unwrap_err();
        assert!(matches!(err, LedgerError::Overflow(_)));
        assert!(convert(Decimal::MAX, dec("0.5"), RateDirection::Divide).is_err());
        assert!(convert(Decimal::MAX, dec("2"), RateDirection::Divide).is_ok());
    }

    #[test]
    fn display_rounding_is_half_up() {
        assert_eq!(round_display(dec("2.345")), dec("2.35"));
        assert_eq!(round_display(dec("-2.345")), dec("-2.35"));
        assert_eq!(round_display(dec("2.344")), dec("2.34"));
    }

    #[test]
    fn formats_with_symbol_and_grouping() {
        let usd = Currency::new("USD")
            .with_format_symbol("$", SymbolPosition::Before)
            .with_thousand_separator(true);
        assert_eq!(format_amount(dec("1234567.5"), Some(&usd)), "$1,234,567.50");
        assert_eq!(format_amount(dec("-12"), Some(&usd)), "-$12.00");

        let rub = Currency::new("RUB").with_format_symbol("₽", SymbolPosition::After);
        assert_eq!(format_amount(dec("1500"), Some(&rub)), "1500.00 ₽");
        assert_eq!(format_amount(dec("0.005"), None), "0.01");
    }
}
