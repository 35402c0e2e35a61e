//! Kwanza amounts and price arithmetic.
//!
//! Every price in the catalogue, cart, orders and invoices is a [`Decimal`]
//! amount in Angolan kwanza (AOA). There is no currency conversion and no tax
//! logic; the only arithmetic is unit price × quantity × period.

use rust_decimal::{Decimal, RoundingStrategy};

/// ISO 4217 code of the reseller's currency.
pub const CURRENCY_CODE: &str = "AOA";

/// Suffix used when displaying amounts.
pub const CURRENCY_SUFFIX: &str = "Kz";

/// Format an amount the way pt-AO renders kwanza: `.` groups thousands,
/// `,` separates two decimal places, and the `Kz` suffix follows.
///
/// ```
/// use rust_decimal::Decimal;
/// use angohost_core::format_kwanza;
///
/// assert_eq!(format_kwanza(Decimal::from(19_900)), "19.900,00 Kz");
/// ```
#[must_use]
pub fn format_kwanza(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    // `{:.2}` on an already rounded decimal always yields "<int>.<two digits>"
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped},{frac_part} {CURRENCY_SUFFIX}")
}

/// Subtotal of one line: `unit_price × quantity × period`.
///
/// `period` is the number of billing periods (months for monthly hosting,
/// years for domains). A missing period counts as one.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: u32, period: Option<u32>) -> Decimal {
    unit_price * Decimal::from(quantity) * Decimal::from(period.unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_kwanza_thousands_and_decimals() {
        assert_eq!(format_kwanza(Decimal::from(19_900)), "19.900,00 Kz");
        assert_eq!(format_kwanza(Decimal::from(1_250_000)), "1.250.000,00 Kz");
        assert_eq!(format_kwanza(Decimal::new(99_950, 2)), "999,50 Kz");
    }

    #[test]
    fn test_format_kwanza_small_and_zero() {
        assert_eq!(format_kwanza(Decimal::ZERO), "0,00 Kz");
        assert_eq!(format_kwanza(Decimal::new(5, 1)), "0,50 Kz");
        assert_eq!(format_kwanza(Decimal::from(100)), "100,00 Kz");
    }

    #[test]
    fn test_format_kwanza_rounds_half_away_from_zero() {
        assert_eq!(format_kwanza(Decimal::new(10_005, 3)), "10,01 Kz");
    }

    #[test]
    fn test_format_kwanza_negative() {
        assert_eq!(format_kwanza(Decimal::from(-4_500)), "-4.500,00 Kz");
    }

    #[test]
    fn test_line_total_multiplies_period() {
        assert_eq!(
            line_total(Decimal::from(2_500), 2, Some(12)),
            Decimal::from(60_000)
        );
        assert_eq!(line_total(Decimal::from(2_500), 3, None), Decimal::from(7_500));
    }
}
