//! Text form of amounts

use crate::{constants::DISPLAY_DECIMAL_POINT, Error, Result};

/// Formats atomic units as a decimal coin amount
///
/// With `trim_zeros`, trailing fractional zeros are dropped down to a single digit
pub fn print_money(amount: u64, trim_zeros: bool) -> String {
    let digits = format!("{:0width$}", amount, width = DISPLAY_DECIMAL_POINT + 1);
    let (whole, fraction) = digits.split_at(digits.len() - DISPLAY_DECIMAL_POINT);
    let mut fraction = fraction;
    if trim_zeros {
        fraction = fraction.trim_end_matches('0');
        if fraction.is_empty() {
            fraction = "0";
        }
    }
    format!("{}.{}", whole, fraction)
}

/// Parses a decimal coin amount into atomic units
///
/// At most `DISPLAY_DECIMAL_POINT` fractional digits are accepted, ignoring trailing zeros
pub fn parse_amount(text: &str) -> Result<u64> {
    let invalid = || Error::InvalidAmountString(text.to_string());
    let trimmed = text.trim();
    let (whole, fraction) = match trimmed.find('.') {
        Some(point) => (&trimmed[..point], &trimmed[point + 1..]),
        None => (trimmed, ""),
    };
    if (whole.is_empty() && fraction.is_empty())
        || !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }
    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > DISPLAY_DECIMAL_POINT {
        return Err(invalid());
    }

    let mut digits = String::with_capacity(whole.len() + DISPLAY_DECIMAL_POINT);
    digits.push_str(whole);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat('0').take(DISPLAY_DECIMAL_POINT - fraction.len()));
    digits.parse::<u64>().map_err(|_| invalid())
}
