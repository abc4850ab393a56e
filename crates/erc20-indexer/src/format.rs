use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::Error;
use crate::types::balance::parse_hex_quantity;

/// Magnitude suffixes, largest first, as powers of ten.
const SUFFIXES: [(u32, &str); 4] = [(12, "T"), (9, "B"), (6, "M"), (3, "K")];

/// Decimal places kept for values of at least one whole token.
const ROUND_PLACES: u8 = 4;

/// Format a hex-encoded raw balance for display.
pub fn format_balance(raw_balance: &str, decimals: u8) -> Result<String, Error> {
    let amount = parse_hex_quantity(raw_balance)
        .ok_or_else(|| Error::Unexpected(format!("invalid hex quantity {raw_balance:?}")))?;
    Ok(format_amount(&amount, decimals))
}

/// Format a raw token amount scaled by `decimals`.
///
/// Below one whole token the exact decimal expansion is returned. From one
/// upwards the value is rounded half-up to four places and abbreviated with
/// `K`, `M`, `B` or `T`. Zero formats as `"0"`.
pub fn format_amount(amount: &BigUint, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let scale = pow10(u32::from(decimals));
    if amount < &scale {
        return format_with_decimals(amount, decimals);
    }

    let whole = amount / &scale;
    let mut exponent = SUFFIXES
        .iter()
        .find(|(exp, _)| whole >= pow10(*exp))
        .map(|(exp, _)| *exp)
        .unwrap_or(0);

    let mut rounded = round_scaled(amount, &scale, exponent);
    // 999_999.99995 rounds to 1000.0000K; move it up to 1M
    while exponent < 12 && rounded >= pow10(3 + u32::from(ROUND_PLACES)) {
        exponent += 3;
        rounded = round_scaled(amount, &scale, exponent);
    }

    let suffix = SUFFIXES
        .iter()
        .find(|(exp, _)| *exp == exponent)
        .map(|(_, s)| *s)
        .unwrap_or("");
    format!("{}{suffix}", format_with_decimals(&rounded, ROUND_PLACES))
}

fn pow10(exponent: u32) -> BigUint {
    BigUint::from(10u32).pow(exponent)
}

/// `round(amount / (scale * 10^exponent) * 10^ROUND_PLACES)`, half-up.
fn round_scaled(amount: &BigUint, scale: &BigUint, exponent: u32) -> BigUint {
    let denominator = scale * pow10(exponent);
    let numerator = amount * pow10(u32::from(ROUND_PLACES));
    (numerator * 2u32 + &denominator) / (denominator * 2u32)
}

/// Shift the decimal point of `amount` left by `decimals`, trimming
/// trailing zeros.
fn format_with_decimals(amount: &BigUint, decimals: u8) -> String {
    let s = amount.to_string();
    let decimals = decimals as usize;

    if decimals == 0 {
        return s;
    }

    if s.len() <= decimals {
        let zeros = decimals - s.len();
        let mut result = String::from("0.");
        result.extend(std::iter::repeat('0').take(zeros));
        result.push_str(&s);
        let trimmed = result.trim_end_matches('0');
        if trimmed.ends_with('.') {
            return format!("{trimmed}0");
        }
        return trimmed.to_string();
    }

    let (integer_part, decimal_part) = s.split_at(s.len() - decimals);
    let trimmed = decimal_part.trim_end_matches('0');
    if trimmed.is_empty() {
        integer_part.to_string()
    } else {
        format!("{integer_part}.{trimmed}")
    }
}
