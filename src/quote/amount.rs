//! Fixed-point amount arithmetic
//!
//! Amounts are integers in the asset's smallest unit. Rates are applied with
//! an overflow-free multiply-divide that floors, so a quote never promises
//! more than the integer math supports.

use crate::error::ValidationError;

/// Protocol fee in basis points (0.3%)
pub const FEE_BPS: u128 = 30;
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Slippage is applied in parts per million
pub const PPM: u128 = 1_000_000;

/// Parse a smallest-unit amount string into a positive integer
pub fn parse_amount(value: &str) -> Result<u128, ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidAmount {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    if value.starts_with('-') {
        return Err(invalid("must be positive"));
    }

    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        let amount = value
            .parse::<u128>()
            .map_err(|_| invalid("exceeds the supported range"))?;
        if amount == 0 {
            return Err(invalid("must be greater than zero"));
        }
        return Ok(amount);
    }

    match value.parse::<f64>() {
        Ok(_) => Err(invalid("must be a whole number in the smallest unit")),
        Err(_) => Err(invalid("not a number")),
    }
}

/// `value * numerator / denominator` without intermediate overflow.
///
/// Requires `numerator <= denominator`.
pub fn mul_div(value: u128, numerator: u128, denominator: u128) -> u128 {
    debug_assert!(numerator <= denominator && denominator > 0);
    (value / denominator) * numerator + (value % denominator) * numerator / denominator
}

pub fn fee_for(amount_in: u128) -> u128 {
    mul_div(amount_in, FEE_BPS, BPS_DENOMINATOR)
}

pub fn after_fee(amount_in: u128) -> u128 {
    mul_div(amount_in, BPS_DENOMINATOR - FEE_BPS, BPS_DENOMINATOR)
}

/// Convert a fractional tolerance in [0, 1] to parts per million
pub fn slippage_ppm(tolerance: f64) -> u128 {
    (tolerance.clamp(0.0, 1.0) * PPM as f64).round() as u128
}

/// Apply the worst-case slippage haircut
pub fn apply_slippage(amount: u128, tolerance: f64) -> u128 {
    mul_div(amount, PPM - slippage_ppm(tolerance), PPM)
}

/// Display `value` scaled by `decimals`, truncated to two places
pub fn format_display(value: u128, decimals: u32) -> String {
    let (whole, cents) = match 10u128.checked_pow(decimals) {
        Some(scale) if scale >= 100 => (value / scale, mul_div(value % scale, 100, scale)),
        Some(scale) => (value / scale, (value % scale) * 100 / scale),
        None => (0, 0),
    };
    format!("{}.{:02}", whole, cents)
}
