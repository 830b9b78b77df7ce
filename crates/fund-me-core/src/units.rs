//! Decimal amount to base unit conversion.

use alloy::primitives::utils::{parse_units, ParseUnits};
use alloy::primitives::U256;

use crate::ports::PortError;

/// Parses a user-entered decimal amount into base units.
///
/// Accepts surrounding whitespace, `1`, `1.5`, `.5` and `1.`. Rejects empty
/// input, signs, exponents and more fractional digits than `decimals`.
pub fn parse_amount(raw: &str, decimals: u8) -> Result<U256, PortError> {
    let amount = raw.trim();
    check_decimal(amount, decimals)?;
    match parse_units(amount, decimals)
        .map_err(|e| PortError::Validation(format!("invalid amount '{amount}': {e}")))?
    {
        ParseUnits::U256(value) => Ok(value),
        ParseUnits::I256(_) => Err(PortError::Validation(format!(
            "amount must not be negative: {amount}"
        ))),
    }
}

fn check_decimal(amount: &str, decimals: u8) -> Result<(), PortError> {
    if amount.is_empty() {
        return Err(PortError::Validation("amount is empty".to_owned()));
    }
    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount, ""),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) || (whole.is_empty() && fraction.is_empty()) {
        return Err(PortError::Validation(format!(
            "amount is not a decimal number: {amount}"
        )));
    }
    if fraction.len() > usize::from(decimals) {
        return Err(PortError::Validation(format!(
            "amount has more than {decimals} fractional digits: {amount}"
        )));
    }
    Ok(())
}
