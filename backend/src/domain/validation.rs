//! Input parsing shared by the domain services.
//!
//! Amounts and odometer readings arrive as typed form text. Anything blank,
//! non-numeric or out of range is refused here, before any state is touched.

use shared::AmountInput;

use super::errors::{LedgerError, LedgerResult};

/// Parse a strictly positive amount (expenses, platform totals)
pub fn parse_positive(input: &AmountInput, field: &str) -> LedgerResult<f64> {
    match input.value() {
        Some(value) if value > 0.0 => Ok(value),
        Some(value) => Err(LedgerError::invalid_input(format!(
            "{} must be greater than zero, got {}",
            field, value
        ))),
        None => Err(LedgerError::invalid_input(format!(
            "{} must be a number",
            field
        ))),
    }
}

/// Parse a reading that may be zero but never negative (odometer values)
pub fn parse_non_negative(input: &AmountInput, field: &str) -> LedgerResult<f64> {
    match input.value() {
        Some(value) if value >= 0.0 => Ok(value),
        Some(value) => Err(LedgerError::invalid_input(format!(
            "{} cannot be negative, got {}",
            field, value
        ))),
        None => Err(LedgerError::invalid_input(format!(
            "{} must be a number",
            field
        ))),
    }
}

/// Trimmed, non-empty text of bounded length
pub fn require_text(text: &str, field: &str, max_len: usize) -> LedgerResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::invalid_input(format!("{} cannot be empty", field)));
    }
    if trimmed.chars().count() > max_len {
        return Err(LedgerError::invalid_input(format!(
            "{} cannot exceed {} characters",
            field, max_len
        )));
    }
    Ok(trimmed.to_string())
}
