//! Input validation helpers.
//!
//! Validation happens before any store or cache interaction so a bad
//! request never reaches the database.

use rust_decimal::Decimal;
use shopfeed_core::ValidationError;

/// Require a field to contain at least one non-whitespace character.
pub fn require_non_blank(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::RequiredFieldMissing {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Require a price to be non-negative.
pub fn require_non_negative_price(price: Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        return Err(ValidationError::InvalidValue {
            field: "price".to_string(),
            reason: format!("must not be negative, got {price}"),
        });
    }
    Ok(())
}
