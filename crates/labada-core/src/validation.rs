//! # Validation Module
//!
//! Input validation for order requests.
//!
//! Validation runs before any business logic or mutation: a request that
//! fails here leaves the order untouched. Business rule checks (state
//! gates, sequencing) live with the state machine, not here.

use crate::error::ValidationError;
use crate::MAX_BASKET_WEIGHT_KG;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a customer or staff reference.
///
/// ## Rules
/// - Must not be empty
/// - Maximum 64 characters
pub fn validate_reference(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > 64 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 64,
        });
    }

    Ok(())
}

/// Validates a UUID-formatted identifier.
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Validates free-text notes.
///
/// ## Rules
/// - Optional; empty is fine
/// - Maximum 500 characters
pub fn validate_notes(notes: &str) -> ValidationResult<()> {
    if notes.len() > 500 {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: 500,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a basket weight input in kilograms.
///
/// ## Rules
/// - Must be finite and non-negative (0 allowed: an empty basket)
/// - No upper bound here: overweight inputs are not rejected, the
///   auto-partitioner splits them into sibling baskets instead
pub fn validate_weight_input(weight_kg: f64) -> ValidationResult<()> {
    if !weight_kg.is_finite() || weight_kg < 0.0 {
        return Err(ValidationError::WeightOutOfRange {
            field: "weight_kg".to_string(),
            max_kg: MAX_BASKET_WEIGHT_KG,
        });
    }

    Ok(())
}

/// Validates a settled per-basket weight (after partitioning).
pub fn validate_basket_weight(weight_kg: f64) -> ValidationResult<()> {
    if !weight_kg.is_finite() || weight_kg < 0.0 || weight_kg > MAX_BASKET_WEIGHT_KG {
        return Err(ValidationError::WeightOutOfRange {
            field: "weight_kg".to_string(),
            max_kg: MAX_BASKET_WEIGHT_KG,
        });
    }

    Ok(())
}

/// Validates a product quantity.
pub fn validate_quantity(qty: u32) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > 999 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: 999,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
