//! # Error Types
//!
//! Domain-specific error types for labada-core.
//!
//! ## Error Hierarchy
//! ```text
//! labada-core errors (this file)
//! ├── CoreError        - Business rule violations (bad transition, gate)
//! └── ValidationError  - Input validation failures
//!
//! labada-ops errors (separate crate)
//! └── OpsError         - Operation taxonomy surfaced to callers
//!
//! Flow: ValidationError → CoreError → OpsError → caller
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (basket number, service, status)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::types::{OrderStatus, ServiceKind, ServiceStatus, StageKind, StageStatus};

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Order is not in the status the operation requires.
    #[error("Order is {actual:?}, operation requires {required:?}")]
    InvalidOrderStatus {
        required: OrderStatus,
        actual: OrderStatus,
    },

    /// Service transition not allowed from the current status.
    ///
    /// Service statuses are forward-only: once Completed or Skipped a
    /// service never returns to Pending or InProgress.
    #[error("Service {kind:?} in basket {basket_number} is {from:?}, cannot move to {to:?}")]
    InvalidServiceTransition {
        basket_number: u32,
        kind: ServiceKind,
        from: ServiceStatus,
        to: ServiceStatus,
    },

    /// Handling stage transition not allowed from the current status.
    #[error("{stage:?} stage is {from:?}, cannot move to {to:?}")]
    InvalidStageTransition {
        stage: StageKind,
        from: StageStatus,
        to: StageStatus,
    },

    /// Pickup has not reached a terminal state yet.
    #[error("Pickup must complete before basket services can start")]
    PickupNotFinished,

    /// An earlier service in the wash→spin→dry→iron→fold sequence is
    /// still open for this basket.
    #[error("Service {blocking:?} in basket {basket_number} must finish before {kind:?} starts")]
    ServiceSequenceBlocked {
        basket_number: u32,
        kind: ServiceKind,
        blocking: ServiceKind,
    },

    /// Delivery may only start once every selected service of every
    /// basket is completed or skipped.
    #[error("Delivery blocked: basket {basket_number} still has {open} open service(s)")]
    DeliveryBlocked { basket_number: u32, open: usize },

    /// Basket not found on the order.
    #[error("Basket {0} not found on order")]
    BasketNotFound(u32),

    /// Service not selected for the basket.
    #[error("Service {kind:?} not selected for basket {basket_number}")]
    ServiceNotSelected {
        basket_number: u32,
        kind: ServiceKind,
    },

    /// A selected service resolved to no active catalog entry.
    ///
    /// The catalog lookup itself returns a zero-valued snapshot; callers
    /// surface it as this error instead of silently charging zero.
    #[error("No active catalog price for {kind:?} (tier {tier:?})")]
    ServiceUnavailable {
        kind: ServiceKind,
        tier: Option<crate::types::ServiceTier>,
    },

    /// Product not found in the catalog.
    #[error("Product not found in catalog: {0}")]
    ProductNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Weight is outside the allowed range.
    #[error("{field} must be between 0 and {max_kg} kg")]
    WeightOutOfRange { field: String, max_kg: f64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidOrderStatus {
            required: OrderStatus::Pending,
            actual: OrderStatus::Processing,
        };
        assert_eq!(
            err.to_string(),
            "Order is Processing, operation requires Pending"
        );

        let err = CoreError::DeliveryBlocked {
            basket_number: 2,
            open: 3,
        };
        assert_eq!(
            err.to_string(),
            "Delivery blocked: basket 2 still has 3 open service(s)"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customer_id".to_string(),
        };
        assert_eq!(err.to_string(), "customer_id is required");

        let err = ValidationError::WeightOutOfRange {
            field: "weight_kg".to_string(),
            max_kg: 8.0,
        };
        assert_eq!(err.to_string(), "weight_kg must be between 0 and 8 kg");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "customer_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
