//! # Operation Error Types
//!
//! The error taxonomy surfaced by lifecycle operations.
//!
//! ## Error Flow
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                     Error Propagation                              │
//! │                                                                    │
//! │  ValidationError / CoreError (labada-core)                         │
//! │       │                                                            │
//! │       ▼                                                            │
//! │  OpsError (this module) ← categorized for callers                  │
//! │       │                                                            │
//! │       ▼                                                            │
//! │  Transport layer maps to its own response codes (out of scope)     │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Categorization Contract
//! - `Validation` and `NotFound` fire before any mutation is attempted
//! - `StateConflict` is detected before any write, never after a partial
//!   one; it also covers a lost optimistic-precondition race
//! - `DependentFailure` aborts the whole operation and carries the
//!   per-product failure list for the caller to render
//! - `Internal` is opaque; the order is never left half-written

use thiserror::Error;

use labada_core::{CoreError, ValidationError};

use crate::collaborators::FailedProduct;

/// Lifecycle operation errors.
#[derive(Debug, Error)]
pub enum OpsError {
    /// Caller input is missing or malformed. No mutation was attempted.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// An identifier did not resolve. No mutation was attempted.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The order is not in the source state the operation requires, or a
    /// concurrent mutation won the race.
    #[error("State conflict: {0}")]
    StateConflict(String),

    /// Inventory deduction reported failures; the entire operation was
    /// aborted with no local state change.
    #[error("Inventory deduction failed for {} product(s)", failed.len())]
    DependentFailure { failed: Vec<FailedProduct> },

    /// Persistence or other unexpected failure. Either the full operation
    /// committed or nothing did.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for OpsError {
    fn from(err: ValidationError) -> Self {
        OpsError::Validation(err.to_string())
    }
}

/// Business rule failures from the core map onto the operation taxonomy:
/// bad input stays Validation, unresolved references become NotFound, and
/// every transition/gate refusal is a StateConflict.
impl From<CoreError> for OpsError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => OpsError::Validation(v.to_string()),
            CoreError::ServiceUnavailable { .. } => OpsError::Validation(err.to_string()),
            CoreError::ProductNotFound(id) => OpsError::NotFound {
                entity: "product",
                id,
            },
            CoreError::BasketNotFound(n) => OpsError::NotFound {
                entity: "basket",
                id: n.to_string(),
            },
            CoreError::ServiceNotSelected { .. }
            | CoreError::InvalidOrderStatus { .. }
            | CoreError::InvalidServiceTransition { .. }
            | CoreError::InvalidStageTransition { .. }
            | CoreError::PickupNotFinished
            | CoreError::ServiceSequenceBlocked { .. }
            | CoreError::DeliveryBlocked { .. } => OpsError::StateConflict(err.to_string()),
        }
    }
}

/// Convenience type alias for Results with OpsError.
pub type OpsResult<T> = Result<T, OpsError>;

// =============================================================================
// Unit Tests
// =============================================================================
