//! # labada-core: Pure Order-Processing Logic for Labada
//!
//! This crate is the **heart** of the Labada laundry backend. It contains
//! all order-processing business rules as pure functions and value types
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                      Labada Architecture                           │
//! │                                                                    │
//! │  ┌──────────────────────────────────────────────────────────────┐ │
//! │  │              Callers (HTTP routing, staff UIs)               │ │
//! │  └───────────────────────────────┬──────────────────────────────┘ │
//! │                                  │                                 │
//! │  ┌───────────────────────────────▼──────────────────────────────┐ │
//! │  │                 labada-ops (Lifecycle Operations)            │ │
//! │  │   create, approve, reject, modify, advance + collaborators   │ │
//! │  └───────────────────────────────┬──────────────────────────────┘ │
//! │                                  │                                 │
//! │  ┌───────────────────────────────▼──────────────────────────────┐ │
//! │  │              ★ labada-core (THIS CRATE) ★                    │ │
//! │  │                                                              │ │
//! │  │  ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌────────┐ ┌───────┐ │ │
//! │  │  │  types  │ │  money  │ │ breakdown │ │ status │ │ audit │ │ │
//! │  │  │  Order  │ │  Money  │ │  pricing  │ │ gates  │ │ trail │ │ │
//! │  │  │ Basket  │ │ TaxRate │ │  builder  │ │ rules  │ │       │ │ │
//! │  │  └─────────┘ └─────────┘ └───────────┘ └────────┘ └───────┘ │ │
//! │  │                                                              │ │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │ │
//! │  └──────────────────────────────────────────────────────────────┘ │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, Basket, Service, Stage, Breakdown)
//! - [`money`] - Money type with integer centavo arithmetic (no floats!)
//! - [`catalog`] - Pricing catalog lookup and configuration
//! - [`breakdown`] - Financial breakdown builder (inclusive VAT)
//! - [`basket`] - Basket weight auto-partitioner
//! - [`status`] - Service / stage / order state machines
//! - [`audit`] - Append-only audit trail
//! - [`validation`] - Input validation
//! - [`clock`] - Injected time source
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic - same input = same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are centavos (i64)
//! 4. **Snapshot Pricing**: rates freeze at order creation, never re-read
//! 5. **Explicit Errors**: typed errors, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use labada_core::money::{Money, TaxRate};
//!
//! // Create money from centavos (never from floats!)
//! let total = Money::from_centavos(11200); // ₱112.00, VAT-inclusive
//!
//! // Extract the inclusive 12% VAT contained in the total
//! let tax = total.extract_inclusive_tax(TaxRate::from_bps(1200));
//! assert_eq!(tax.centavos(), 1200); // ₱12.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod audit;
pub mod basket;
pub mod breakdown;
pub mod catalog;
pub mod clock;
pub mod error;
pub mod money;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use labada_core::Money` instead of
// `use labada_core::money::Money`

pub use audit::{AuditAction, AuditEntry, AuditTrail};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, TaxRate};
pub use status::NextAction;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum laundry weight a single basket may hold, in kilograms.
///
/// ## Business Reason
/// One basket maps to one machine load. Weigh-ins above this are never
/// rejected; the auto-partitioner splits them into sibling baskets.
pub const MAX_BASKET_WEIGHT_KG: f64 = 8.0;
