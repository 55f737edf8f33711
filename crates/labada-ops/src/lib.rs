//! # labada-ops: Order Lifecycle Operations
//!
//! Async orchestration layer over [`labada_core`]. The business rules
//! live in the core crate; this crate drives them against the external
//! collaborators an order touches along the way.
//!
//! ## Architecture Position
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │              Callers (HTTP routing, staff UIs)                     │
//! └───────────────────────────────┬────────────────────────────────────┘
//!                                 │
//! ┌───────────────────────────────▼────────────────────────────────────┐
//! │                 ★ labada-ops (THIS CRATE) ★                        │
//! │                                                                    │
//! │   OrderProcessor                                                   │
//! │   ├── create_order      weigh-in, partition, snapshot, price       │
//! │   ├── approve_order     payment + inventory gate, all-or-nothing   │
//! │   ├── reject_order      cancellation record                        │
//! │   ├── modify_order      wholesale re-price                         │
//! │   └── advance_*         service / stage state machine steps        │
//! │                                                                    │
//! │   Collaborator traits: OrderStore, InventoryService,               │
//! │   StaffDirectory, NotificationDispatcher, CatalogSource            │
//! └───────────────────────────────┬────────────────────────────────────┘
//!                                 │
//! ┌───────────────────────────────▼────────────────────────────────────┐
//! │                   labada-core (pure rules)                         │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Consistency Contract
//! Every operation either commits fully or writes nothing. Source-state
//! checks run before any mutation, persistence uses an expected-status
//! precondition to catch concurrent writers, and only notification
//! dispatch is best-effort.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod collaborators;
pub mod error;
pub mod memory;
pub mod processor;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use collaborators::{
    CatalogSource, DeductionItem, DeductionResult, FailedProduct, InventoryService, NoticeKind,
    NotificationDispatcher, OrderNotice, OrderStore, StaffDirectory,
};
pub use error::{OpsError, OpsResult};
pub use processor::{
    AddressRequest, ApprovalOutcome, BasketRequest, CreateOrderRequest, ModifyOrderRequest,
    OrderProcessor, ServiceStep, StageStep,
};
