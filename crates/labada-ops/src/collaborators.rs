//! # External Collaborator Contracts
//!
//! Trait-shaped seams for everything the lifecycle operations consume but
//! do not own: persistence, inventory deduction, the staff directory,
//! notification dispatch, and the pricing catalog source.
//!
//! The operations never talk to a concrete backend. Production wires real
//! implementations; tests wire the in-memory ones from [`crate::memory`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use labada_core::catalog::{CatalogEntry, ProductEntry};
use labada_core::{Order, OrderStatus};

use crate::error::OpsResult;

// =============================================================================
// Persistence
// =============================================================================

/// Order persistence with optimistic conflict detection.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Loads an order by id. `Ok(None)` when the id does not resolve.
    async fn load(&self, order_id: &str) -> OpsResult<Option<Order>>;

    /// Inserts a newly created order.
    async fn insert(&self, order: &Order) -> OpsResult<()>;

    /// Atomically replaces a stored order, guarded by a "current status
    /// must equal `expected_status`" precondition. A failed precondition
    /// is a `StateConflict`: the caller lost a concurrent race and must
    /// not retry blindly.
    async fn replace(&self, order: &Order, expected_status: OrderStatus) -> OpsResult<()>;
}

// =============================================================================
// Inventory Deduction
// =============================================================================

/// One product line submitted for stock deduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeductionItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
}

/// A product line the inventory subsystem could not deduct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedProduct {
    pub product_id: String,
    pub product_name: String,
    pub error: String,
}

/// Outcome of an inventory deduction call.
///
/// The operations treat this as atomic-or-fully-failed: any non-empty
/// `failed` list is a hard stop, partial success is never inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeductionResult {
    pub success: bool,
    pub deducted: Vec<DeductionItem>,
    pub failed: Vec<FailedProduct>,
}

impl DeductionResult {
    /// An empty deduction for orders carrying no product lines.
    pub fn empty() -> Self {
        DeductionResult {
            success: true,
            deducted: Vec::new(),
            failed: Vec::new(),
        }
    }
}

/// Black-box inventory subsystem, consumed by the approve operation.
#[async_trait]
pub trait InventoryService: Send + Sync {
    async fn deduct(&self, order_id: &str, items: &[DeductionItem]) -> OpsResult<DeductionResult>;
}

// =============================================================================
// Staff Directory
// =============================================================================

/// Resolves staff identifiers before an action is attributed to them.
/// A missing record is a validation failure, never a silent default.
#[async_trait]
pub trait StaffDirectory: Send + Sync {
    async fn staff_exists(&self, staff_id: &str) -> OpsResult<bool>;
}

// =============================================================================
// Notification Dispatch
// =============================================================================

/// What happened, from the customer's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Created,
    Approved,
    Rejected,
    Modified,
    StatusAdvanced,
    Completed,
}

/// An outbound customer notification about an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderNotice {
    pub order_id: String,
    pub customer_id: String,
    pub kind: NoticeKind,
}

/// Fire-and-forget outbound notifications.
///
/// Dispatch failure must never roll back or fail the triggering
/// operation; callers log the error and move on.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, notice: OrderNotice) -> OpsResult<()>;
}

// =============================================================================
// Catalog Source
// =============================================================================

/// Read-only source of active service and product definitions.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn active_services(&self) -> OpsResult<Vec<CatalogEntry>>;
    async fn active_products(&self) -> OpsResult<Vec<ProductEntry>>;
}
