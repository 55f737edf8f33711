//! # In-Memory Collaborators
//!
//! Reference implementations of the collaborator traits backed by plain
//! in-process state. They carry the same contracts as production backends
//! (notably the optimistic status precondition on replace) and are what
//! the integration tests and local development wiring use.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use labada_core::catalog::{CatalogEntry, ProductEntry};
use labada_core::{Order, OrderStatus};

use crate::collaborators::{
    CatalogSource, DeductionItem, DeductionResult, FailedProduct, InventoryService,
    NotificationDispatcher, OrderNotice, OrderStore, StaffDirectory,
};
use crate::error::{OpsError, OpsResult};

// =============================================================================
// Order Store
// =============================================================================

/// Orders held in a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: Mutex<HashMap<String, Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        MemoryOrderStore::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn load(&self, order_id: &str) -> OpsResult<Option<Order>> {
        let orders = self.orders.lock().await;
        Ok(orders.get(order_id).cloned())
    }

    async fn insert(&self, order: &Order) -> OpsResult<()> {
        let mut orders = self.orders.lock().await;
        if orders.contains_key(&order.id) {
            return Err(OpsError::Internal(format!(
                "order {} already exists",
                order.id
            )));
        }
        orders.insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn replace(&self, order: &Order, expected_status: OrderStatus) -> OpsResult<()> {
        let mut orders = self.orders.lock().await;
        let stored = orders.get(&order.id).ok_or_else(|| OpsError::NotFound {
            entity: "order",
            id: order.id.clone(),
        })?;

        // The optimistic precondition: stored status must match what the
        // caller read before mutating.
        if stored.status != expected_status {
            return Err(OpsError::StateConflict(format!(
                "order {} is {:?}, expected {:?}",
                order.id, stored.status, expected_status
            )));
        }

        orders.insert(order.id.clone(), order.clone());
        Ok(())
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// A fixed catalog snapshot.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    pub services: Vec<CatalogEntry>,
    pub products: Vec<ProductEntry>,
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn active_services(&self) -> OpsResult<Vec<CatalogEntry>> {
        Ok(self.services.clone())
    }

    async fn active_products(&self) -> OpsResult<Vec<ProductEntry>> {
        Ok(self.products.clone())
    }
}

// =============================================================================
// Staff Directory
// =============================================================================

/// Staff directory backed by a set of known ids.
#[derive(Debug, Clone, Default)]
pub struct StaticStaffDirectory {
    ids: HashSet<String>,
}

impl StaticStaffDirectory {
    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StaticStaffDirectory {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl StaffDirectory for StaticStaffDirectory {
    async fn staff_exists(&self, staff_id: &str) -> OpsResult<bool> {
        Ok(self.ids.contains(staff_id))
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// Inventory that deducts everything except a scripted set of failing
/// product ids. Lets tests drive the all-or-nothing approve gate.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInventory {
    failing: HashSet<String>,
}

impl ScriptedInventory {
    pub fn accepting_all() -> Self {
        ScriptedInventory::default()
    }

    pub fn failing_for<I, S>(product_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedInventory {
            failing: product_ids.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl InventoryService for ScriptedInventory {
    async fn deduct(&self, order_id: &str, items: &[DeductionItem]) -> OpsResult<DeductionResult> {
        debug!(order_id, items = items.len(), "inventory deduct");
        let mut deducted = Vec::new();
        let mut failed = Vec::new();
        for item in items {
            if self.failing.contains(&item.product_id) {
                failed.push(FailedProduct {
                    product_id: item.product_id.clone(),
                    product_name: item.product_name.clone(),
                    error: "insufficient stock".to_string(),
                });
            } else {
                deducted.push(item.clone());
            }
        }
        Ok(DeductionResult {
            success: failed.is_empty(),
            deducted,
            failed,
        })
    }
}

// =============================================================================
// Notifications
// =============================================================================

/// Dispatcher that records every notice it is handed.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<OrderNotice>>,
}

impl RecordingDispatcher {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingDispatcher::default())
    }

    pub async fn sent(&self) -> Vec<OrderNotice> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn dispatch(&self, notice: OrderNotice) -> OpsResult<()> {
        self.sent.lock().await.push(notice);
        Ok(())
    }
}

/// Dispatcher that always fails, for exercising the fire-and-forget rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingDispatcher;

#[async_trait]
impl NotificationDispatcher for FailingDispatcher {
    async fn dispatch(&self, notice: OrderNotice) -> OpsResult<()> {
        Err(OpsError::Internal(format!(
            "notification channel down for order {}",
            notice.order_id
        )))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
