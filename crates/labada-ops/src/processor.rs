//! # Order Lifecycle Operations
//!
//! `OrderProcessor` drives every mutation of an order: create, approve,
//! reject, modify, and the service/stage advance operations. Each call
//! follows the same shape:
//!
//! ```text
//! validate input ─▶ resolve references ─▶ load order
//!      ─▶ check source state ─▶ apply core transition
//!      ─▶ persist (expected-status precondition) ─▶ notify (best effort)
//! ```
//!
//! Validation and Not Found fire before any mutation. State conflicts are
//! detected before any write, both locally (source-state check) and at
//! the store (optimistic precondition), so a lost race never half-writes.
//! Notification dispatch is fire-and-forget: failures are logged and
//! swallowed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use labada_core::basket::partition_weights;
use labada_core::breakdown::{
    build_breakdown, materialize_products, materialize_services, BreakdownOptions,
    ProductSelection,
};
use labada_core::catalog::{CatalogEntry, PricingConfig};
use labada_core::validation::{validate_notes, validate_reference, validate_uuid};
use labada_core::{
    AuditAction, Basket, Clock, GeoPoint, Handling, Money, Order, OrderOrigin, OrderStatus,
    ServiceKind, ServiceSelection, Stage, StageKind, ValidationError,
};

use crate::collaborators::{
    CatalogSource, DeductionItem, DeductionResult, InventoryService, NotificationDispatcher,
    NoticeKind, OrderNotice, OrderStore, StaffDirectory,
};
use crate::error::{OpsError, OpsResult};

// =============================================================================
// Request / Response Types
// =============================================================================

/// A pickup or delivery address as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRequest {
    pub address: String,
    pub coordinates: Option<GeoPoint>,
}

/// One basket as submitted at creation or modification. Overweight input
/// is partitioned into multiple baskets, never rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketRequest {
    pub weight_kg: f64,
    pub notes: Option<String>,
    pub selection: ServiceSelection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub origin: OrderOrigin,
    pub customer_id: String,
    /// Required for counter orders; app orders have no cashier until
    /// approval.
    pub cashier_id: Option<String>,
    pub products: Vec<ProductSelection>,
    pub baskets: Vec<BasketRequest>,
    /// None = in-store drop-off.
    pub pickup: Option<AddressRequest>,
    /// None = in-store claim. Present = delivery order, delivery fee due.
    pub delivery: Option<AddressRequest>,
    pub staff_service_requested: bool,
    pub delivery_fee_override: Option<Money>,
    pub loyalty_discount: Money,
}

/// Replacement selections for a modify operation. The breakdown is
/// recomputed from these wholesale; there is no partial-field patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifyOrderRequest {
    pub products: Vec<ProductSelection>,
    pub baskets: Vec<BasketRequest>,
    pub staff_service_requested: bool,
    pub delivery_fee_override: Option<Money>,
    pub loyalty_discount: Money,
}

/// Which service transition to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStep {
    Start,
    Complete,
    Skip,
}

/// Which stage transition to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStep {
    Start,
    Complete,
}

/// Result of a successful approval: the updated order plus the inventory
/// outcome broken into succeeded/failed lines for the caller to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalOutcome {
    pub order: Order,
    pub deduction: DeductionResult,
}

// =============================================================================
// Order Processor
// =============================================================================

/// Orchestrates lifecycle operations against the collaborator seams.
pub struct OrderProcessor {
    store: Arc<dyn OrderStore>,
    inventory: Arc<dyn InventoryService>,
    staff: Arc<dyn StaffDirectory>,
    notifications: Arc<dyn NotificationDispatcher>,
    catalog: Arc<dyn CatalogSource>,
    config: PricingConfig,
    clock: Arc<dyn Clock>,
}

impl OrderProcessor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn OrderStore>,
        inventory: Arc<dyn InventoryService>,
        staff: Arc<dyn StaffDirectory>,
        notifications: Arc<dyn NotificationDispatcher>,
        catalog: Arc<dyn CatalogSource>,
        config: PricingConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        OrderProcessor {
            store,
            inventory,
            staff,
            notifications,
            catalog,
            config,
            clock,
        }
    }

    /// Creates an order: partitions weights, freezes price snapshots,
    /// builds the breakdown, and persists.
    ///
    /// Counter orders start Processing immediately; app orders start
    /// Pending and must pass through approve or reject.
    pub async fn create_order(&self, request: CreateOrderRequest) -> OpsResult<Order> {
        debug!(customer_id = %request.customer_id, origin = ?request.origin, "create_order");

        validate_reference("customer_id", &request.customer_id)
            .map_err(OpsError::from)?;
        match (&request.origin, &request.cashier_id) {
            (OrderOrigin::Counter, None) => {
                return Err(OpsError::Validation(
                    "cashier_id is required for counter orders".to_string(),
                ));
            }
            (_, Some(cashier_id)) => {
                self.resolve_staff(cashier_id).await?;
            }
            _ => {}
        }
        if request.baskets.is_empty() && request.products.is_empty() {
            return Err(OpsError::Validation(
                "order must contain at least one basket or product".to_string(),
            ));
        }

        let service_catalog = self.catalog.active_services().await?;
        let product_catalog = self.catalog.active_products().await?;

        let products = materialize_products(&product_catalog, &request.products)?;
        let baskets = self.build_baskets(&request.baskets, &service_catalog)?;

        let handling = Handling {
            pickup: stage_from(request.pickup),
            delivery: stage_from(request.delivery),
        };
        let options = BreakdownOptions {
            staff_service_requested: request.staff_service_requested,
            is_delivery: handling.is_delivery(),
            delivery_fee_override: request.delivery_fee_override,
            loyalty_discount: request.loyalty_discount,
        };
        let breakdown = build_breakdown(&products, &baskets, &options, &self.config);

        let order = Order::new(
            Uuid::new_v4().to_string(),
            request.origin,
            request.customer_id,
            request.cashier_id,
            products,
            baskets,
            handling,
            breakdown,
            self.clock.now(),
        );

        self.store.insert(&order).await?;
        self.notify(&order, NoticeKind::Created).await;

        info!(
            order_id = %order.id,
            status = ?order.status,
            total = %order.total_amount,
            baskets = order.baskets.len(),
            "order created"
        );
        Ok(order)
    }

    /// Approves a pending app order after verifying payment and deducting
    /// inventory.
    ///
    /// All-or-nothing: any failed product line aborts the approval with
    /// the order untouched, and the failure list is returned to the
    /// caller inside the error.
    pub async fn approve_order(
        &self,
        order_id: &str,
        staff_id: &str,
        gcash_verified: bool,
        notes: Option<String>,
    ) -> OpsResult<ApprovalOutcome> {
        debug!(order_id, staff_id, gcash_verified, "approve_order");

        validate_uuid("order_id", order_id).map_err(OpsError::from)?;
        self.resolve_staff(staff_id).await?;
        if let Some(notes) = &notes {
            validate_notes(notes).map_err(OpsError::from)?;
        }

        let mut order = self.load_order(order_id).await?;
        if order.origin != OrderOrigin::MobileApp {
            return Err(OpsError::Validation(
                "approve applies only to app-origin orders".to_string(),
            ));
        }
        if order.status != OrderStatus::Pending {
            return Err(OpsError::StateConflict(format!(
                "order {} is {:?}, approve requires Pending",
                order.id, order.status
            )));
        }

        let deduction = if order.products.is_empty() {
            DeductionResult::empty()
        } else {
            let items: Vec<DeductionItem> = order
                .products
                .iter()
                .map(|line| DeductionItem {
                    product_id: line.product_id.clone(),
                    product_name: line.name.clone(),
                    quantity: line.quantity,
                })
                .collect();
            self.inventory.deduct(order_id, &items).await?
        };
        if !deduction.failed.is_empty() {
            warn!(
                order_id,
                failed = deduction.failed.len(),
                "inventory deduction failed, approval aborted"
            );
            return Err(OpsError::DependentFailure {
                failed: deduction.failed,
            });
        }

        order.approve(staff_id.to_string(), gcash_verified, notes, self.clock.now())?;
        self.store.replace(&order, OrderStatus::Pending).await?;
        self.notify(&order, NoticeKind::Approved).await;

        info!(order_id, staff_id, "order approved");
        Ok(ApprovalOutcome { order, deduction })
    }

    /// Rejects a pending app order, attaching a cancellation record.
    pub async fn reject_order(
        &self,
        order_id: &str,
        staff_id: &str,
        reason: &str,
        notes: Option<String>,
    ) -> OpsResult<Order> {
        debug!(order_id, staff_id, reason, "reject_order");

        validate_uuid("order_id", order_id).map_err(OpsError::from)?;
        self.resolve_staff(staff_id).await?;
        if reason.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "reason".to_string(),
            }
            .into());
        }
        if reason.len() > 500 {
            return Err(ValidationError::TooLong {
                field: "reason".to_string(),
                max: 500,
            }
            .into());
        }
        if let Some(notes) = &notes {
            validate_notes(notes).map_err(OpsError::from)?;
        }

        let mut order = self.load_order(order_id).await?;
        if order.origin != OrderOrigin::MobileApp {
            return Err(OpsError::Validation(
                "reject applies only to app-origin orders".to_string(),
            ));
        }
        if order.status != OrderStatus::Pending {
            return Err(OpsError::StateConflict(format!(
                "order {} is {:?}, reject requires Pending",
                order.id, order.status
            )));
        }

        order.cancel(
            reason.to_string(),
            notes,
            Some(staff_id.to_string()),
            self.clock.now(),
        )?;
        self.store.replace(&order, OrderStatus::Pending).await?;
        self.notify(&order, NoticeKind::Rejected).await;

        info!(order_id, staff_id, reason, "order rejected");
        Ok(order)
    }

    /// Replaces the order's selections and re-prices it wholesale.
    ///
    /// Permitted while the order is not yet terminal. The previous and
    /// new totals are recorded in the audit trail.
    pub async fn modify_order(
        &self,
        order_id: &str,
        staff_id: &str,
        request: ModifyOrderRequest,
    ) -> OpsResult<Order> {
        debug!(order_id, staff_id, "modify_order");

        validate_uuid("order_id", order_id).map_err(OpsError::from)?;
        self.resolve_staff(staff_id).await?;
        if request.baskets.is_empty() && request.products.is_empty() {
            return Err(OpsError::Validation(
                "order must contain at least one basket or product".to_string(),
            ));
        }

        let mut order = self.load_order(order_id).await?;
        if order.status.is_terminal() {
            return Err(OpsError::StateConflict(format!(
                "order {} is {:?} and can no longer be modified",
                order.id, order.status
            )));
        }
        let expected_status = order.status;

        let service_catalog = self.catalog.active_services().await?;
        let product_catalog = self.catalog.active_products().await?;
        let products = materialize_products(&product_catalog, &request.products)?;
        let baskets = self.build_baskets(&request.baskets, &service_catalog)?;

        let options = BreakdownOptions {
            staff_service_requested: request.staff_service_requested,
            is_delivery: order.handling.is_delivery(),
            delivery_fee_override: request.delivery_fee_override,
            loyalty_discount: request.loyalty_discount,
        };
        let breakdown = build_breakdown(&products, &baskets, &options, &self.config);

        let previous_total = order.total_amount;
        order.products = products;
        order.baskets = baskets;
        order.replace_breakdown(breakdown);
        order.audit_log.append(
            AuditAction::Modified {
                previous_total,
                new_total: order.total_amount,
            },
            Some(staff_id.to_string()),
            self.clock.now(),
        );

        self.store.replace(&order, expected_status).await?;
        self.notify(&order, NoticeKind::Modified).await;

        info!(
            order_id,
            staff_id,
            previous_total = %previous_total,
            new_total = %order.total_amount,
            "order modified"
        );
        Ok(order)
    }

    /// Advances one service of one basket through the state machine.
    pub async fn advance_service(
        &self,
        order_id: &str,
        basket_number: u32,
        kind: ServiceKind,
        step: ServiceStep,
        staff_id: &str,
    ) -> OpsResult<Order> {
        debug!(order_id, basket_number, ?kind, ?step, staff_id, "advance_service");

        validate_uuid("order_id", order_id).map_err(OpsError::from)?;
        self.resolve_staff(staff_id).await?;

        let mut order = self.load_order(order_id).await?;
        let expected_status = order.status;
        let now = self.clock.now();
        match step {
            ServiceStep::Start => {
                order.start_service(basket_number, kind, Some(staff_id.to_string()), now)?
            }
            ServiceStep::Complete => {
                order.complete_service(basket_number, kind, staff_id.to_string(), now)?
            }
            ServiceStep::Skip => {
                order.skip_service(basket_number, kind, staff_id.to_string(), now)?
            }
        }

        self.store.replace(&order, expected_status).await?;
        self.notify_advance(&order).await;

        info!(order_id, basket_number, ?kind, ?step, "service advanced");
        Ok(order)
    }

    /// Advances a pickup or delivery stage through the state machine.
    pub async fn advance_stage(
        &self,
        order_id: &str,
        stage: StageKind,
        step: StageStep,
        staff_id: &str,
    ) -> OpsResult<Order> {
        debug!(order_id, ?stage, ?step, staff_id, "advance_stage");

        validate_uuid("order_id", order_id).map_err(OpsError::from)?;
        self.resolve_staff(staff_id).await?;

        let mut order = self.load_order(order_id).await?;
        let expected_status = order.status;
        let now = self.clock.now();
        match step {
            StageStep::Start => order.start_stage(stage, Some(staff_id.to_string()), now)?,
            StageStep::Complete => order.complete_stage(stage, staff_id.to_string(), now)?,
        }

        self.store.replace(&order, expected_status).await?;
        self.notify_advance(&order).await;

        info!(order_id, ?stage, ?step, "stage advanced");
        Ok(order)
    }

    /// Loads an order for display.
    pub async fn get_order(&self, order_id: &str) -> OpsResult<Order> {
        validate_uuid("order_id", order_id).map_err(OpsError::from)?;
        self.load_order(order_id).await
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    async fn load_order(&self, order_id: &str) -> OpsResult<Order> {
        self.store
            .load(order_id)
            .await?
            .ok_or_else(|| OpsError::NotFound {
                entity: "order",
                id: order_id.to_string(),
            })
    }

    async fn resolve_staff(&self, staff_id: &str) -> OpsResult<()> {
        validate_reference("staff_id", staff_id).map_err(OpsError::from)?;
        if !self.staff.staff_exists(staff_id).await? {
            return Err(OpsError::NotFound {
                entity: "staff",
                id: staff_id.to_string(),
            });
        }
        Ok(())
    }

    /// Materializes basket requests into priced baskets, partitioning
    /// each overweight weigh-in until every piece fits the cap.
    fn build_baskets(
        &self,
        requests: &[BasketRequest],
        service_catalog: &[CatalogEntry],
    ) -> OpsResult<Vec<Basket>> {
        let mut baskets = Vec::new();
        let mut number = 1u32;
        for request in requests {
            if let Some(notes) = &request.notes {
                validate_notes(notes).map_err(OpsError::from)?;
            }
            let services =
                materialize_services(&request.selection, service_catalog, &self.config)?;
            let weights = partition_weights(request.weight_kg, self.config.max_basket_weight_kg)?;
            for (i, weight) in weights.into_iter().enumerate() {
                let mut basket = Basket::new(number, weight, request.notes.clone());
                basket.services = if i == 0 {
                    services.clone()
                } else {
                    services.iter().map(|s| s.fresh_copy()).collect()
                };
                basket.extra_dry_increments = request.selection.extra_dry_increments;
                baskets.push(basket);
                number += 1;
            }
        }
        Ok(baskets)
    }

    /// Fire-and-forget notification; failure is logged, never propagated.
    async fn notify(&self, order: &Order, kind: NoticeKind) {
        let notice = OrderNotice {
            order_id: order.id.clone(),
            customer_id: order.customer_id.clone(),
            kind,
        };
        if let Err(err) = self.notifications.dispatch(notice).await {
            warn!(order_id = %order.id, error = %err, "notification dispatch failed");
        }
    }

    async fn notify_advance(&self, order: &Order) {
        let kind = if order.status == OrderStatus::Completed {
            NoticeKind::Completed
        } else {
            NoticeKind::StatusAdvanced
        };
        self.notify(order, kind).await;
    }
}

fn stage_from(request: Option<AddressRequest>) -> Stage {
    match request {
        Some(r) => Stage::new(Some(r.address), r.coordinates),
        None => Stage::new(None, None),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
