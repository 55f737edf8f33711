//! # Domain Types
//!
//! Core domain types for the Labada order-processing pipeline.
//!
//! ## Type Hierarchy
//! ```text
//! Order (root aggregate)
//! ├── Handling { pickup: Stage, delivery: Stage }
//! ├── Vec<ProductLine>            retail items, price-snapshotted
//! ├── Vec<Basket>                 weighed laundry units
//! │   └── Vec<Service>            wash / spin / dry / iron / fold
//! ├── Breakdown                   single source of financial truth
//! ├── PaymentRecord               GCash verification state
//! ├── Option<Cancellation>
//! └── AuditTrail                  append-only history
//! ```
//!
//! ## Price Snapshot Pattern
//! Every priced thing on an order (service rates, product prices) is
//! frozen at order-creation time. Catalog changes after checkout never
//! touch an existing order: the customer pays what was displayed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::{AuditAction, AuditTrail};
use crate::money::Money;

// =============================================================================
// Service Kinds and Tiers
// =============================================================================

/// The closed set of laundry treatments.
///
/// Declaration order is the fixed processing sequence within a basket:
/// wash → spin → dry → iron → fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Wash,
    Spin,
    Dry,
    Iron,
    Fold,
}

/// Fixed processing sequence used for timeline ordering and start gating.
pub const SERVICE_SEQUENCE: [ServiceKind; 5] = [
    ServiceKind::Wash,
    ServiceKind::Spin,
    ServiceKind::Dry,
    ServiceKind::Iron,
    ServiceKind::Fold,
];

impl ServiceKind {
    /// Human-readable label used in breakdown lines and audit context.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceKind::Wash => "Wash",
            ServiceKind::Spin => "Spin",
            ServiceKind::Dry => "Dry",
            ServiceKind::Iron => "Iron",
            ServiceKind::Fold => "Fold",
        }
    }

    /// Whether this kind carries a tier. Only wash and dry are tiered.
    pub fn is_tiered(&self) -> bool {
        matches!(self, ServiceKind::Wash | ServiceKind::Dry)
    }

    /// Position in the fixed processing sequence.
    pub fn sequence_index(&self) -> usize {
        match self {
            ServiceKind::Wash => 0,
            ServiceKind::Spin => 1,
            ServiceKind::Dry => 2,
            ServiceKind::Iron => 3,
            ServiceKind::Fold => 4,
        }
    }
}

/// Service tier for wash/dry machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceTier {
    Basic,
    Premium,
}

// =============================================================================
// Service / Stage Status
// =============================================================================

/// Status of a single service on a basket. Forward-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Pending,
    InProgress,
    Completed,
    Skipped,
}

impl ServiceStatus {
    /// Completed and Skipped are terminal; no transition leaves them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ServiceStatus::Completed | ServiceStatus::Skipped)
    }
}

impl Default for ServiceStatus {
    fn default() -> Self {
        ServiceStatus::Pending
    }
}

/// Status of a handling stage (pickup or delivery). Forward-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    InProgress,
    Completed,
    Skipped,
}

impl StageStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StageStatus::Completed | StageStatus::Skipped)
    }
}

/// Which handling stage an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Pickup,
    Delivery,
}

// =============================================================================
// Price Snapshot
// =============================================================================

/// A service or product rate captured at order-creation time.
///
/// Immutable thereafter, even if the live catalog changes. A zero-valued
/// snapshot means "no active catalog entry existed" and must be surfaced
/// by callers, never silently charged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub name: String,
    pub unit_price: Money,
    pub duration_minutes: u32,
}

impl PriceSnapshot {
    /// Zero-valued snapshot for a kind with no active catalog entry.
    pub fn unavailable(kind: ServiceKind) -> Self {
        PriceSnapshot {
            name: kind.label().to_string(),
            unit_price: Money::zero(),
            duration_minutes: 0,
        }
    }

    /// A zero price marks the underlying catalog entry as missing.
    pub fn is_unavailable(&self) -> bool {
        self.unit_price.is_zero()
    }
}

// =============================================================================
// Service
// =============================================================================

/// A single selected treatment applied to one basket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub kind: ServiceKind,
    /// Tier, present only for wash/dry.
    pub tier: Option<ServiceTier>,
    /// Pricing multiplier (machine cycles). 1 for standard selections.
    pub quantity: u32,
    /// Iron only: the weighed portion of the basket to be ironed.
    pub weight_kg: Option<f64>,
    /// Rate frozen at order creation.
    pub snapshot: PriceSnapshot,
    /// Priced contribution of this service to its basket.
    pub subtotal: Money,
    pub status: ServiceStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Staff member who completed or skipped the service.
    pub completed_by: Option<String>,
    /// Derived from started_at/completed_at; never authoritative input.
    pub duration_minutes: Option<i64>,
}

impl Service {
    pub fn new(
        kind: ServiceKind,
        tier: Option<ServiceTier>,
        quantity: u32,
        weight_kg: Option<f64>,
        snapshot: PriceSnapshot,
        subtotal: Money,
    ) -> Self {
        Service {
            kind,
            tier,
            quantity,
            weight_kg,
            snapshot,
            subtotal,
            status: ServiceStatus::Pending,
            started_at: None,
            completed_at: None,
            completed_by: None,
            duration_minutes: None,
        }
    }

    /// A fresh Pending copy of this service for a sibling basket created
    /// by the weight partitioner. Carries the same selection and snapshot
    /// but none of the progress state.
    pub fn fresh_copy(&self) -> Self {
        Service::new(
            self.kind,
            self.tier,
            self.quantity,
            self.weight_kg,
            self.snapshot.clone(),
            self.subtotal,
        )
    }
}

// =============================================================================
// Service Selection
// =============================================================================

/// Per-basket service choices as submitted at creation or modification.
///
/// An unselected service is simply absent from the basket afterwards; it
/// is never recorded as "skipped".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceSelection {
    pub wash: Option<ServiceTier>,
    pub spin: bool,
    pub dry: Option<ServiceTier>,
    /// Weighed iron load. Below the configured minimum this is silently
    /// treated as "no iron" rather than rejected.
    pub iron_weight_kg: Option<f64>,
    pub fold: bool,
    /// Additional dry-time in fixed increments, each a fixed charge.
    pub extra_dry_increments: u32,
}

// =============================================================================
// Basket
// =============================================================================

/// A physical unit of laundry within one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Basket {
    /// 1-based, unique within the order.
    pub basket_number: u32,
    /// Kilograms, bounded 0 to the configured maximum (8 kg) inclusive.
    pub weight_kg: f64,
    pub notes: Option<String>,
    /// Selected services in processing-sequence order.
    pub services: Vec<Service>,
    /// Extra dry-time increments selected for this basket.
    pub extra_dry_increments: u32,
    /// Set when the order is approved. Baskets approve as a unit.
    pub approved: bool,
}

impl Basket {
    pub fn new(basket_number: u32, weight_kg: f64, notes: Option<String>) -> Self {
        Basket {
            basket_number,
            weight_kg,
            notes,
            services: Vec::new(),
            extra_dry_increments: 0,
            approved: false,
        }
    }

    pub fn service(&self, kind: ServiceKind) -> Option<&Service> {
        self.services.iter().find(|s| s.kind == kind)
    }

    pub fn service_mut(&mut self, kind: ServiceKind) -> Option<&mut Service> {
        self.services.iter_mut().find(|s| s.kind == kind)
    }

    /// Services not yet completed or skipped.
    pub fn open_services(&self) -> impl Iterator<Item = &Service> {
        self.services.iter().filter(|s| !s.status.is_terminal())
    }

    /// True when every selected service is completed or skipped.
    pub fn all_services_terminal(&self) -> bool {
        self.services.iter().all(|s| s.status.is_terminal())
    }

    /// Sum of the priced service contributions.
    pub fn services_subtotal(&self) -> Money {
        self.services.iter().map(|s| s.subtotal).sum()
    }
}

// =============================================================================
// Handling Stages
// =============================================================================

/// Geographic coordinates attached to a pickup/delivery address.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// One leg of the handling pipeline (pickup or delivery).
///
/// A stage with no address is an in-store operation: it is Skipped at
/// construction and excluded from the visible timeline. A stage never
/// holds `completed_at` without `started_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// None = in-store (stage not applicable).
    pub address: Option<String>,
    pub coordinates: Option<GeoPoint>,
    pub status: StageStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<String>,
    /// Derived from started_at/completed_at; never authoritative input.
    pub duration_minutes: Option<i64>,
}

impl Stage {
    /// Builds a stage. In-store stages (no address) start out Skipped and
    /// never enter Pending or InProgress at all.
    pub fn new(address: Option<String>, coordinates: Option<GeoPoint>) -> Self {
        let status = if address.is_none() {
            StageStatus::Skipped
        } else {
            StageStatus::Pending
        };
        Stage {
            address,
            coordinates,
            status,
            started_at: None,
            completed_at: None,
            completed_by: None,
            duration_minutes: None,
        }
    }

    pub fn is_in_store(&self) -> bool {
        self.address.is_none()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// The pickup and delivery legs of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handling {
    pub pickup: Stage,
    pub delivery: Stage,
}

impl Handling {
    pub fn stage(&self, kind: StageKind) -> &Stage {
        match kind {
            StageKind::Pickup => &self.pickup,
            StageKind::Delivery => &self.delivery,
        }
    }

    pub fn stage_mut(&mut self, kind: StageKind) -> &mut Stage {
        match kind {
            StageKind::Pickup => &mut self.pickup,
            StageKind::Delivery => &mut self.delivery,
        }
    }

    /// Orders with a delivery address incur the delivery fee.
    pub fn is_delivery(&self) -> bool {
        self.delivery.address.is_some()
    }
}

// =============================================================================
// Financial Breakdown
// =============================================================================

/// A retail product line with name and price frozen at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLine {
    pub product_id: String,
    /// Name at time of sale (frozen).
    pub name: String,
    /// Unit price at time of sale (frozen).
    pub unit_price: Money,
    pub quantity: u32,
    /// unit_price × quantity.
    pub subtotal: Money,
}

/// Typed fee kinds. Fees are derived each time the breakdown is built,
/// never independently persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeKind {
    StaffService,
    Delivery,
    Tax,
}

/// A typed, described monetary amount on the breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fee {
    pub kind: FeeKind,
    pub description: String,
    pub amount: Money,
}

/// One priced line within a basket's breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketCharge {
    pub label: String,
    pub amount: Money,
}

/// The financial decomposition of a single basket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketBreakdown {
    pub basket_number: u32,
    pub weight_kg: f64,
    pub charges: Vec<BasketCharge>,
    pub subtotal: Money,
}

/// Aggregated totals.
///
/// Invariant: `total == subtotal_products + subtotal_services +
/// staff_service_fee + delivery_fee − loyalty_discount`. `tax_amount` is
/// extracted from that total (inclusive VAT), never added on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownSummary {
    pub subtotal_products: Money,
    pub subtotal_services: Money,
    pub staff_service_fee: Money,
    pub delivery_fee: Money,
    pub tax_amount: Money,
    pub loyalty_discount: Money,
    pub total: Money,
}

/// The complete, recomputable financial decomposition of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub products: Vec<ProductLine>,
    pub baskets: Vec<BasketBreakdown>,
    pub fees: Vec<Fee>,
    pub summary: BreakdownSummary,
}

// =============================================================================
// Order
// =============================================================================

/// Where the order was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderOrigin {
    /// Placed at the counter by a cashier; immediately processable.
    Counter,
    /// Placed through the self-service app; requires approval.
    MobileApp,
}

/// Authoritative top-level order status.
///
/// `pending → processing → completed`, with `cancelled` reachable from
/// any non-terminal state. Completed and Cancelled are terminal: no
/// further service or stage transition is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

/// Read-side status label used for UI grouping.
///
/// Derived from stage/service states; the stored [`OrderStatus`] remains
/// the single source of truth and nothing ever writes this back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayStatus {
    #[serde(rename = "for_approval")]
    ForApproval,
    #[serde(rename = "for_pick-up")]
    ForPickup,
    #[serde(rename = "in_process")]
    InProcess,
    #[serde(rename = "for_delivery")]
    ForDelivery,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "cancelled")]
    Cancelled,
}

/// GCash payment verification state, set during approval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub gcash_verified: bool,
    pub processed_at: Option<DateTime<Utc>>,
}

/// Attached when an order is rejected or cancelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cancellation {
    pub reason: String,
    pub notes: Option<String>,
    pub cancelled_by: Option<String>,
    pub cancelled_at: DateTime<Utc>,
}

/// The root aggregate: one customer order moving through the
/// pickup → service → delivery pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub origin: OrderOrigin,
    pub customer_id: String,
    /// Assigned at approval (or at creation for counter orders).
    pub cashier_id: Option<String>,
    pub status: OrderStatus,
    /// Always equals `breakdown.summary.total` at the time of last save.
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub handling: Handling,
    pub products: Vec<ProductLine>,
    pub baskets: Vec<Basket>,
    pub breakdown: Breakdown,
    pub payment: PaymentRecord,
    pub cancellation: Option<Cancellation>,
    pub audit_log: AuditTrail,
}

impl Order {
    /// Builds a new order and writes the Created audit entry.
    ///
    /// Counter orders are immediately eligible for processing; app orders
    /// start Pending and must pass through approve/reject first.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        origin: OrderOrigin,
        customer_id: String,
        cashier_id: Option<String>,
        products: Vec<ProductLine>,
        baskets: Vec<Basket>,
        handling: Handling,
        breakdown: Breakdown,
        now: DateTime<Utc>,
    ) -> Self {
        let status = match origin {
            OrderOrigin::Counter => OrderStatus::Processing,
            OrderOrigin::MobileApp => OrderStatus::Pending,
        };
        let total_amount = breakdown.summary.total;
        let mut audit_log = AuditTrail::new();
        audit_log.append(AuditAction::Created, cashier_id.clone(), now);

        Order {
            id,
            origin,
            customer_id,
            cashier_id,
            status,
            total_amount,
            created_at: now,
            approved_at: None,
            completed_at: None,
            cancelled_at: None,
            handling,
            products,
            baskets,
            breakdown,
            payment: PaymentRecord::default(),
            cancellation: None,
            audit_log,
        }
    }

    pub fn basket(&self, basket_number: u32) -> Option<&Basket> {
        self.baskets.iter().find(|b| b.basket_number == basket_number)
    }

    pub fn basket_mut(&mut self, basket_number: u32) -> Option<&mut Basket> {
        self.baskets
            .iter_mut()
            .find(|b| b.basket_number == basket_number)
    }

    /// Next unused 1-based basket number.
    pub fn next_basket_number(&self) -> u32 {
        self.baskets
            .iter()
            .map(|b| b.basket_number)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// True when every selected service of every basket is terminal.
    pub fn all_baskets_terminal(&self) -> bool {
        self.baskets.iter().all(|b| b.all_services_terminal())
    }

    /// Replaces the breakdown wholesale, keeping `total_amount` in step.
    /// The breakdown is the single source of financial truth.
    pub fn replace_breakdown(&mut self, breakdown: Breakdown) {
        self.total_amount = breakdown.summary.total;
        self.breakdown = breakdown;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_sequence_order() {
        assert_eq!(ServiceKind::Wash.sequence_index(), 0);
        assert_eq!(ServiceKind::Fold.sequence_index(), 4);
        for pair in SERVICE_SEQUENCE.windows(2) {
            assert!(pair[0].sequence_index() < pair[1].sequence_index());
        }
    }

    #[test]
    fn test_only_wash_and_dry_are_tiered() {
        assert!(ServiceKind::Wash.is_tiered());
        assert!(ServiceKind::Dry.is_tiered());
        assert!(!ServiceKind::Spin.is_tiered());
        assert!(!ServiceKind::Iron.is_tiered());
        assert!(!ServiceKind::Fold.is_tiered());
    }

    #[test]
    fn test_in_store_stage_starts_skipped() {
        let in_store = Stage::new(None, None);
        assert!(in_store.is_in_store());
        assert_eq!(in_store.status, StageStatus::Skipped);

        let addressed = Stage::new(Some("12 Mabini St".to_string()), None);
        assert!(!addressed.is_in_store());
        assert_eq!(addressed.status, StageStatus::Pending);
    }

    #[test]
    fn test_unavailable_snapshot() {
        let snap = PriceSnapshot::unavailable(ServiceKind::Iron);
        assert!(snap.is_unavailable());
        assert_eq!(snap.name, "Iron");
        assert!(snap.unit_price.is_zero());
    }

    #[test]
    fn test_next_basket_number() {
        let breakdown = Breakdown {
            products: vec![],
            baskets: vec![],
            fees: vec![],
            summary: BreakdownSummary {
                subtotal_products: Money::zero(),
                subtotal_services: Money::zero(),
                staff_service_fee: Money::zero(),
                delivery_fee: Money::zero(),
                tax_amount: Money::zero(),
                loyalty_discount: Money::zero(),
                total: Money::zero(),
            },
        };
        let mut order = Order::new(
            "order-1".to_string(),
            OrderOrigin::Counter,
            "cust-1".to_string(),
            None,
            vec![],
            vec![],
            Handling {
                pickup: Stage::new(None, None),
                delivery: Stage::new(None, None),
            },
            breakdown,
            Utc::now(),
        );
        assert_eq!(order.next_basket_number(), 1);
        order.baskets.push(Basket::new(1, 4.0, None));
        order.baskets.push(Basket::new(2, 3.0, None));
        assert_eq!(order.next_basket_number(), 3);
    }

    #[test]
    fn test_counter_order_starts_processing_app_order_pending() {
        let summary = BreakdownSummary {
            subtotal_products: Money::zero(),
            subtotal_services: Money::zero(),
            staff_service_fee: Money::zero(),
            delivery_fee: Money::zero(),
            tax_amount: Money::zero(),
            loyalty_discount: Money::zero(),
            total: Money::from_centavos(500),
        };
        let breakdown = Breakdown {
            products: vec![],
            baskets: vec![],
            fees: vec![],
            summary,
        };
        let handling = Handling {
            pickup: Stage::new(None, None),
            delivery: Stage::new(None, None),
        };

        let counter = Order::new(
            "o1".into(),
            OrderOrigin::Counter,
            "c1".into(),
            Some("staff-1".into()),
            vec![],
            vec![],
            handling.clone(),
            breakdown.clone(),
            Utc::now(),
        );
        assert_eq!(counter.status, OrderStatus::Processing);
        assert_eq!(counter.total_amount.centavos(), 500);
        assert_eq!(counter.audit_log.len(), 1);

        let app = Order::new(
            "o2".into(),
            OrderOrigin::MobileApp,
            "c1".into(),
            None,
            vec![],
            vec![],
            handling,
            breakdown,
            Utc::now(),
        );
        assert_eq!(app.status, OrderStatus::Pending);
    }

    #[test]
    fn test_display_status_serde_labels() {
        let json = serde_json::to_string(&DisplayStatus::ForPickup).unwrap();
        assert_eq!(json, "\"for_pick-up\"");
        let json = serde_json::to_string(&DisplayStatus::ForDelivery).unwrap();
        assert_eq!(json, "\"for_delivery\"");
    }
}
