//! # Status State Machine
//!
//! Three coupled state machines govern an order:
//!
//! ```text
//! Order:    pending ──▶ processing ──▶ completed
//!               │            │
//!               └────────────┴───────▶ cancelled
//!
//! Service:  pending ──▶ in_progress ──▶ completed
//!               │            └────────▶ skipped
//!               └─────────────────────▶ (skipped | completed)
//!
//! Stage:    same shape; an in-store stage is skipped at construction
//!           and never enters pending/in_progress at all.
//! ```
//!
//! ## Ordering Gates
//! - Pickup must reach a terminal state before any basket service starts
//!   (in-store pickup counts as terminal immediately).
//! - Within a basket, services start in the fixed wash → spin → dry →
//!   iron → fold sequence; an unselected service is simply absent.
//! - Delivery starts only once every selected service of every basket is
//!   completed or skipped. One open basket blocks the whole order.
//!
//! All transitions are forward-only and append their own audit entries,
//! so no mutation path exists that leaves the trail silent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::AuditAction;
use crate::error::{CoreError, CoreResult};
use crate::types::{
    Cancellation, DisplayStatus, Order, OrderStatus, PaymentRecord, ServiceKind, ServiceStatus,
    StageKind, StageStatus,
};

// =============================================================================
// Transition Operations
// =============================================================================

impl Order {
    fn require_processing(&self) -> CoreResult<()> {
        if self.status != OrderStatus::Processing {
            return Err(CoreError::InvalidOrderStatus {
                required: OrderStatus::Processing,
                actual: self.status,
            });
        }
        Ok(())
    }

    fn pickup_gate(&self) -> CoreResult<()> {
        if !self.handling.pickup.is_terminal() {
            return Err(CoreError::PickupNotFinished);
        }
        Ok(())
    }

    /// Every selected service earlier in the processing sequence must be
    /// terminal before `kind` may leave Pending.
    fn sequence_gate(&self, basket_number: u32, kind: ServiceKind) -> CoreResult<()> {
        let basket = self
            .basket(basket_number)
            .ok_or(CoreError::BasketNotFound(basket_number))?;
        for earlier in basket
            .services
            .iter()
            .filter(|s| s.kind.sequence_index() < kind.sequence_index())
        {
            if !earlier.status.is_terminal() {
                return Err(CoreError::ServiceSequenceBlocked {
                    basket_number,
                    kind,
                    blocking: earlier.kind,
                });
            }
        }
        Ok(())
    }

    fn delivery_gate(&self) -> CoreResult<()> {
        for basket in &self.baskets {
            let open = basket.open_services().count();
            if open > 0 {
                return Err(CoreError::DeliveryBlocked {
                    basket_number: basket.basket_number,
                    open,
                });
            }
        }
        Ok(())
    }

    fn service_status(&self, basket_number: u32, kind: ServiceKind) -> CoreResult<ServiceStatus> {
        let basket = self
            .basket(basket_number)
            .ok_or(CoreError::BasketNotFound(basket_number))?;
        let service = basket.service(kind).ok_or(CoreError::ServiceNotSelected {
            basket_number,
            kind,
        })?;
        Ok(service.status)
    }

    /// Moves a service from Pending to InProgress.
    pub fn start_service(
        &mut self,
        basket_number: u32,
        kind: ServiceKind,
        staff_id: Option<String>,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.require_processing()?;
        self.pickup_gate()?;

        let from = self.service_status(basket_number, kind)?;
        if from != ServiceStatus::Pending {
            return Err(CoreError::InvalidServiceTransition {
                basket_number,
                kind,
                from,
                to: ServiceStatus::InProgress,
            });
        }
        self.sequence_gate(basket_number, kind)?;

        let service = self
            .basket_mut(basket_number)
            .and_then(|b| b.service_mut(kind))
            .ok_or(CoreError::BasketNotFound(basket_number))?;
        service.status = ServiceStatus::InProgress;
        service.started_at = Some(now);

        self.audit_log.append(
            AuditAction::ServiceStatusChanged {
                basket_number,
                kind,
                from,
                to: ServiceStatus::InProgress,
            },
            staff_id,
            now,
        );
        Ok(())
    }

    /// Completes a service, stamping the actor and deriving the duration.
    ///
    /// Completing straight from Pending back-fills `started_at` to the
    /// completion time: a service cannot be completed without having
    /// logically started. The Pending path still honors the pickup and
    /// sequence gates.
    pub fn complete_service(
        &mut self,
        basket_number: u32,
        kind: ServiceKind,
        staff_id: String,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.require_processing()?;

        let from = self.service_status(basket_number, kind)?;
        match from {
            ServiceStatus::Pending => {
                self.pickup_gate()?;
                self.sequence_gate(basket_number, kind)?;
            }
            ServiceStatus::InProgress => {}
            _ => {
                return Err(CoreError::InvalidServiceTransition {
                    basket_number,
                    kind,
                    from,
                    to: ServiceStatus::Completed,
                });
            }
        }

        let service = self
            .basket_mut(basket_number)
            .and_then(|b| b.service_mut(kind))
            .ok_or(CoreError::BasketNotFound(basket_number))?;
        let started = *service.started_at.get_or_insert(now);
        service.completed_at = Some(now);
        service.duration_minutes = Some((now - started).num_minutes());
        service.completed_by = Some(staff_id.clone());
        service.status = ServiceStatus::Completed;

        self.audit_log.append(
            AuditAction::ServiceStatusChanged {
                basket_number,
                kind,
                from,
                to: ServiceStatus::Completed,
            },
            Some(staff_id),
            now,
        );
        self.maybe_complete(now);
        Ok(())
    }

    /// Marks a service as skipped (staff decided it will not run).
    ///
    /// Allowed from Pending or InProgress regardless of sequence position;
    /// skipping never back-fills a start time.
    pub fn skip_service(
        &mut self,
        basket_number: u32,
        kind: ServiceKind,
        staff_id: String,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.require_processing()?;

        let from = self.service_status(basket_number, kind)?;
        if from.is_terminal() {
            return Err(CoreError::InvalidServiceTransition {
                basket_number,
                kind,
                from,
                to: ServiceStatus::Skipped,
            });
        }

        let service = self
            .basket_mut(basket_number)
            .and_then(|b| b.service_mut(kind))
            .ok_or(CoreError::BasketNotFound(basket_number))?;
        service.completed_at = Some(now);
        service.completed_by = Some(staff_id.clone());
        if let Some(started) = service.started_at {
            service.duration_minutes = Some((now - started).num_minutes());
        }
        service.status = ServiceStatus::Skipped;

        self.audit_log.append(
            AuditAction::ServiceStatusChanged {
                basket_number,
                kind,
                from,
                to: ServiceStatus::Skipped,
            },
            Some(staff_id),
            now,
        );
        self.maybe_complete(now);
        Ok(())
    }

    /// Moves a handling stage from Pending to InProgress.
    pub fn start_stage(
        &mut self,
        kind: StageKind,
        staff_id: Option<String>,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.require_processing()?;

        let from = self.handling.stage(kind).status;
        if from != StageStatus::Pending {
            return Err(CoreError::InvalidStageTransition {
                stage: kind,
                from,
                to: StageStatus::InProgress,
            });
        }
        if kind == StageKind::Delivery {
            self.delivery_gate()?;
        }

        let stage = self.handling.stage_mut(kind);
        stage.status = StageStatus::InProgress;
        stage.started_at = Some(now);

        self.audit_log
            .append(AuditAction::HandlingStarted { stage: kind }, staff_id, now);
        Ok(())
    }

    /// Completes a handling stage, stamping the actor and duration.
    pub fn complete_stage(
        &mut self,
        kind: StageKind,
        staff_id: String,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.require_processing()?;

        let from = self.handling.stage(kind).status;
        match from {
            StageStatus::Pending => {
                if kind == StageKind::Delivery {
                    self.delivery_gate()?;
                }
            }
            StageStatus::InProgress => {}
            _ => {
                return Err(CoreError::InvalidStageTransition {
                    stage: kind,
                    from,
                    to: StageStatus::Completed,
                });
            }
        }

        let stage = self.handling.stage_mut(kind);
        let started = *stage.started_at.get_or_insert(now);
        stage.completed_at = Some(now);
        stage.duration_minutes = Some((now - started).num_minutes());
        stage.completed_by = Some(staff_id.clone());
        stage.status = StageStatus::Completed;

        self.audit_log.append(
            AuditAction::HandlingCompleted { stage: kind, from },
            Some(staff_id),
            now,
        );
        self.maybe_complete(now);
        Ok(())
    }

    /// Approves a pending order after payment verification and successful
    /// inventory deduction.
    ///
    /// Baskets approve as a unit; partial approval is not representable.
    pub fn approve(
        &mut self,
        cashier_id: String,
        gcash_verified: bool,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        if self.status != OrderStatus::Pending {
            return Err(CoreError::InvalidOrderStatus {
                required: OrderStatus::Pending,
                actual: self.status,
            });
        }

        for basket in &mut self.baskets {
            basket.approved = true;
        }
        self.payment = PaymentRecord {
            gcash_verified,
            processed_at: Some(now),
        };
        self.cashier_id = Some(cashier_id.clone());
        self.approved_at = Some(now);
        self.status = OrderStatus::Processing;

        self.audit_log
            .append(AuditAction::PaymentProcessed, Some(cashier_id.clone()), now);
        self.audit_log
            .append(AuditAction::Approved { notes }, Some(cashier_id), now);
        Ok(())
    }

    /// Cancels the order. Valid from any non-terminal status.
    pub fn cancel(
        &mut self,
        reason: String,
        notes: Option<String>,
        staff_id: Option<String>,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        if self.status.is_terminal() {
            return Err(CoreError::InvalidOrderStatus {
                required: OrderStatus::Pending,
                actual: self.status,
            });
        }

        self.status = OrderStatus::Cancelled;
        self.cancelled_at = Some(now);
        self.cancellation = Some(Cancellation {
            reason: reason.clone(),
            notes,
            cancelled_by: staff_id.clone(),
            cancelled_at: now,
        });

        self.audit_log
            .append(AuditAction::Cancelled { reason }, staff_id, now);
        Ok(())
    }

    /// Auto-completes the order once every service and both stages are
    /// terminal. Idempotent; called from every completing transition.
    fn maybe_complete(&mut self, now: DateTime<Utc>) {
        if self.status == OrderStatus::Processing
            && self.all_baskets_terminal()
            && self.handling.pickup.is_terminal()
            && self.handling.delivery.is_terminal()
        {
            self.status = OrderStatus::Completed;
            self.completed_at = Some(now);
        }
    }
}

// =============================================================================
// Read-side Projections
// =============================================================================

/// One thing staff can do next on an order, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NextAction {
    AwaitApproval,
    StartPickup,
    CompletePickup,
    StartService {
        basket_number: u32,
        kind: ServiceKind,
    },
    CompleteService {
        basket_number: u32,
        kind: ServiceKind,
    },
    StartDelivery,
    CompleteDelivery,
}

impl Order {
    /// Derived UI grouping label. Pure projection over stage and service
    /// states; the stored [`OrderStatus`] stays authoritative and nothing
    /// ever writes this back.
    pub fn display_status(&self) -> DisplayStatus {
        match self.status {
            OrderStatus::Pending => DisplayStatus::ForApproval,
            OrderStatus::Completed => DisplayStatus::Completed,
            OrderStatus::Cancelled => DisplayStatus::Cancelled,
            OrderStatus::Processing => {
                if !self.handling.pickup.is_terminal() {
                    DisplayStatus::ForPickup
                } else if self.all_baskets_terminal() && !self.handling.delivery.is_terminal() {
                    DisplayStatus::ForDelivery
                } else {
                    DisplayStatus::InProcess
                }
            }
        }
    }

    /// The actions currently unblocked by the ordering gates, used to
    /// drive the staff timeline. In-store stages never appear.
    pub fn next_actions(&self) -> Vec<NextAction> {
        match self.status {
            OrderStatus::Pending => return vec![NextAction::AwaitApproval],
            OrderStatus::Completed | OrderStatus::Cancelled => return Vec::new(),
            OrderStatus::Processing => {}
        }

        let mut actions = Vec::new();
        match self.handling.pickup.status {
            StageStatus::Pending => return vec![NextAction::StartPickup],
            StageStatus::InProgress => return vec![NextAction::CompletePickup],
            _ => {}
        }

        for basket in &self.baskets {
            // First open service in sequence order is the actionable one.
            if let Some(service) = basket.open_services().next() {
                let action = match service.status {
                    ServiceStatus::Pending => NextAction::StartService {
                        basket_number: basket.basket_number,
                        kind: service.kind,
                    },
                    _ => NextAction::CompleteService {
                        basket_number: basket.basket_number,
                        kind: service.kind,
                    },
                };
                actions.push(action);
            }
        }

        if actions.is_empty() {
            match self.handling.delivery.status {
                StageStatus::Pending => actions.push(NextAction::StartDelivery),
                StageStatus::InProgress => actions.push(NextAction::CompleteDelivery),
                _ => {}
            }
        }
        actions
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{
        Basket, Breakdown, BreakdownSummary, Handling, OrderOrigin, PriceSnapshot, Service,
        ServiceTier, Stage,
    };
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    fn empty_breakdown(total: Money) -> Breakdown {
        Breakdown {
            products: vec![],
            baskets: vec![],
            fees: vec![],
            summary: BreakdownSummary {
                subtotal_products: Money::zero(),
                subtotal_services: total,
                staff_service_fee: Money::zero(),
                delivery_fee: Money::zero(),
                tax_amount: Money::zero(),
                loyalty_discount: Money::zero(),
                total,
            },
        }
    }

    fn service(kind: ServiceKind, tier: Option<ServiceTier>) -> Service {
        Service::new(
            kind,
            tier,
            1,
            None,
            PriceSnapshot {
                name: kind.label().to_string(),
                unit_price: Money::from_pesos(50),
                duration_minutes: 30,
            },
            Money::from_pesos(50),
        )
    }

    /// Counter order, one basket with wash + dry, optionally with real
    /// pickup/delivery addresses.
    fn order(with_pickup: bool, with_delivery: bool) -> Order {
        let mut basket = Basket::new(1, 5.0, None);
        basket.services = vec![
            service(ServiceKind::Wash, Some(ServiceTier::Basic)),
            service(ServiceKind::Dry, Some(ServiceTier::Basic)),
        ];
        let pickup_addr = with_pickup.then(|| "12 Mabini St".to_string());
        let delivery_addr = with_delivery.then(|| "34 Rizal Ave".to_string());
        Order::new(
            "order-1".into(),
            OrderOrigin::Counter,
            "cust-1".into(),
            Some("staff-1".into()),
            vec![],
            vec![basket],
            Handling {
                pickup: Stage::new(pickup_addr, None),
                delivery: Stage::new(delivery_addr, None),
            },
            empty_breakdown(Money::from_pesos(100)),
            t0(),
        )
    }

    fn app_order() -> Order {
        let mut o = order(false, false);
        o.origin = OrderOrigin::MobileApp;
        o.status = OrderStatus::Pending;
        o.cashier_id = None;
        o
    }

    #[test]
    fn test_pending_order_rejects_service_transitions() {
        let mut o = app_order();
        let err = o
            .start_service(1, ServiceKind::Wash, None, t0())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidOrderStatus { .. }));
    }

    #[test]
    fn test_pickup_gates_service_start() {
        let mut o = order(true, false);
        let err = o
            .start_service(1, ServiceKind::Wash, None, t0())
            .unwrap_err();
        assert!(matches!(err, CoreError::PickupNotFinished));

        o.start_stage(StageKind::Pickup, Some("staff-1".into()), t0())
            .unwrap();
        o.complete_stage(StageKind::Pickup, "staff-1".into(), t0() + Duration::minutes(20))
            .unwrap();
        assert!(o
            .start_service(1, ServiceKind::Wash, None, t0() + Duration::minutes(21))
            .is_ok());
    }

    #[test]
    fn test_in_store_pickup_unblocks_services_immediately() {
        let mut o = order(false, false);
        assert_eq!(o.handling.pickup.status, StageStatus::Skipped);
        assert!(o.start_service(1, ServiceKind::Wash, None, t0()).is_ok());
    }

    #[test]
    fn test_sequence_gate_blocks_dry_before_wash() {
        let mut o = order(false, false);
        let err = o.start_service(1, ServiceKind::Dry, None, t0()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::ServiceSequenceBlocked {
                blocking: ServiceKind::Wash,
                ..
            }
        ));

        o.start_service(1, ServiceKind::Wash, None, t0()).unwrap();
        o.complete_service(1, ServiceKind::Wash, "staff-1".into(), t0() + Duration::minutes(35))
            .unwrap();
        assert!(o
            .start_service(1, ServiceKind::Dry, None, t0() + Duration::minutes(36))
            .is_ok());
    }

    #[test]
    fn test_completed_service_is_terminal() {
        let mut o = order(false, true);
        o.start_service(1, ServiceKind::Wash, None, t0()).unwrap();
        o.complete_service(1, ServiceKind::Wash, "staff-1".into(), t0() + Duration::minutes(30))
            .unwrap();

        let err = o.start_service(1, ServiceKind::Wash, None, t0()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidServiceTransition {
                from: ServiceStatus::Completed,
                ..
            }
        ));
        let err = o
            .skip_service(1, ServiceKind::Wash, "staff-1".into(), t0())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidServiceTransition { .. }));
    }

    #[test]
    fn test_complete_from_pending_backfills_start() {
        let mut o = order(false, true);
        let now = t0() + Duration::minutes(10);
        o.complete_service(1, ServiceKind::Wash, "staff-1".into(), now)
            .unwrap();

        let wash = o.basket(1).unwrap().service(ServiceKind::Wash).unwrap();
        assert_eq!(wash.started_at, Some(now));
        assert_eq!(wash.completed_at, Some(now));
        assert_eq!(wash.duration_minutes, Some(0));
        assert_eq!(wash.completed_by.as_deref(), Some("staff-1"));
    }

    #[test]
    fn test_duration_derived_from_timestamps() {
        let mut o = order(false, true);
        o.start_service(1, ServiceKind::Wash, None, t0()).unwrap();
        o.complete_service(1, ServiceKind::Wash, "staff-1".into(), t0() + Duration::minutes(42))
            .unwrap();
        let wash = o.basket(1).unwrap().service(ServiceKind::Wash).unwrap();
        assert_eq!(wash.duration_minutes, Some(42));
    }

    #[test]
    fn test_delivery_blocked_while_services_open() {
        let mut o = order(false, true);
        o.start_service(1, ServiceKind::Wash, None, t0()).unwrap();

        let err = o.start_stage(StageKind::Delivery, None, t0()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::DeliveryBlocked {
                basket_number: 1,
                open: 2,
            }
        ));

        o.complete_service(1, ServiceKind::Wash, "staff-1".into(), t0()).unwrap();
        o.skip_service(1, ServiceKind::Dry, "staff-1".into(), t0()).unwrap();
        assert!(o.start_stage(StageKind::Delivery, None, t0()).is_ok());
    }

    #[test]
    fn test_in_store_stage_never_starts() {
        let mut o = order(false, false);
        let err = o.start_stage(StageKind::Delivery, None, t0()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidStageTransition {
                stage: StageKind::Delivery,
                from: StageStatus::Skipped,
                ..
            }
        ));
    }

    #[test]
    fn test_order_auto_completes_when_everything_terminal() {
        let mut o = order(false, true);
        o.complete_service(1, ServiceKind::Wash, "staff-1".into(), t0()).unwrap();
        o.complete_service(1, ServiceKind::Dry, "staff-1".into(), t0()).unwrap();
        assert_eq!(o.status, OrderStatus::Processing);

        let done = t0() + Duration::minutes(90);
        o.start_stage(StageKind::Delivery, Some("staff-2".into()), t0())
            .unwrap();
        o.complete_stage(StageKind::Delivery, "staff-2".into(), done)
            .unwrap();
        assert_eq!(o.status, OrderStatus::Completed);
        assert_eq!(o.completed_at, Some(done));
    }

    #[test]
    fn test_in_store_order_completes_with_last_service() {
        let mut o = order(false, false);
        o.complete_service(1, ServiceKind::Wash, "staff-1".into(), t0()).unwrap();
        o.complete_service(1, ServiceKind::Dry, "staff-1".into(), t0()).unwrap();
        assert_eq!(o.status, OrderStatus::Completed);
    }

    #[test]
    fn test_terminal_order_rejects_everything() {
        let mut o = order(false, false);
        o.cancel("customer request".into(), None, Some("staff-1".into()), t0())
            .unwrap();
        assert_eq!(o.status, OrderStatus::Cancelled);
        assert!(o.start_service(1, ServiceKind::Wash, None, t0()).is_err());
        assert!(o
            .cancel("again".into(), None, None, t0())
            .is_err());
    }

    #[test]
    fn test_approve_sets_payment_and_baskets_as_a_unit() {
        let mut o = app_order();
        let now = t0() + Duration::minutes(5);
        o.approve("staff-9".into(), true, Some("paid via ref 123".into()), now)
            .unwrap();

        assert_eq!(o.status, OrderStatus::Processing);
        assert_eq!(o.cashier_id.as_deref(), Some("staff-9"));
        assert_eq!(o.approved_at, Some(now));
        assert!(o.payment.gcash_verified);
        assert_eq!(o.payment.processed_at, Some(now));
        assert!(o.baskets.iter().all(|b| b.approved));

        // PaymentProcessed then Approved, after the creation entry
        let actions: Vec<_> = o.audit_log.entries().iter().map(|e| &e.action).collect();
        assert_eq!(actions[1], &AuditAction::PaymentProcessed);
        assert!(matches!(actions[2], AuditAction::Approved { .. }));
    }

    #[test]
    fn test_approve_requires_pending() {
        let mut o = order(false, false); // counter order: already Processing
        let err = o.approve("staff-9".into(), true, None, t0()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidOrderStatus {
                required: OrderStatus::Pending,
                actual: OrderStatus::Processing,
            }
        ));
        assert!(o.approved_at.is_none());
        assert!(!o.payment.gcash_verified);
    }

    #[test]
    fn test_cancel_attaches_record_and_audits() {
        let mut o = app_order();
        o.cancel(
            "out of detergent".into(),
            Some("sorry".into()),
            Some("staff-1".into()),
            t0(),
        )
        .unwrap();

        let c = o.cancellation.as_ref().unwrap();
        assert_eq!(c.reason, "out of detergent");
        assert_eq!(c.cancelled_by.as_deref(), Some("staff-1"));
        assert_eq!(o.cancelled_at, Some(t0()));
        assert!(matches!(
            o.audit_log.last().unwrap().action,
            AuditAction::Cancelled { .. }
        ));
    }

    #[test]
    fn test_display_status_projection() {
        let mut o = order(true, true);
        assert_eq!(o.display_status(), DisplayStatus::ForPickup);

        o.complete_stage(StageKind::Pickup, "staff-1".into(), t0()).unwrap();
        assert_eq!(o.display_status(), DisplayStatus::InProcess);

        o.complete_service(1, ServiceKind::Wash, "staff-1".into(), t0()).unwrap();
        o.complete_service(1, ServiceKind::Dry, "staff-1".into(), t0()).unwrap();
        assert_eq!(o.display_status(), DisplayStatus::ForDelivery);

        o.complete_stage(StageKind::Delivery, "staff-2".into(), t0()).unwrap();
        assert_eq!(o.display_status(), DisplayStatus::Completed);

        assert_eq!(app_order().display_status(), DisplayStatus::ForApproval);
    }

    #[test]
    fn test_next_actions_follow_the_gates() {
        let mut o = order(true, true);
        assert_eq!(o.next_actions(), vec![NextAction::StartPickup]);

        o.start_stage(StageKind::Pickup, None, t0()).unwrap();
        assert_eq!(o.next_actions(), vec![NextAction::CompletePickup]);

        o.complete_stage(StageKind::Pickup, "staff-1".into(), t0()).unwrap();
        assert_eq!(
            o.next_actions(),
            vec![NextAction::StartService {
                basket_number: 1,
                kind: ServiceKind::Wash,
            }]
        );

        o.complete_service(1, ServiceKind::Wash, "staff-1".into(), t0()).unwrap();
        o.complete_service(1, ServiceKind::Dry, "staff-1".into(), t0()).unwrap();
        assert_eq!(o.next_actions(), vec![NextAction::StartDelivery]);

        o.complete_stage(StageKind::Delivery, "staff-2".into(), t0()).unwrap();
        assert!(o.next_actions().is_empty());
    }
}
