//! # Audit Trail
//!
//! Append-only history of state-changing actions on an order.
//!
//! Every mutating operation writes at least one entry. Entries carry the
//! action kind with action-specific context (which basket/service moved,
//! from and to which status, prior and new totals), the acting staff
//! member and a timestamp. Entries are never edited or removed, only
//! appended: the trail can always reconstruct "who did what, when".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{ServiceKind, ServiceStatus, StageKind, StageStatus};

// =============================================================================
// Audit Actions
// =============================================================================

/// What happened, with the context needed to replay it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    ServiceStatusChanged {
        basket_number: u32,
        kind: ServiceKind,
        from: ServiceStatus,
        to: ServiceStatus,
    },
    HandlingStarted {
        stage: StageKind,
    },
    HandlingCompleted {
        stage: StageKind,
        from: StageStatus,
    },
    PaymentProcessed,
    Approved {
        notes: Option<String>,
    },
    Cancelled {
        reason: String,
    },
    Modified {
        previous_total: Money,
        new_total: Money,
    },
}

// =============================================================================
// Audit Entry & Trail
// =============================================================================

/// One immutable history record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(flatten)]
    pub action: AuditAction,
    /// Acting staff member, if one was attributed.
    pub staff_id: Option<String>,
    pub at: DateTime<Utc>,
}

/// Append-only sequence of audit entries.
///
/// The wrapper exposes no mutation beyond `append`; ordering is the
/// logical completion order of the triggering operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditTrail {
    entries: Vec<AuditEntry>,
}

impl AuditTrail {
    pub fn new() -> Self {
        AuditTrail::default()
    }

    /// Appends one entry. There is deliberately no way to edit or remove.
    pub fn append(&mut self, action: AuditAction, staff_id: Option<String>, at: DateTime<Utc>) {
        self.entries.push(AuditEntry {
            action,
            staff_id,
            at,
        });
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry, if any.
    pub fn last(&self) -> Option<&AuditEntry> {
        self.entries.last()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut trail = AuditTrail::new();
        let t0 = Utc::now();
        trail.append(AuditAction::Created, Some("staff-1".into()), t0);
        trail.append(AuditAction::PaymentProcessed, Some("staff-2".into()), t0);
        trail.append(
            AuditAction::Approved { notes: None },
            Some("staff-2".into()),
            t0,
        );

        assert_eq!(trail.len(), 3);
        assert_eq!(trail.entries()[0].action, AuditAction::Created);
        assert_eq!(
            trail.last().unwrap().action,
            AuditAction::Approved { notes: None }
        );
    }

    #[test]
    fn test_action_context_serializes_with_tag() {
        let entry = AuditEntry {
            action: AuditAction::ServiceStatusChanged {
                basket_number: 2,
                kind: ServiceKind::Dry,
                from: ServiceStatus::InProgress,
                to: ServiceStatus::Completed,
            },
            staff_id: Some("staff-7".into()),
            at: Utc::now(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["action"], "service_status_changed");
        assert_eq!(json["basket_number"], 2);
        assert_eq!(json["from"], "in_progress");
        assert_eq!(json["to"], "completed");
    }

    #[test]
    fn test_modified_records_both_totals() {
        let mut trail = AuditTrail::new();
        trail.append(
            AuditAction::Modified {
                previous_total: Money::from_centavos(10000),
                new_total: Money::from_centavos(12500),
            },
            Some("staff-1".into()),
            Utc::now(),
        );
        match &trail.last().unwrap().action {
            AuditAction::Modified {
                previous_total,
                new_total,
            } => {
                assert_eq!(previous_total.centavos(), 10000);
                assert_eq!(new_total.centavos(), 12500);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }
}
