//! # Pricing Catalog Lookup
//!
//! Resolves a service type/tier to a snapshot price and duration at
//! order-creation time. Pure function over a catalog list; the catalog
//! source itself (read-only from this crate's perspective) is an
//! external collaborator.
//!
//! Resolution never errors: a kind with no active entry yields a
//! zero-valued snapshot, which callers must treat as "unavailable" and
//! surface, never silently charge.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{PriceSnapshot, ServiceKind, ServiceTier};

// =============================================================================
// Catalog Entries
// =============================================================================

/// One active service definition from the catalog source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub kind: ServiceKind,
    /// Tier, meaningful only for wash/dry entries.
    pub tier: Option<ServiceTier>,
    pub name: String,
    pub price: Money,
    pub duration_minutes: u32,
    pub active: bool,
}

/// One sellable retail product from the catalog source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductEntry {
    pub id: String,
    pub name: String,
    pub unit_price: Money,
    pub active: bool,
}

// =============================================================================
// Pricing Configuration
// =============================================================================

/// Tenant pricing knobs used by the breakdown builder.
///
/// Defaults reflect the shop's standing rates; a deployment overrides
/// them from its own configuration source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Inclusive VAT rate in basis points (1200 = 12%).
    pub tax_bps: u32,
    /// Flat per-order fee when staff service is requested.
    pub staff_service_fee: Money,
    /// Floor for the delivery fee; cashier overrides below it clamp up.
    pub min_delivery_fee: Money,
    /// Iron loads below this weight are treated as "no iron".
    pub iron_min_weight_kg: f64,
    /// Length of one extra dry-time increment.
    pub extra_dry_increment_minutes: u32,
    /// Fixed charge per extra dry-time increment.
    pub extra_dry_increment_fee: Money,
    /// Maximum weight per basket; overflow splits into a sibling basket.
    pub max_basket_weight_kg: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig {
            tax_bps: 1200,
            staff_service_fee: Money::from_pesos(25),
            min_delivery_fee: Money::from_pesos(50),
            iron_min_weight_kg: 1.0,
            extra_dry_increment_minutes: 8,
            extra_dry_increment_fee: Money::from_pesos(15),
            max_basket_weight_kg: crate::MAX_BASKET_WEIGHT_KG,
        }
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolves a service kind (and tier, for wash/dry) to a price snapshot.
///
/// ## Resolution rule
/// - A supplied tier prefers the active entry whose tier matches exactly
/// - Otherwise the first active entry for the kind wins
/// - Tier is ignored for untiered kinds (spin/iron/fold)
/// - No active entry at all → zero-valued snapshot, not an error
pub fn resolve(
    catalog: &[CatalogEntry],
    kind: ServiceKind,
    tier: Option<ServiceTier>,
) -> PriceSnapshot {
    let mut active = catalog.iter().filter(|e| e.active && e.kind == kind);

    let entry = if kind.is_tiered() {
        if let Some(wanted) = tier {
            // Exact tier first, then any active entry for the kind
            catalog
                .iter()
                .filter(|e| e.active && e.kind == kind)
                .find(|e| e.tier == Some(wanted))
                .or_else(|| active.next())
        } else {
            active.next()
        }
    } else {
        active.next()
    };

    match entry {
        Some(e) => PriceSnapshot {
            name: e.name.clone(),
            unit_price: e.price,
            duration_minutes: e.duration_minutes,
        },
        None => PriceSnapshot::unavailable(kind),
    }
}

/// Resolves a product id to its active catalog entry.
pub fn resolve_product<'a>(
    products: &'a [ProductEntry],
    product_id: &str,
) -> Option<&'a ProductEntry> {
    products.iter().find(|p| p.active && p.id == product_id)
}

// =============================================================================
// Unit Tests
// =============================================================================
