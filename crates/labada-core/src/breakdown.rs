//! # Breakdown Builder
//!
//! Derives the complete financial decomposition of an order from the
//! selected products, baskets, handling mode and pricing configuration.
//!
//! ## Pricing Pipeline
//! ```text
//! selections ──materialize──▶ Services (price-snapshotted)
//!                                │
//! products + baskets ──build──▶  Breakdown
//!                                ├── per-basket charge lines
//!                                ├── staff / delivery / tax fees
//!                                └── summary (inclusive VAT extracted)
//! ```
//!
//! `build_breakdown` is pure and deterministic: identical inputs always
//! reproduce an identical summary, so the breakdown can be recomputed at
//! modification time without drift.

use serde::{Deserialize, Serialize};

use crate::catalog::{self, CatalogEntry, PricingConfig, ProductEntry};
use crate::error::{CoreError, CoreResult};
use crate::money::{Money, TaxRate};
use crate::types::{
    Basket, BasketBreakdown, BasketCharge, Breakdown, BreakdownSummary, Fee, FeeKind, ProductLine,
    Service, ServiceKind, ServiceSelection,
};
use crate::validation::validate_quantity;

// =============================================================================
// Materialization
// =============================================================================

/// A requested retail product line, before pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSelection {
    pub product_id: String,
    pub quantity: u32,
}

/// Prices requested products against the live catalog, freezing name and
/// unit price into [`ProductLine`]s.
pub fn materialize_products(
    products: &[ProductEntry],
    selections: &[ProductSelection],
) -> CoreResult<Vec<ProductLine>> {
    let mut lines = Vec::with_capacity(selections.len());
    for sel in selections {
        validate_quantity(sel.quantity)?;
        let entry = catalog::resolve_product(products, &sel.product_id)
            .ok_or_else(|| CoreError::ProductNotFound(sel.product_id.clone()))?;
        lines.push(ProductLine {
            product_id: entry.id.clone(),
            name: entry.name.clone(),
            unit_price: entry.unit_price,
            quantity: sel.quantity,
            subtotal: entry.unit_price.multiply_quantity(sel.quantity as i64),
        });
    }
    Ok(lines)
}

/// Turns a per-basket [`ServiceSelection`] into priced [`Service`]s with
/// snapshots resolved from the catalog.
///
/// ## Rules
/// - Wash and dry are priced by tier, one machine cycle each
/// - Spin and fold are flat per-catalog charges
/// - Iron is priced per kilogram; a load below the configured minimum is
///   silently treated as "no iron", not an error
/// - A selected service with no active catalog entry is an error: a
///   zero-valued snapshot must never be silently charged
pub fn materialize_services(
    selection: &ServiceSelection,
    catalog_entries: &[CatalogEntry],
    config: &PricingConfig,
) -> CoreResult<Vec<Service>> {
    let mut services = Vec::new();

    if let Some(tier) = selection.wash {
        let snapshot = catalog::resolve(catalog_entries, ServiceKind::Wash, Some(tier));
        if snapshot.is_unavailable() {
            return Err(CoreError::ServiceUnavailable {
                kind: ServiceKind::Wash,
                tier: Some(tier),
            });
        }
        let subtotal = snapshot.unit_price;
        services.push(Service::new(
            ServiceKind::Wash,
            Some(tier),
            1,
            None,
            snapshot,
            subtotal,
        ));
    }

    if selection.spin {
        let snapshot = catalog::resolve(catalog_entries, ServiceKind::Spin, None);
        if snapshot.is_unavailable() {
            return Err(CoreError::ServiceUnavailable {
                kind: ServiceKind::Spin,
                tier: None,
            });
        }
        let subtotal = snapshot.unit_price;
        services.push(Service::new(
            ServiceKind::Spin,
            None,
            1,
            None,
            snapshot,
            subtotal,
        ));
    }

    if let Some(tier) = selection.dry {
        let snapshot = catalog::resolve(catalog_entries, ServiceKind::Dry, Some(tier));
        if snapshot.is_unavailable() {
            return Err(CoreError::ServiceUnavailable {
                kind: ServiceKind::Dry,
                tier: Some(tier),
            });
        }
        let subtotal = snapshot.unit_price;
        services.push(Service::new(
            ServiceKind::Dry,
            Some(tier),
            1,
            None,
            snapshot,
            subtotal,
        ));
    }

    if let Some(weight) = selection.iron_weight_kg {
        if weight >= config.iron_min_weight_kg {
            let snapshot = catalog::resolve(catalog_entries, ServiceKind::Iron, None);
            if snapshot.is_unavailable() {
                return Err(CoreError::ServiceUnavailable {
                    kind: ServiceKind::Iron,
                    tier: None,
                });
            }
            let subtotal = snapshot.unit_price.multiply_weight_kg(weight);
            services.push(Service::new(
                ServiceKind::Iron,
                None,
                1,
                Some(weight),
                snapshot,
                subtotal,
            ));
        }
        // Below the minimum: treated as no iron at all.
    }

    if selection.fold {
        let snapshot = catalog::resolve(catalog_entries, ServiceKind::Fold, None);
        if snapshot.is_unavailable() {
            return Err(CoreError::ServiceUnavailable {
                kind: ServiceKind::Fold,
                tier: None,
            });
        }
        let subtotal = snapshot.unit_price;
        services.push(Service::new(
            ServiceKind::Fold,
            None,
            1,
            None,
            snapshot,
            subtotal,
        ));
    }

    Ok(services)
}

// =============================================================================
// Breakdown Builder
// =============================================================================

/// Per-order pricing options passed to [`build_breakdown`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreakdownOptions {
    /// Flat per-order fee applied once when staff handle the laundry.
    pub staff_service_requested: bool,
    /// Whether the order has a delivery leg (delivery address present).
    pub is_delivery: bool,
    /// Cashier override for the delivery fee. Values below the configured
    /// minimum clamp up, never undercut it.
    pub delivery_fee_override: Option<Money>,
    /// Already-granted loyalty discount, subtracted from the final total.
    pub loyalty_discount: Money,
}

/// Builds the financial breakdown from priced products and baskets.
///
/// Pure and deterministic. Tax is inclusive: it is extracted from the
/// pre-discount total (`tax = total × rate / (1 + rate)`) and never added
/// on top.
pub fn build_breakdown(
    products: &[ProductLine],
    baskets: &[Basket],
    options: &BreakdownOptions,
    config: &PricingConfig,
) -> Breakdown {
    let subtotal_products: Money = products.iter().map(|p| p.subtotal).sum();

    let mut basket_breakdowns = Vec::with_capacity(baskets.len());
    let mut subtotal_services = Money::zero();
    for basket in baskets {
        let decomposed = decompose_basket(basket, config);
        subtotal_services += decomposed.subtotal;
        basket_breakdowns.push(decomposed);
    }

    let staff_service_fee = if options.staff_service_requested {
        config.staff_service_fee
    } else {
        Money::zero()
    };

    let delivery_fee = if options.is_delivery {
        options
            .delivery_fee_override
            .unwrap_or(config.min_delivery_fee)
            .max(config.min_delivery_fee)
    } else {
        Money::zero()
    };

    let subtotal_before_tax =
        subtotal_products + subtotal_services + staff_service_fee + delivery_fee;
    let tax_amount = subtotal_before_tax.extract_inclusive_tax(TaxRate::from_bps(config.tax_bps));
    let total = subtotal_before_tax - options.loyalty_discount;

    let mut fees = Vec::new();
    if options.staff_service_requested {
        fees.push(Fee {
            kind: FeeKind::StaffService,
            description: "Staff service fee".to_string(),
            amount: staff_service_fee,
        });
    }
    if options.is_delivery {
        fees.push(Fee {
            kind: FeeKind::Delivery,
            description: "Delivery fee".to_string(),
            amount: delivery_fee,
        });
    }
    fees.push(Fee {
        kind: FeeKind::Tax,
        description: format!(
            "VAT {}% (included)",
            TaxRate::from_bps(config.tax_bps).percentage()
        ),
        amount: tax_amount,
    });

    Breakdown {
        products: products.to_vec(),
        baskets: basket_breakdowns,
        fees,
        summary: BreakdownSummary {
            subtotal_products,
            subtotal_services,
            staff_service_fee,
            delivery_fee,
            tax_amount,
            loyalty_discount: options.loyalty_discount,
            total,
        },
    }
}

/// Charge lines and subtotal for one basket.
fn decompose_basket(basket: &Basket, config: &PricingConfig) -> BasketBreakdown {
    let mut charges = Vec::with_capacity(basket.services.len() + 1);
    for service in &basket.services {
        charges.push(BasketCharge {
            label: service_label(service),
            amount: service.subtotal,
        });
    }

    let mut subtotal = basket.services_subtotal();
    if basket.extra_dry_increments > 0 {
        let amount = config
            .extra_dry_increment_fee
            .multiply_quantity(basket.extra_dry_increments as i64);
        charges.push(BasketCharge {
            label: format!(
                "Extra dry time ({} x {} min)",
                basket.extra_dry_increments, config.extra_dry_increment_minutes
            ),
            amount,
        });
        subtotal += amount;
    }

    BasketBreakdown {
        basket_number: basket.basket_number,
        weight_kg: basket.weight_kg,
        charges,
        subtotal,
    }
}

fn service_label(service: &Service) -> String {
    match service.weight_kg {
        Some(kg) => format!("{} ({kg} kg)", service.snapshot.name),
        None => service.snapshot.name.clone(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ServiceTier;

    fn entry(
        kind: ServiceKind,
        tier: Option<ServiceTier>,
        name: &str,
        pesos: i64,
        minutes: u32,
    ) -> CatalogEntry {
        CatalogEntry {
            kind,
            tier,
            name: name.to_string(),
            price: Money::from_pesos(pesos),
            duration_minutes: minutes,
            active: true,
        }
    }

    fn catalog() -> Vec<CatalogEntry> {
        vec![
            entry(ServiceKind::Wash, Some(ServiceTier::Basic), "Wash (Basic)", 65, 35),
            entry(ServiceKind::Wash, Some(ServiceTier::Premium), "Wash (Premium)", 95, 45),
            entry(ServiceKind::Spin, None, "Spin", 25, 10),
            entry(ServiceKind::Dry, Some(ServiceTier::Basic), "Dry (Basic)", 70, 40),
            entry(ServiceKind::Iron, None, "Iron", 35, 0),
            entry(ServiceKind::Fold, None, "Fold", 20, 15),
        ]
    }

    fn basket_from(selection: &ServiceSelection, weight_kg: f64) -> Basket {
        let config = PricingConfig::default();
        let mut basket = Basket::new(1, weight_kg, None);
        basket.services = materialize_services(selection, &catalog(), &config).unwrap();
        basket.extra_dry_increments = selection.extra_dry_increments;
        basket
    }

    #[test]
    fn test_materialize_prices_by_tier_and_weight() {
        let selection = ServiceSelection {
            wash: Some(ServiceTier::Premium),
            spin: true,
            dry: Some(ServiceTier::Basic),
            iron_weight_kg: Some(2.5),
            fold: true,
            extra_dry_increments: 0,
        };
        let services =
            materialize_services(&selection, &catalog(), &PricingConfig::default()).unwrap();
        assert_eq!(services.len(), 5);

        let iron = services.iter().find(|s| s.kind == ServiceKind::Iron).unwrap();
        // P35/kg × 2.5 kg = P87.50
        assert_eq!(iron.subtotal.centavos(), 8750);
        assert_eq!(iron.weight_kg, Some(2.5));

        let wash = services.iter().find(|s| s.kind == ServiceKind::Wash).unwrap();
        assert_eq!(wash.snapshot.name, "Wash (Premium)");
        assert_eq!(wash.subtotal.centavos(), 9500);
    }

    #[test]
    fn test_iron_below_minimum_silently_dropped() {
        let selection = ServiceSelection {
            iron_weight_kg: Some(0.4),
            ..Default::default()
        };
        let services =
            materialize_services(&selection, &catalog(), &PricingConfig::default()).unwrap();
        assert!(services.is_empty());
    }

    #[test]
    fn test_unavailable_service_is_an_error_not_a_free_charge() {
        let selection = ServiceSelection {
            fold: true,
            ..Default::default()
        };
        let err = materialize_services(&selection, &[], &PricingConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::ServiceUnavailable {
                kind: ServiceKind::Fold,
                tier: None,
            }
        ));
    }

    #[test]
    fn test_materialize_products_freezes_price() {
        let products = vec![ProductEntry {
            id: "soap-1".into(),
            name: "Detergent Sachet".into(),
            unit_price: Money::from_pesos(12),
            active: true,
        }];
        let lines = materialize_products(
            &products,
            &[ProductSelection {
                product_id: "soap-1".into(),
                quantity: 3,
            }],
        )
        .unwrap();
        assert_eq!(lines[0].subtotal.centavos(), 3600);
        assert_eq!(lines[0].name, "Detergent Sachet");

        let missing = materialize_products(
            &products,
            &[ProductSelection {
                product_id: "nope".into(),
                quantity: 1,
            }],
        );
        assert!(matches!(missing, Err(CoreError::ProductNotFound(_))));
    }

    #[test]
    fn test_scenario_self_service_in_store_has_no_fees() {
        // One basket, 5 kg, wash basic + dry basic, fully in-store
        let selection = ServiceSelection {
            wash: Some(ServiceTier::Basic),
            dry: Some(ServiceTier::Basic),
            ..Default::default()
        };
        let basket = basket_from(&selection, 5.0);
        let config = PricingConfig::default();
        let breakdown = build_breakdown(&[], &[basket], &BreakdownOptions::default(), &config);

        let summary = &breakdown.summary;
        assert_eq!(summary.staff_service_fee, Money::zero());
        assert_eq!(summary.delivery_fee, Money::zero());
        // total = wash 65 + dry 70, tax extracted from that sum
        assert_eq!(summary.total.centavos(), 13500);
        assert_eq!(
            summary.tax_amount,
            Money::from_centavos(13500).extract_inclusive_tax(TaxRate::from_bps(1200))
        );
        // Inclusive model: total is payable as-is
        assert_eq!(
            summary.total,
            summary.subtotal_products + summary.subtotal_services
        );
    }

    #[test]
    fn test_delivery_override_clamps_up_to_minimum() {
        let selection = ServiceSelection {
            wash: Some(ServiceTier::Basic),
            ..Default::default()
        };
        let basket = basket_from(&selection, 4.0);
        let config = PricingConfig::default(); // min delivery fee P50
        let options = BreakdownOptions {
            is_delivery: true,
            delivery_fee_override: Some(Money::from_pesos(30)),
            ..Default::default()
        };
        let breakdown = build_breakdown(&[], &[basket], &options, &config);
        assert_eq!(breakdown.summary.delivery_fee, Money::from_pesos(50));

        // An override above the minimum is honored
        let options = BreakdownOptions {
            is_delivery: true,
            delivery_fee_override: Some(Money::from_pesos(80)),
            ..Default::default()
        };
        let basket = basket_from(&selection, 4.0);
        let breakdown = build_breakdown(&[], &[basket], &options, &config);
        assert_eq!(breakdown.summary.delivery_fee, Money::from_pesos(80));
    }

    #[test]
    fn test_extra_dry_increments_charged_per_basket() {
        let selection = ServiceSelection {
            dry: Some(ServiceTier::Basic),
            extra_dry_increments: 2,
            ..Default::default()
        };
        let basket = basket_from(&selection, 6.0);
        let config = PricingConfig::default(); // P15 per increment
        let breakdown = build_breakdown(&[], &[basket], &BreakdownOptions::default(), &config);

        let bb = &breakdown.baskets[0];
        // dry 70 + extra dry 2 × 15 = 100
        assert_eq!(bb.subtotal, Money::from_pesos(100));
        assert!(bb.charges.iter().any(|c| c.label.contains("Extra dry")));
        assert_eq!(breakdown.summary.subtotal_services, Money::from_pesos(100));
    }

    #[test]
    fn test_loyalty_discount_subtracted_after_tax_extraction() {
        let selection = ServiceSelection {
            wash: Some(ServiceTier::Basic),
            dry: Some(ServiceTier::Basic),
            ..Default::default()
        };
        let basket = basket_from(&selection, 5.0);
        let config = PricingConfig::default();
        let options = BreakdownOptions {
            loyalty_discount: Money::from_pesos(10),
            ..Default::default()
        };
        let breakdown = build_breakdown(&[], &[basket], &options, &config);

        // tax computed on the pre-discount 135, total drops to 125
        assert_eq!(breakdown.summary.total, Money::from_pesos(125));
        assert_eq!(
            breakdown.summary.tax_amount,
            Money::from_pesos(135).extract_inclusive_tax(TaxRate::from_bps(1200))
        );
    }

    #[test]
    fn test_breakdown_is_idempotent() {
        let selection = ServiceSelection {
            wash: Some(ServiceTier::Premium),
            spin: true,
            dry: Some(ServiceTier::Basic),
            iron_weight_kg: Some(3.0),
            fold: true,
            extra_dry_increments: 1,
        };
        let basket = basket_from(&selection, 7.5);
        let products = vec![ProductLine {
            product_id: "soap-1".into(),
            name: "Detergent Sachet".into(),
            unit_price: Money::from_pesos(12),
            quantity: 2,
            subtotal: Money::from_pesos(24),
        }];
        let config = PricingConfig::default();
        let options = BreakdownOptions {
            staff_service_requested: true,
            is_delivery: true,
            delivery_fee_override: None,
            loyalty_discount: Money::zero(),
        };

        let first = build_breakdown(&products, &[basket.clone()], &options, &config);
        let second = build_breakdown(&products, &[basket], &options, &config);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
