//! # Basket Auto-Partitioner
//!
//! Enforces the maximum weight per basket. Overweight input is never
//! rejected: the basket is capped at the maximum and the excess moves to
//! a new sibling basket carrying a fresh copy of the same service
//! selections, numbered with the next unused basket number.
//!
//! A single call performs at most one split; callers re-invoke (or use
//! [`partition_weights`]) when the input is more than double the cap.

use crate::error::CoreResult;
use crate::types::Basket;
use crate::validation::validate_weight_input;

/// Result of applying a weight to a basket.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightSplit {
    /// The basket with its (possibly capped) weight applied.
    pub basket: Basket,
    /// Sibling basket carrying the excess, when the input overflowed.
    pub overflow: Option<Basket>,
}

/// Applies `new_weight_kg` to a basket, splitting overflow into a new
/// basket numbered `next_basket_number`.
///
/// The sibling copies the service selections (fresh Pending copies, no
/// progress state) and the notes; this is the only way a basket count
/// grows implicitly.
pub fn apply_weight(
    mut basket: Basket,
    new_weight_kg: f64,
    next_basket_number: u32,
    max_kg: f64,
) -> CoreResult<WeightSplit> {
    validate_weight_input(new_weight_kg)?;

    if new_weight_kg <= max_kg {
        basket.weight_kg = new_weight_kg;
        return Ok(WeightSplit {
            basket,
            overflow: None,
        });
    }

    let excess = new_weight_kg - max_kg;
    basket.weight_kg = max_kg;

    let mut sibling = Basket::new(next_basket_number, excess, basket.notes.clone());
    sibling.services = basket.services.iter().map(|s| s.fresh_copy()).collect();
    sibling.extra_dry_increments = basket.extra_dry_increments;

    Ok(WeightSplit {
        basket,
        overflow: Some(sibling),
    })
}

/// Splits a raw weight input into per-basket weights, each ≤ `max_kg`.
///
/// Used at order creation, where an intake weigh-in may exceed the cap
/// several times over. The weights sum to the input.
pub fn partition_weights(weight_kg: f64, max_kg: f64) -> CoreResult<Vec<f64>> {
    validate_weight_input(weight_kg)?;

    let mut remaining = weight_kg;
    let mut weights = Vec::new();
    while remaining > max_kg {
        weights.push(max_kg);
        remaining -= max_kg;
    }
    weights.push(remaining);
    Ok(weights)
}

// =============================================================================
// Unit Tests
// =============================================================================
