//! # Validation Module
//!
//! Checks that run before a Quick View selection reaches a service call.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Where Errors Surface                               │
//! │                                                                         │
//! │  Layer 1: Controls (this crate)                                         │
//! │  ├── quantity clamped to [1, stock_left]                                │
//! │  └── increment disabled when nothing is left                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Commit gate (THIS MODULE)                                     │
//! │  ├── out of stock / missing size                                        │
//! │  └── rendered inline, never toasted, never logged                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Cart / wishlist service                                       │
//! │  └── ServiceError → logged + generic toast                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::selection::ProductSelection;
use crate::types::{ActionKind, ActionPayload};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Clamps a requested quantity into `[1, stock_left]`.
///
/// Returns `None` when nothing is in stock, since no quantity is valid.
///
/// ## Example
/// ```rust
/// use storefront_core::validation::clamp_quantity;
///
/// assert_eq!(clamp_quantity(6, 3), Some(3));
/// assert_eq!(clamp_quantity(0, 3), Some(1));
/// assert_eq!(clamp_quantity(1, 0), None);
/// ```
pub fn clamp_quantity(requested: u32, stock_left: u32) -> Option<u32> {
    if stock_left == 0 {
        return None;
    }
    Some(requested.clamp(1, stock_left))
}

/// Builds the payload for `kind` from the current selection.
///
/// ## Rules
/// - Wishlist toggles only need a product
/// - Cart-bound actions need stock, a quantity within stock, and a size; a
///   product with no size on offer cannot go into the cart
pub fn validate_commit(
    selection: &ProductSelection,
    kind: ActionKind,
) -> ValidationResult<ActionPayload> {
    let product = selection.product();

    if kind.commits_to_cart() {
        if !product.in_stock() {
            return Err(ValidationError::OutOfStock {
                product: product.name.clone(),
            });
        }

        let quantity = selection.quantity();
        if quantity == 0 || quantity > product.stock_left {
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: product.stock_left,
            });
        }

        if selection.selected_size().is_none() {
            return Err(ValidationError::Required {
                field: "size".to_string(),
            });
        }
    }

    Ok(ActionPayload {
        product: product.clone(),
        quantity: selection.quantity(),
        size: selection.selected_size().map(str::to_string),
        color: selection.selected_color().map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;

    fn product(stock_left: u32, sizes: &[&str]) -> Product {
        Product {
            id: "p-1".to_string(),
            name: "Linen Shirt".to_string(),
            price_cents: 4_900,
            images: vec!["shirt/front.jpg".to_string()],
            colors: vec!["sand".to_string()],
            sizes: sizes.iter().map(|s| s.to_string()).collect(),
            stock_left,
            description: None,
        }
    }

    #[test]
    fn test_clamp_is_idempotent() {
        for stock in 1..=5 {
            for requested in 0..=10 {
                let once = clamp_quantity(requested, stock).unwrap();
                let twice = clamp_quantity(once, stock).unwrap();
                assert_eq!(once, twice);
            }
        }
    }

    #[test]
    fn test_commit_payload_snapshots_selection() {
        let mut selection = ProductSelection::open(product(5, &["S", "M"]));
        selection.select_size(Some("M".to_string()));
        selection.set_quantity(2).unwrap();

        let payload = validate_commit(&selection, ActionKind::AddToCart).unwrap();
        assert_eq!(payload.quantity, 2);
        assert_eq!(payload.size.as_deref(), Some("M"));
        assert_eq!(payload.color.as_deref(), Some("sand"));
    }

    #[test]
    fn test_missing_size_is_required() {
        let mut selection = ProductSelection::open(product(5, &["S"]));
        selection.select_size(None);

        let err = validate_commit(&selection, ActionKind::BuyNow).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Required {
                field: "size".to_string()
            }
        );
    }

    #[test]
    fn test_out_of_stock_blocks_cart_but_not_wishlist() {
        let selection = ProductSelection::open(product(0, &[]));

        assert!(matches!(
            validate_commit(&selection, ActionKind::AddToCart),
            Err(ValidationError::OutOfStock { .. })
        ));
        assert!(validate_commit(&selection, ActionKind::Wishlist).is_ok());
    }

    #[test]
    fn test_product_without_sizes_cannot_commit_to_cart() {
        let selection = ProductSelection::open(product(2, &[]));
        assert_eq!(selection.selected_size(), None);

        for kind in [ActionKind::AddToCart, ActionKind::BuyNow] {
            assert_eq!(
                validate_commit(&selection, kind).unwrap_err(),
                ValidationError::Required {
                    field: "size".to_string()
                }
            );
        }
        assert!(validate_commit(&selection, ActionKind::Wishlist).is_ok());
    }
}
