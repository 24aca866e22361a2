//! # Quick View Selection
//!
//! In-progress configuration for the product shown in Quick View.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Closed ──open(product)──► Open(ProductSelection) ──close()──► Closed  │
//! │                               │        ▲                                │
//! │                               │        │ refresh(same id): keep         │
//! │                               └────────┘ refresh(new id):  reset        │
//! │                                                                         │
//! │   Control changes (image, color, size, tab) are plain replacements.     │
//! │   Quantity always passes through clamp_quantity().                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::{ActionKind, ActionPayload, Product, QuickViewTab};
use crate::validation::{clamp_quantity, validate_commit, ValidationResult};

// =============================================================================
// Product Selection
// =============================================================================

/// Selection state for one product.
///
/// ## Invariants
/// - `quantity` is within `[1, stock_left]` (stays 1 when out of stock)
/// - `image_index` addresses an image whenever the product has images
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductSelection {
    product: Product,
    image_index: usize,
    selected_color: Option<String>,
    selected_size: Option<String>,
    quantity: u32,
    active_tab: QuickViewTab,
}

impl ProductSelection {
    /// Starts a fresh selection: first image, first color, first size, one
    /// unit, description tab.
    pub fn open(product: Product) -> Self {
        ProductSelection {
            selected_color: product.colors.first().cloned(),
            selected_size: product.sizes.first().cloned(),
            image_index: 0,
            quantity: 1,
            active_tab: QuickViewTab::default(),
            product,
        }
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn product_id(&self) -> &str {
        &self.product.id
    }

    pub fn image_index(&self) -> usize {
        self.image_index
    }

    /// The image currently shown in the gallery.
    pub fn selected_image(&self) -> Option<&str> {
        self.product.images.get(self.image_index).map(String::as_str)
    }

    pub fn selected_color(&self) -> Option<&str> {
        self.selected_color.as_deref()
    }

    pub fn selected_size(&self) -> Option<&str> {
        self.selected_size.as_deref()
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn active_tab(&self) -> QuickViewTab {
        self.active_tab
    }

    // =========================================================================
    // Quantity
    // =========================================================================

    /// Sets the quantity, clamped to `[1, stock_left]`.
    ///
    /// ## Errors
    /// [`ValidationError::OutOfStock`] when nothing is left; the quantity is
    /// left untouched.
    pub fn set_quantity(&mut self, requested: u32) -> ValidationResult<u32> {
        match clamp_quantity(requested, self.product.stock_left) {
            Some(quantity) => {
                self.quantity = quantity;
                Ok(quantity)
            }
            None => Err(ValidationError::OutOfStock {
                product: self.product.name.clone(),
            }),
        }
    }

    /// "+" control.
    pub fn increment(&mut self) -> ValidationResult<u32> {
        self.set_quantity(self.quantity.saturating_add(1))
    }

    /// "−" control.
    pub fn decrement(&mut self) -> ValidationResult<u32> {
        self.set_quantity(self.quantity.saturating_sub(1))
    }

    /// Snapshot of the selection for `kind`, if it can be committed.
    pub fn commit_payload(&self, kind: ActionKind) -> ValidationResult<ActionPayload> {
        validate_commit(self, kind)
    }

    /// Whether the "+" control is enabled.
    pub fn can_increment(&self) -> bool {
        self.product.stock_left > 0 && self.quantity < self.product.stock_left
    }

    /// Whether the "−" control is enabled.
    pub fn can_decrement(&self) -> bool {
        self.product.stock_left > 0 && self.quantity > 1
    }

    // =========================================================================
    // Plain Replacements
    // =========================================================================

    /// Shows image `index`; indices past the end land on the last image.
    pub fn select_image(&mut self, index: usize) {
        let last = self.product.images.len().saturating_sub(1);
        self.image_index = index.min(last);
    }

    /// Gallery arrow, wraps to the first image.
    pub fn next_image(&mut self) {
        let len = self.product.images.len();
        if len > 0 {
            self.image_index = (self.image_index + 1) % len;
        }
    }

    /// Gallery arrow, wraps to the last image.
    pub fn prev_image(&mut self) {
        let len = self.product.images.len();
        if len > 0 {
            self.image_index = (self.image_index + len - 1) % len;
        }
    }

    pub fn select_color(&mut self, color: Option<String>) {
        self.selected_color = color;
    }

    pub fn select_size(&mut self, size: Option<String>) {
        self.selected_size = size;
    }

    pub fn set_tab(&mut self, tab: QuickViewTab) {
        self.active_tab = tab;
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    /// Applies newer data for the shown product.
    ///
    /// A different product id re-initializes everything. The same id keeps the
    /// shopper's choices where they are still offered and re-clamps quantity
    /// and image index.
    pub fn refresh(&mut self, product: Product) {
        if product.id != self.product.id {
            *self = ProductSelection::open(product);
            return;
        }

        if !self
            .selected_color
            .as_ref()
            .is_some_and(|c| product.colors.contains(c))
        {
            self.selected_color = product.colors.first().cloned();
        }
        if !self
            .selected_size
            .as_ref()
            .is_some_and(|s| product.sizes.contains(s))
        {
            self.selected_size = product.sizes.first().cloned();
        }

        self.product = product;
        self.select_image(self.image_index);
        self.quantity = clamp_quantity(self.quantity, self.product.stock_left).unwrap_or(1);
    }
}

// =============================================================================
// Quick View
// =============================================================================

/// The Quick View surface: either closed or showing one selection.
#[derive(Debug, Clone, Default)]
pub struct QuickView {
    selection: Option<ProductSelection>,
}

impl QuickView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens (or re-opens) on `product` with a fresh selection.
    pub fn open(&mut self, product: Product) -> &mut ProductSelection {
        self.selection.insert(ProductSelection::open(product))
    }

    /// Closes the surface. Returns false if it was already closed.
    pub fn close(&mut self) -> bool {
        self.selection.take().is_some()
    }

    pub fn is_open(&self) -> bool {
        self.selection.is_some()
    }

    pub fn selection(&self) -> Option<&ProductSelection> {
        self.selection.as_ref()
    }

    pub fn selection_mut(&mut self) -> Option<&mut ProductSelection> {
        self.selection.as_mut()
    }

    /// Forwards fresh product data; a no-op when closed.
    pub fn refresh(&mut self, product: Product) {
        if let Some(selection) = self.selection.as_mut() {
            selection.refresh(product);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, stock_left: u32) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            price_cents: 2_500,
            images: vec!["a.jpg".into(), "b.jpg".into(), "c.jpg".into()],
            colors: vec!["red".into(), "blue".into()],
            sizes: vec!["S".into(), "M".into(), "L".into()],
            stock_left,
            description: Some("Soft cotton".into()),
        }
    }

    #[test]
    fn test_open_defaults() {
        let selection = ProductSelection::open(product("1", 4));
        assert_eq!(selection.image_index(), 0);
        assert_eq!(selection.selected_color(), Some("red"));
        assert_eq!(selection.selected_size(), Some("S"));
        assert_eq!(selection.quantity(), 1);
        assert_eq!(selection.active_tab(), QuickViewTab::Description);
    }

    #[test]
    fn test_open_without_colors_or_sizes() {
        let mut p = product("1", 4);
        p.colors.clear();
        p.sizes.clear();
        let selection = ProductSelection::open(p);
        assert_eq!(selection.selected_color(), None);
        assert_eq!(selection.selected_size(), None);
    }

    #[test]
    fn test_increment_stops_at_stock() {
        let mut selection = ProductSelection::open(product("1", 3));
        for _ in 0..5 {
            selection.increment().unwrap();
        }
        assert_eq!(selection.quantity(), 3);
        assert!(!selection.can_increment());
        assert!(selection.can_decrement());
    }

    #[test]
    fn test_decrement_stops_at_one() {
        let mut selection = ProductSelection::open(product("1", 3));
        selection.decrement().unwrap();
        assert_eq!(selection.quantity(), 1);
        assert!(!selection.can_decrement());
    }

    #[test]
    fn test_set_quantity_idempotent_after_clamp() {
        let mut selection = ProductSelection::open(product("1", 4));
        let first = selection.set_quantity(9).unwrap();
        let second = selection.set_quantity(first).unwrap();
        assert_eq!(first, 4);
        assert_eq!(first, second);
    }

    #[test]
    fn test_out_of_stock_rejects_every_quantity() {
        let mut selection = ProductSelection::open(product("1", 0));
        for n in 1..=5 {
            assert!(matches!(
                selection.set_quantity(n),
                Err(ValidationError::OutOfStock { .. })
            ));
        }
        assert!(selection.increment().is_err());
        assert!(!selection.can_increment());
        assert_eq!(selection.quantity(), 1);
    }

    #[test]
    fn test_commit_payload_snapshots_choices() {
        let mut selection = ProductSelection::open(product("1", 4));
        selection.select_color(Some("blue".into()));
        selection.set_quantity(2).unwrap();

        let payload = selection.commit_payload(ActionKind::AddToCart).unwrap();
        selection.set_quantity(4).unwrap();

        assert_eq!(payload.quantity, 2);
        assert_eq!(payload.color.as_deref(), Some("blue"));
        assert_eq!(payload.size.as_deref(), Some("S"));
    }

    #[test]
    fn test_image_selection_stays_in_range() {
        let mut selection = ProductSelection::open(product("1", 1));
        selection.select_image(10);
        assert_eq!(selection.image_index(), 2);

        selection.next_image();
        assert_eq!(selection.image_index(), 0);
        selection.prev_image();
        assert_eq!(selection.image_index(), 2);
        assert_eq!(selection.selected_image(), Some("c.jpg"));
    }

    #[test]
    fn test_refresh_same_product_keeps_choices() {
        let mut selection = ProductSelection::open(product("1", 5));
        selection.select_size(Some("L".into()));
        selection.set_tab(QuickViewTab::Reviews);
        selection.set_quantity(5).unwrap();

        selection.refresh(product("1", 2));

        assert_eq!(selection.selected_size(), Some("L"));
        assert_eq!(selection.active_tab(), QuickViewTab::Reviews);
        assert_eq!(selection.quantity(), 2);
    }

    #[test]
    fn test_refresh_other_product_resets() {
        let mut selection = ProductSelection::open(product("1", 5));
        selection.select_size(Some("L".into()));
        selection.set_quantity(4).unwrap();

        selection.refresh(product("2", 5));

        assert_eq!(selection.product_id(), "2");
        assert_eq!(selection.selected_size(), Some("S"));
        assert_eq!(selection.quantity(), 1);
    }

    #[test]
    fn test_quick_view_close_is_idempotent() {
        let mut view = QuickView::new();
        assert!(!view.close());

        view.open(product("1", 2));
        assert!(view.is_open());
        assert!(view.close());
        assert!(!view.close());
        assert!(view.selection().is_none());
    }
}
