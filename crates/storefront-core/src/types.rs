//! # Domain Types
//!
//! Data shared between the carousel, the Quick View and the front end.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Slide       │   │    Product      │   │  PendingAction  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  index          │   │  id             │   │  kind           │       │
//! │  │  image_ref      │   │  images/colors  │   │  payload        │       │
//! │  │  title? ctas?   │   │  sizes, stock   │   │  captured_at    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │   ActionKind    │   │  QuickViewTab   │                             │
//! │  │  AddToCart      │   │  Description    │                             │
//! │  │  Wishlist       │   │  Specifications │                             │
//! │  │  BuyNow         │   │  Reviews        │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Slides
// =============================================================================

/// A call-to-action button rendered on a slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cta {
    pub label: String,
    pub href: String,
}

/// One entry of a carousel.
///
/// `index` is assigned by [`SlideDeck`](crate::deck::SlideDeck) from the load
/// order, so sources may omit it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Slide {
    #[serde(default)]
    pub index: usize,
    pub image_ref: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub primary_cta: Option<Cta>,
    #[serde(default)]
    pub secondary_cta: Option<Cta>,
}

impl Slide {
    /// Creates an image-only slide.
    pub fn image(image_ref: impl Into<String>) -> Self {
        Slide {
            index: 0,
            image_ref: image_ref.into(),
            title: None,
            subtitle: None,
            description: None,
            primary_cta: None,
            secondary_cta: None,
        }
    }

    /// Sets the headline.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the primary call-to-action.
    pub fn with_primary_cta(mut self, label: impl Into<String>, href: impl Into<String>) -> Self {
        self.primary_cta = Some(Cta {
            label: label.into(),
            href: href.into(),
        });
        self
    }
}

// =============================================================================
// Product
// =============================================================================

/// The catalog data a Quick View needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier. Identity of the Quick View selection.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Gallery images, first one is the cover.
    pub images: Vec<String>,

    /// Available colors, may be empty.
    #[serde(default)]
    pub colors: Vec<String>,

    /// Available sizes, may be empty for one-size products.
    #[serde(default)]
    pub sizes: Vec<String>,

    /// Units left in stock.
    pub stock_left: u32,

    #[serde(default)]
    pub description: Option<String>,
}

impl Product {
    /// Checks if at least one unit can be bought.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock_left > 0
    }
}

// =============================================================================
// Quick View Tab
// =============================================================================

/// Information tab shown under the product gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum QuickViewTab {
    #[default]
    Description,
    Specifications,
    Reviews,
}

// =============================================================================
// Commerce Actions
// =============================================================================

/// A commerce action a shopper can trigger from the Quick View.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ActionKind {
    AddToCart,
    Wishlist,
    BuyNow,
}

impl ActionKind {
    /// Returns true if this action places the product in the cart.
    pub fn commits_to_cart(&self) -> bool {
        matches!(self, ActionKind::AddToCart | ActionKind::BuyNow)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::AddToCart => write!(f, "add_to_cart"),
            ActionKind::Wishlist => write!(f, "wishlist"),
            ActionKind::BuyNow => write!(f, "buy_now"),
        }
    }
}

/// Configuration snapshot handed to a service call.
///
/// Frozen at click time: changing the live selection afterwards does not
/// affect an action that was deferred behind login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ActionPayload {
    pub product: Product,
    pub quantity: u32,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// An action postponed until the shopper has logged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PendingAction {
    pub kind: ActionKind,
    pub payload: ActionPayload,
    #[ts(as = "String")]
    pub captured_at: DateTime<Utc>,
}

impl PendingAction {
    /// Captures an action at the moment of the click.
    pub fn capture(kind: ActionKind, payload: ActionPayload) -> Self {
        PendingAction {
            kind,
            payload,
            captured_at: Utc::now(),
        }
    }
}
