//! # storefront-core: Pure Interaction State
//!
//! The deterministic half of the storefront interaction engine: everything
//! that can be decided without a clock or a network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Storefront Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Browser front end (rendering)                   │   │
//! │  │     Hero carousel ── Promo strip ── Quick View ── Cart page     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ snapshots / commands                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          storefront-engine (timers, orchestrator)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   types   │  │   deck    │  │ selection │  │validation │   │   │
//! │  │   │  Slide    │  │ SlideDeck │  │ Product-  │  │ clamp,    │   │   │
//! │  │   │  Product  │  │ Swipe     │  │ Selection │  │ commit    │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO TIMERS • PURE FUNCTIONS                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Slides, products, commerce actions
//! - [`deck`] - Cyclic slide indexing and swipe mapping
//! - [`selection`] - Quick View selection state
//! - [`validation`] - Quantity clamping and the commit gate
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::deck::{Direction, SlideDeck};
//! use storefront_core::types::Slide;
//!
//! let deck = SlideDeck::new(vec![
//!     Slide::image("hero/1.jpg"),
//!     Slide::image("hero/2.jpg"),
//!     Slide::image("hero/3.jpg"),
//! ])
//! .unwrap();
//!
//! assert_eq!(deck.step(2, Direction::Forward), 0);
//! assert_eq!(deck.step(0, Direction::Backward), 2);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod deck;
pub mod error;
pub mod selection;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use deck::{Direction, SlideDeck, Swipe};
pub use error::{CoreError, CoreResult, ValidationError};
pub use selection::{ProductSelection, QuickView};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines a cart may hold.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single cart line.
///
/// Guards against a mistyped quantity (1000 instead of 10).
pub const MAX_LINE_QUANTITY: u32 = 999;
