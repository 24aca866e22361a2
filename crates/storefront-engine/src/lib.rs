//! # storefront-engine: Timed Interaction Engine
//!
//! Async half of the storefront: carousels that advance on a timer, the
//! commerce orchestrator behind the Quick View, and the small shared services
//! around them.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Storefront Engine Architecture                      │
//! │                                                                         │
//! │  ┌──────────────────────────────┐   ┌──────────────────────────────┐   │
//! │  │  CarouselController (task)   │   │  CommerceOrchestrator        │   │
//! │  │                              │   │                              │   │
//! │  │  One tokio task per carousel │   │  Quick View selection        │   │
//! │  │  mpsc commands, watch state  │   │  Auth gate + resume on login │   │
//! │  │  dwell timer + unlock timer  │   │  Per-action loading flags    │   │
//! │  └──────────────┬───────────────┘   └──────────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │                 ▼                                  ▼                    │
//! │  ┌──────────────────────────────┐   ┌──────────────────────────────┐   │
//! │  │  TransitionLock              │   │  Services (trait objects)    │   │
//! │  │  Idle / Transitioning        │   │  AuthGate  CartService       │   │
//! │  └──────────────────────────────┘   │  WishlistService Navigator   │   │
//! │                                     │  Notifier                    │   │
//! │                                     └──────────────────────────────┘   │
//! │                                                                         │
//! │  SHARED: StorefrontConfig • SettingsCache • ToastCenter • SlideSource   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! ### Carousel
//! - [`transition_lock`] - Idle/Transitioning gate with fallback timeout
//! - [`carousel`] - Carousel actor and its handle
//! - [`slides`] - Static and JSON slide sources
//!
//! ### Commerce
//! - [`orchestrator`] - Guarded commerce actions
//! - [`services`] - Collaborator traits
//! - [`memory`] - In-process collaborator implementations
//!
//! ### Shared
//! - [`config`] - Storefront configuration (defaults, TOML, env)
//! - [`settings`] - Load-once site settings cache
//! - [`toast`] - Auto-dismissing notifications
//! - [`error`] - Engine error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_engine::{CarouselController, StaticSlides, StorefrontConfig};
//!
//! let config = StorefrontConfig::load_or_default(None);
//! let hero = CarouselController::mount("hero", &StaticSlides::new(slides), &config.carousel).await?;
//!
//! hero.next().await?;
//! let snapshot = hero.snapshot().await?;
//! println!("Showing slide {}", snapshot.current_index);
//!
//! hero.destroy().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

// Carousel
pub mod carousel;
pub mod slides;
pub mod transition_lock;

// Commerce
pub mod memory;
pub mod orchestrator;
pub mod services;

// Shared
pub mod config;
pub mod error;
pub mod settings;
pub mod toast;

// =============================================================================
// Re-exports
// =============================================================================

pub use carousel::{
    CarouselController, CarouselHandle, CarouselSnapshot, NavControls, NavOutcome, NavRequest,
};
pub use config::{CarouselSettings, CommerceSettings, NotificationSettings, StorefrontConfig};
pub use error::{EngineError, EngineResult, ServiceError};
pub use orchestrator::{ActionLoadingFlags, ActionOutcome, CommerceOrchestrator, LoginPrompt};
pub use services::{
    AuthGate, CartService, LoginResult, Navigator, NoticeKind, Notifier, Services, SlideSource,
    WishlistService, WishlistToggle,
};
pub use settings::{JsonSettings, SettingsCache, SettingsLoader, SiteSettings};
pub use slides::{load_deck, JsonSlides, StaticSlides};
pub use toast::{Toast, ToastCenter};
pub use transition_lock::{LockState, TransitionLock};
