//! # Collaborator Traits
//!
//! Seams to everything the engine does not own: authentication, cart and
//! wishlist persistence, routing, toasts and slide content.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CommerceOrchestrator                                                   │
//! │     │                                                                   │
//! │     ├── AuthGate ─────────── is_authenticated() / request_login()       │
//! │     ├── CartService ──────── add_to_cart(product, qty, size, color)     │
//! │     ├── WishlistService ──── toggle_wishlist(product) / is_in_wishlist  │
//! │     ├── Navigator ────────── go_to(route)                               │
//! │     └── Notifier ─────────── notify(kind, message)                      │
//! │                                                                         │
//! │  CarouselController ◄────── SlideSource::load() (once, at mount)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storefront_core::{Product, Slide};
use ts_rs::TS;

use crate::error::{EngineResult, ServiceError};

/// Outcome of the login popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginResult {
    pub success: bool,
}

/// Result of a wishlist toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WishlistToggle {
    /// True if the product is now in the wishlist, false if it was removed.
    pub was_added: bool,
}

/// Toast flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum NoticeKind {
    Success,
    Error,
}

impl std::fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoticeKind::Success => write!(f, "success"),
            NoticeKind::Error => write!(f, "error"),
        }
    }
}

#[async_trait]
pub trait AuthGate: Send + Sync {
    fn is_authenticated(&self) -> bool;

    /// Opens the login popup and resolves once it reports an outcome.
    async fn request_login(&self) -> LoginResult;
}

#[async_trait]
pub trait CartService: Send + Sync {
    async fn add_to_cart(
        &self,
        product: &Product,
        quantity: u32,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait WishlistService: Send + Sync {
    async fn toggle_wishlist(&self, product: &Product) -> Result<WishlistToggle, ServiceError>;

    /// Local membership check; no round trip.
    fn is_in_wishlist(&self, product_id: &str) -> bool;
}

pub trait Navigator: Send + Sync {
    fn go_to(&self, route: &str);
}

/// Fire-and-forget toasts. Implementations dismiss them on their own.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NoticeKind, message: &str);
}

/// Ordered slide content, fetched once per mount.
#[async_trait]
pub trait SlideSource: Send + Sync {
    async fn load(&self) -> EngineResult<Vec<Slide>>;
}

/// Bundle of collaborators an orchestrator talks to.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthGate>,
    pub cart: Arc<dyn CartService>,
    pub wishlist: Arc<dyn WishlistService>,
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("authenticated", &self.auth.is_authenticated())
            .finish_non_exhaustive()
    }
}
