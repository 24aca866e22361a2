//! # In-Memory Collaborators
//!
//! Process-local implementations of the collaborator traits. The simulator
//! runs on them and the orchestrator tests script failures, latency and
//! login outcomes through them.
//!
//! ## Thread Safety
//! State sits behind `std::sync::Mutex`. Guards are never held across an
//! `.await`; simulated latency is slept before the lock is taken.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  InMemoryCart        add_to_cart ──► [latency] ──► [scripted failure]   │
//! │                                         ──► merge into lines            │
//! │  InMemoryWishlist    toggle ────────► [latency] ──► insert / remove     │
//! │  ScriptedAuthGate    request_login ─► prompt_opened ──► complete_login  │
//! │  RecordingNavigator  go_to ─────────► routes.push                       │
//! │  RecordingNotifier   notify ────────► notices.push                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_core::{Product, MAX_CART_LINES, MAX_LINE_QUANTITY};
use tokio::sync::{oneshot, Notify};
use tracing::debug;

use crate::error::ServiceError;
use crate::services::{
    AuthGate, CartService, LoginResult, Navigator, NoticeKind, Notifier, WishlistService,
    WishlistToggle,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn simulate_latency(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One line of the cart.
///
/// Lines are unique by product, size and color. Name and price are frozen
/// when the line is first created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub size: Option<String>,
    pub color: Option<String>,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    fn new(product: &Product, quantity: u32, size: Option<&str>, color: Option<&str>) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            size: size.map(str::to_string),
            color: color.map(str::to_string),
            quantity,
            added_at: Utc::now(),
        }
    }

    fn is_same_variant(&self, product_id: &str, size: Option<&str>, color: Option<&str>) -> bool {
        self.product_id == product_id && self.size.as_deref() == size && self.color.as_deref() == color
    }

    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.quantity)
    }
}

/// Cart kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryCart {
    lines: Mutex<Vec<CartLine>>,
    failures: Mutex<VecDeque<ServiceError>>,
    calls: AtomicUsize,
    latency: Duration,
}

impl InMemoryCart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call waits `latency` before answering.
    pub fn with_latency(latency: Duration) -> Self {
        InMemoryCart {
            latency,
            ..Self::default()
        }
    }

    /// Makes the next call fail with `error`. Queued failures are consumed
    /// in order.
    pub fn fail_next(&self, error: ServiceError) {
        lock(&self.failures).push_back(error);
    }

    /// Number of `add_to_cart` calls received, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn lines(&self) -> Vec<CartLine> {
        lock(&self.lines).clone()
    }

    pub fn total_quantity(&self) -> u32 {
        lock(&self.lines).iter().map(|l| l.quantity).sum()
    }

    pub fn subtotal_cents(&self) -> i64 {
        lock(&self.lines).iter().map(CartLine::line_total_cents).sum()
    }

    pub fn clear(&self) {
        lock(&self.lines).clear();
    }
}

#[async_trait]
impl CartService for InMemoryCart {
    async fn add_to_cart(
        &self,
        product: &Product,
        quantity: u32,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Result<(), ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        simulate_latency(self.latency).await;

        let scripted = lock(&self.failures).pop_front();
        if let Some(error) = scripted {
            return Err(error);
        }

        let mut lines = lock(&self.lines);
        if let Some(line) = lines
            .iter_mut()
            .find(|l| l.is_same_variant(&product.id, size, color))
        {
            let merged = line.quantity.saturating_add(quantity);
            if merged > MAX_LINE_QUANTITY {
                return Err(ServiceError::Backend {
                    status: 422,
                    message: format!("Quantity would exceed maximum of {}", MAX_LINE_QUANTITY),
                });
            }
            line.quantity = merged;
            debug!(product_id = %product.id, quantity = merged, "Cart line merged");
            return Ok(());
        }

        if lines.len() >= MAX_CART_LINES {
            return Err(ServiceError::Backend {
                status: 422,
                message: format!("Cart cannot have more than {} lines", MAX_CART_LINES),
            });
        }

        lines.push(CartLine::new(product, quantity, size, color));
        debug!(product_id = %product.id, quantity, "Cart line added");
        Ok(())
    }
}

// =============================================================================
// Wishlist
// =============================================================================

#[derive(Debug, Default)]
pub struct InMemoryWishlist {
    items: Mutex<HashSet<String>>,
    failures: Mutex<VecDeque<ServiceError>>,
    calls: AtomicUsize,
    latency: Duration,
}

impl InMemoryWishlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        InMemoryWishlist {
            latency,
            ..Self::default()
        }
    }

    pub fn fail_next(&self, error: ServiceError) {
        lock(&self.failures).push_back(error);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        lock(&self.items).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.items).is_empty()
    }
}

#[async_trait]
impl WishlistService for InMemoryWishlist {
    async fn toggle_wishlist(&self, product: &Product) -> Result<WishlistToggle, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        simulate_latency(self.latency).await;

        let scripted = lock(&self.failures).pop_front();
        if let Some(error) = scripted {
            return Err(error);
        }

        let mut items = lock(&self.items);
        let was_added = if items.remove(&product.id) {
            false
        } else {
            items.insert(product.id.clone());
            true
        };
        Ok(WishlistToggle { was_added })
    }

    fn is_in_wishlist(&self, product_id: &str) -> bool {
        lock(&self.items).contains(product_id)
    }
}

// =============================================================================
// Auth Gate
// =============================================================================

/// How [`ScriptedAuthGate`] answers a login request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginScript {
    /// Waits for [`ScriptedAuthGate::complete_login`].
    Manual,
    /// Succeeds after the given delay.
    Approve(Duration),
    /// Fails immediately, as if the shopper closed the popup.
    Deny,
}

/// Auth gate whose login popup is driven by the caller.
#[derive(Debug)]
pub struct ScriptedAuthGate {
    authenticated: AtomicBool,
    script: LoginScript,
    login_calls: AtomicUsize,
    outstanding: Mutex<Option<oneshot::Sender<bool>>>,
    prompt_opened: Notify,
}

impl ScriptedAuthGate {
    pub fn new(authenticated: bool, script: LoginScript) -> Self {
        ScriptedAuthGate {
            authenticated: AtomicBool::new(authenticated),
            script,
            login_calls: AtomicUsize::new(0),
            outstanding: Mutex::new(None),
            prompt_opened: Notify::new(),
        }
    }

    pub fn signed_in() -> Self {
        Self::new(true, LoginScript::Manual)
    }

    pub fn signed_out() -> Self {
        Self::new(false, LoginScript::Manual)
    }

    pub fn sign_out(&self) {
        self.authenticated.store(false, Ordering::SeqCst);
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    /// Resolves once a popup has been opened. A popup opened before the
    /// call counts.
    pub async fn prompt_opened(&self) {
        self.prompt_opened.notified().await;
    }

    /// Answers the open popup. Returns false if none is open.
    pub fn complete_login(&self, success: bool) -> bool {
        match lock(&self.outstanding).take() {
            Some(tx) => tx.send(success).is_ok(),
            None => false,
        }
    }
}

#[async_trait]
impl AuthGate for ScriptedAuthGate {
    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    async fn request_login(&self) -> LoginResult {
        self.login_calls.fetch_add(1, Ordering::SeqCst);

        let success = match self.script {
            LoginScript::Manual => {
                let (tx, rx) = oneshot::channel();
                *lock(&self.outstanding) = Some(tx);
                self.prompt_opened.notify_one();
                rx.await.unwrap_or(false)
            }
            LoginScript::Approve(delay) => {
                self.prompt_opened.notify_one();
                simulate_latency(delay).await;
                true
            }
            LoginScript::Deny => {
                self.prompt_opened.notify_one();
                false
            }
        };

        if success {
            self.authenticated.store(true, Ordering::SeqCst);
        }
        debug!(success, "Login popup closed");
        LoginResult { success }
    }
}

// =============================================================================
// Navigation and Notifications
// =============================================================================

#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<String> {
        lock(&self.routes).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn go_to(&self, route: &str) {
        debug!(route, "Navigating");
        lock(&self.routes).push(route.to_string());
    }
}

/// Notifier that keeps every notice; nothing is dismissed.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(NoticeKind, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<(NoticeKind, String)> {
        lock(&self.notices).clone()
    }

    pub fn count(&self, kind: NoticeKind) -> usize {
        lock(&self.notices).iter().filter(|(k, _)| *k == kind).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        lock(&self.notices).push((kind, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price_cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            price_cents,
            images: vec![],
            colors: vec![],
            sizes: vec![],
            stock_left: 10,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_cart_merges_same_variant() {
        let cart = InMemoryCart::new();
        let tee = product("tee", 1_500);

        cart.add_to_cart(&tee, 1, Some("M"), Some("Black")).await.unwrap();
        cart.add_to_cart(&tee, 2, Some("M"), Some("Black")).await.unwrap();
        cart.add_to_cart(&tee, 1, Some("L"), Some("Black")).await.unwrap();

        let lines = cart.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(cart.total_quantity(), 4);
        assert_eq!(cart.subtotal_cents(), 6_000);
        assert_eq!(cart.calls(), 3);
    }

    #[tokio::test]
    async fn test_cart_rejects_quantity_over_maximum() {
        let cart = InMemoryCart::new();
        let tee = product("tee", 100);

        cart.add_to_cart(&tee, MAX_LINE_QUANTITY, None, None).await.unwrap();
        let err = cart.add_to_cart(&tee, 1, None, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Backend { status: 422, .. }));
        assert_eq!(cart.total_quantity(), MAX_LINE_QUANTITY);
    }

    #[tokio::test]
    async fn test_cart_scripted_failure_consumed_once() {
        let cart = InMemoryCart::new();
        cart.fail_next(ServiceError::Network("reset".to_string()));
        let tee = product("tee", 100);

        assert!(cart.add_to_cart(&tee, 1, None, None).await.is_err());
        assert!(cart.add_to_cart(&tee, 1, None, None).await.is_ok());
        assert_eq!(cart.calls(), 2);
        assert_eq!(cart.lines().len(), 1);
    }

    #[tokio::test]
    async fn test_wishlist_toggles() {
        let wishlist = InMemoryWishlist::new();
        let mug = product("mug", 900);

        assert!(wishlist.toggle_wishlist(&mug).await.unwrap().was_added);
        assert!(wishlist.is_in_wishlist("mug"));
        assert!(!wishlist.toggle_wishlist(&mug).await.unwrap().was_added);
        assert!(wishlist.is_empty());
    }

    #[tokio::test]
    async fn test_manual_login_flow() {
        let gate = std::sync::Arc::new(ScriptedAuthGate::signed_out());
        assert!(!gate.complete_login(true));

        let task = tokio::spawn({
            let gate = gate.clone();
            async move { gate.request_login().await }
        });

        gate.prompt_opened().await;
        assert_eq!(gate.login_calls(), 1);
        assert!(gate.complete_login(true));

        assert!(task.await.unwrap().success);
        assert!(gate.is_authenticated());
    }

    #[tokio::test]
    async fn test_denied_login_stays_signed_out() {
        let gate = ScriptedAuthGate::new(false, LoginScript::Deny);
        assert!(!gate.request_login().await.success);
        assert!(!gate.is_authenticated());
    }

    #[test]
    fn test_recorders() {
        let nav = RecordingNavigator::new();
        nav.go_to("/checkout");
        assert_eq!(nav.routes(), vec!["/checkout".to_string()]);

        let notifier = RecordingNotifier::new();
        notifier.notify(NoticeKind::Error, "nope");
        notifier.notify(NoticeKind::Success, "yes");
        assert_eq!(notifier.count(NoticeKind::Error), 1);
        assert_eq!(notifier.notices().len(), 2);
    }
}
