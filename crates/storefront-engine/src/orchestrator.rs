//! # Commerce Orchestrator
//!
//! Runs the Quick View commerce actions (add to cart, wishlist toggle, buy
//! now) against the collaborator services.
//!
//! ## Action Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  trigger(kind)                                                          │
//! │     │                                                                   │
//! │     ├── no product loaded ──────────────────────────► Ignored           │
//! │     ├── validate_commit() fails ────────────────────► Invalid(err)      │
//! │     ├── not authenticated ──► store PendingAction                       │
//! │     │                         spawn request_login ──► LoginRequested    │
//! │     │                               │                                   │
//! │     │                      success ─┴─► execute(pending) once           │
//! │     │                      failure ───► discard pending                 │
//! │     │                                                                   │
//! │     └── execute(kind, payload)                                          │
//! │            ├── flag already set ────────────────────► Busy(kind)        │
//! │            ├── set flag ──► service call ──► clear flag                 │
//! │            ├── view changed meanwhile ──► no effects ► Completed/Failed │
//! │            ├── Ok  ──► success toast, close / navigate ► Completed      │
//! │            └── Err ──► log + generic toast ─────────► Failed            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick View Sessions
//! Every open or close starts a new session: loading flags and any pending
//! action are reset. A call that finishes after its session ended returns
//! its outcome but leaves flags, view, toasts and navigation alone.
//!
//! ## Loading Flags
//! Add to cart and buy now share the cart flag; the wishlist has its own.
//! A cart action and a wishlist toggle may run at the same time, two cart
//! actions may not.
//!
//! ## Locking
//! State sits behind one `tokio::sync::Mutex`. It is never held across a
//! service call, so a slow backend cannot block selection edits.

use std::sync::Arc;

use serde::Serialize;
use storefront_core::validation::validate_commit;
use storefront_core::{
    ActionKind, ActionPayload, PendingAction, Product, ProductSelection, QuickView,
    ValidationError,
};
use tokio::sync::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info};
use ts_rs::TS;
use uuid::Uuid;

use crate::config::CommerceSettings;
use crate::error::ServiceError;
use crate::services::{NoticeKind, Services};

// =============================================================================
// Public Types
// =============================================================================

/// Which actions are waiting on a service call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ActionLoadingFlags {
    pub is_adding_to_cart: bool,
    pub is_wishlist_toggling: bool,
}

impl ActionLoadingFlags {
    /// True if an action of this kind is in flight.
    pub fn is_loading(&self, kind: ActionKind) -> bool {
        match kind {
            ActionKind::AddToCart | ActionKind::BuyNow => self.is_adding_to_cart,
            ActionKind::Wishlist => self.is_wishlist_toggling,
        }
    }

    fn set(&mut self, kind: ActionKind, value: bool) {
        match kind {
            ActionKind::AddToCart | ActionKind::BuyNow => self.is_adding_to_cart = value,
            ActionKind::Wishlist => self.is_wishlist_toggling = value,
        }
    }
}

/// Handle to a deferred action waiting on the login popup.
#[derive(Debug)]
pub struct LoginPrompt {
    task: Option<JoinHandle<Option<ActionOutcome>>>,
}

impl LoginPrompt {
    /// False when the click joined a popup that was already open.
    pub fn opened_popup(&self) -> bool {
        self.task.is_some()
    }

    /// Waits for the login outcome and the resumed action.
    ///
    /// None if login failed, the orchestrator was disposed, or this click
    /// joined an already open popup (that popup's prompt carries the
    /// result).
    pub async fn resumed(self) -> Option<ActionOutcome> {
        match self.task {
            Some(task) => task.await.ok().flatten(),
            None => None,
        }
    }
}

/// What a trigger did.
#[derive(Debug)]
pub enum ActionOutcome {
    /// The service call succeeded. `in_wishlist` is set for wishlist toggles.
    Completed {
        kind: ActionKind,
        in_wishlist: Option<bool>,
    },

    /// The service call failed; a generic toast was shown.
    Failed { kind: ActionKind, error: ServiceError },

    /// The selection cannot be committed; nothing was called.
    Invalid(ValidationError),

    /// An action sharing the same loading flag is still in flight.
    Busy(ActionKind),

    /// Deferred behind the login popup.
    LoginRequested(LoginPrompt),

    /// No product loaded, or the orchestrator was disposed.
    Ignored,
}

impl ActionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, ActionOutcome::Completed { .. })
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

#[derive(Debug, Default)]
struct OrchestratorState {
    quick_view: QuickView,
    pending: Option<PendingAction>,
    login_in_flight: bool,
    login_task: Option<AbortHandle>,
    flags: ActionLoadingFlags,
    generation: u64,
    disposed: bool,
}

impl OrchestratorState {
    /// Starts a new Quick View session; earlier in-flight calls go stale.
    fn begin_session(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.flags = ActionLoadingFlags::default();
        self.pending = None;
    }
}

#[derive(Debug)]
struct Inner {
    id: Uuid,
    services: Services,
    checkout_route: String,
    state: Mutex<OrchestratorState>,
}

/// One Quick View's commerce state. Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct CommerceOrchestrator {
    inner: Arc<Inner>,
}

impl CommerceOrchestrator {
    pub fn new(services: Services, settings: &CommerceSettings) -> Self {
        let id = Uuid::new_v4();
        debug!(orchestrator = %id, "Commerce orchestrator created");
        CommerceOrchestrator {
            inner: Arc::new(Inner {
                id,
                services,
                checkout_route: settings.checkout_route.clone(),
                state: Mutex::new(OrchestratorState::default()),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    // =========================================================================
    // Quick View
    // =========================================================================

    /// Shows `product` with a fresh selection. Ignored after dispose.
    pub async fn open_quick_view(&self, product: Product) -> bool {
        let mut state = self.inner.state.lock().await;
        if state.disposed {
            return false;
        }
        debug!(orchestrator = %self.inner.id, product_id = %product.id, "Quick View opened");
        state.begin_session();
        state.quick_view.open(product);
        true
    }

    pub async fn close_quick_view(&self) -> bool {
        let mut state = self.inner.state.lock().await;
        let closed = state.quick_view.close();
        if closed {
            state.begin_session();
        }
        closed
    }

    /// Applies fresh product data to the open selection.
    pub async fn refresh_product(&self, product: Product) {
        self.inner.state.lock().await.quick_view.refresh(product);
    }

    pub async fn selection(&self) -> Option<ProductSelection> {
        self.inner.state.lock().await.quick_view.selection().cloned()
    }

    /// Edits the live selection. None when nothing is open.
    ///
    /// ```ignore
    /// orchestrator.update_selection(|s| s.increment()).await;
    /// ```
    pub async fn update_selection<R>(&self, f: impl FnOnce(&mut ProductSelection) -> R) -> Option<R> {
        let mut state = self.inner.state.lock().await;
        state.quick_view.selection_mut().map(f)
    }

    /// Wishlist membership of the product on screen.
    pub async fn in_wishlist(&self) -> Option<bool> {
        let state = self.inner.state.lock().await;
        let selection = state.quick_view.selection()?;
        Some(self.inner.services.wishlist.is_in_wishlist(selection.product_id()))
    }

    pub async fn loading_flags(&self) -> ActionLoadingFlags {
        self.inner.state.lock().await.flags
    }

    pub async fn pending_action(&self) -> Option<PendingAction> {
        self.inner.state.lock().await.pending.clone()
    }

    // =========================================================================
    // Actions
    // =========================================================================

    pub async fn add_to_cart(&self) -> ActionOutcome {
        self.trigger(ActionKind::AddToCart).await
    }

    pub async fn toggle_wishlist(&self) -> ActionOutcome {
        self.trigger(ActionKind::Wishlist).await
    }

    pub async fn buy_now(&self) -> ActionOutcome {
        self.trigger(ActionKind::BuyNow).await
    }

    /// Entry point shared by every action.
    pub async fn trigger(&self, kind: ActionKind) -> ActionOutcome {
        let id = self.inner.id;

        let payload = {
            let mut state = self.inner.state.lock().await;
            if state.disposed {
                return ActionOutcome::Ignored;
            }

            let Some(selection) = state.quick_view.selection() else {
                debug!(orchestrator = %id, %kind, "No product loaded, action ignored");
                return ActionOutcome::Ignored;
            };

            let payload = match validate_commit(selection, kind) {
                Ok(payload) => payload,
                Err(e) => {
                    debug!(orchestrator = %id, %kind, error = %e, "Selection rejected");
                    return ActionOutcome::Invalid(e);
                }
            };

            if !self.inner.services.auth.is_authenticated() {
                state.pending = Some(PendingAction::capture(kind, payload));

                if state.login_in_flight {
                    debug!(orchestrator = %id, %kind, "Login already open, pending action replaced");
                    return ActionOutcome::LoginRequested(LoginPrompt { task: None });
                }

                info!(orchestrator = %id, %kind, "Login required, action deferred");
                let prompt = self.spawn_login();
                state.login_in_flight = true;
                state.login_task = prompt.task.as_ref().map(JoinHandle::abort_handle);
                return ActionOutcome::LoginRequested(prompt);
            }

            payload
        };

        self.execute(kind, payload).await
    }

    fn spawn_login(&self) -> LoginPrompt {
        let this = self.clone();
        let task = tokio::spawn(async move {
            let result = this.inner.services.auth.request_login().await;
            this.resume_after_login(result.success).await
        });
        LoginPrompt { task: Some(task) }
    }

    /// Runs the pending action once after a successful login. The pending
    /// action is cleared whatever happens.
    async fn resume_after_login(&self, success: bool) -> Option<ActionOutcome> {
        let id = self.inner.id;
        let pending = {
            let mut state = self.inner.state.lock().await;
            state.login_in_flight = false;
            state.login_task = None;
            if state.disposed {
                return None;
            }
            state.pending.take()
        }?;

        if !success {
            info!(orchestrator = %id, kind = %pending.kind, "Login not completed, pending action discarded");
            return None;
        }

        info!(orchestrator = %id, kind = %pending.kind, "Login succeeded, resuming action");
        Some(self.execute(pending.kind, pending.payload).await)
    }

    async fn execute(&self, kind: ActionKind, payload: ActionPayload) -> ActionOutcome {
        let id = self.inner.id;

        let generation = {
            let mut state = self.inner.state.lock().await;
            if state.disposed {
                return ActionOutcome::Ignored;
            }
            if state.flags.is_loading(kind) {
                debug!(orchestrator = %id, %kind, "Action already in flight, click dropped");
                return ActionOutcome::Busy(kind);
            }
            state.flags.set(kind, true);
            state.generation
        };

        let services = &self.inner.services;
        let result = match kind {
            ActionKind::AddToCart | ActionKind::BuyNow => services
                .cart
                .add_to_cart(
                    &payload.product,
                    payload.quantity,
                    payload.size.as_deref(),
                    payload.color.as_deref(),
                )
                .await
                .map(|()| None),
            ActionKind::Wishlist => services
                .wishlist
                .toggle_wishlist(&payload.product)
                .await
                .map(|toggle| Some(toggle.was_added)),
        };

        let mut state = self.inner.state.lock().await;

        // Flags of a newer session belong to that session's calls.
        if state.disposed || state.generation != generation {
            debug!(orchestrator = %id, %kind, "Quick View changed while in flight, effects skipped");
            return match result {
                Ok(in_wishlist) => ActionOutcome::Completed { kind, in_wishlist },
                Err(error) => ActionOutcome::Failed { kind, error },
            };
        }
        state.flags.set(kind, false);

        match result {
            Ok(in_wishlist) => {
                if kind.commits_to_cart() && state.quick_view.close() {
                    state.begin_session();
                }
                drop(state);

                info!(orchestrator = %id, %kind, product_id = %payload.product.id, "Action completed");
                services
                    .notifier
                    .notify(NoticeKind::Success, &success_message(kind, &payload, in_wishlist));
                if kind == ActionKind::BuyNow {
                    services.navigator.go_to(&self.inner.checkout_route);
                }
                ActionOutcome::Completed { kind, in_wishlist }
            }
            Err(error) => {
                drop(state);

                error!(
                    orchestrator = %id,
                    %kind,
                    error = %error,
                    retryable = error.is_retryable(),
                    "Action failed"
                );
                services
                    .notifier
                    .notify(NoticeKind::Error, ServiceError::user_message(kind));
                ActionOutcome::Failed { kind, error }
            }
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Tears the Quick View down. Calls still in flight finish without
    /// touching state, toasts or navigation; an open login is abandoned.
    pub async fn dispose(&self) {
        let mut state = self.inner.state.lock().await;
        if state.disposed {
            return;
        }
        state.disposed = true;
        state.begin_session();
        state.quick_view.close();
        state.login_in_flight = false;
        if let Some(task) = state.login_task.take() {
            task.abort();
        }
        debug!(orchestrator = %self.inner.id, "Commerce orchestrator disposed");
    }

    pub async fn is_disposed(&self) -> bool {
        self.inner.state.lock().await.disposed
    }
}

fn success_message(kind: ActionKind, payload: &ActionPayload, in_wishlist: Option<bool>) -> String {
    match kind {
        ActionKind::AddToCart => format!("Added {} to cart", payload.product.name),
        ActionKind::BuyNow => format!("Added {} to cart, heading to checkout", payload.product.name),
        ActionKind::Wishlist if in_wishlist == Some(false) => "Removed from wishlist".to_string(),
        ActionKind::Wishlist => "Added to wishlist".to_string(),
    }
}
