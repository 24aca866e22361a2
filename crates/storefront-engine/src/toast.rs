//! # Toast Center
//!
//! In-process [`Notifier`]: keeps the visible toasts and removes each one
//! after the configured interval.
//!
//! ```text
//!   notify(kind, msg) ──► toasts.push(Toast{id, ..}) ──► watch ──► renderer
//!          │
//!          └─ spawn: sleep(dismiss_after) ──► dismiss(id)   (no-op if the
//!                                                            center is gone
//!                                                            or the toast was
//!                                                            closed by hand)
//! ```

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};
use ts_rs::TS;
use uuid::Uuid;

use crate::config::NotificationSettings;
use crate::services::{NoticeKind, Notifier};

/// A notification currently on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Toast {
    #[ts(as = "String")]
    pub id: Uuid,
    pub kind: NoticeKind,
    pub message: String,
    #[ts(as = "String")]
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug)]
struct ToastInner {
    dismiss_after: Duration,
    toasts: watch::Sender<Vec<Toast>>,
}

impl ToastInner {
    fn dismiss(&self, id: Uuid) -> bool {
        let mut removed = false;
        self.toasts.send_if_modified(|toasts| {
            let before = toasts.len();
            toasts.retain(|t| t.id != id);
            removed = toasts.len() != before;
            removed
        });
        removed
    }
}

/// Cloneable toast list with auto-dismiss.
#[derive(Debug, Clone)]
pub struct ToastCenter {
    inner: Arc<ToastInner>,
}

impl ToastCenter {
    pub fn new(settings: &NotificationSettings) -> Self {
        Self::with_dismiss_after(settings.dismiss_after())
    }

    pub fn with_dismiss_after(dismiss_after: Duration) -> Self {
        let (toasts, _) = watch::channel(Vec::new());
        ToastCenter {
            inner: Arc::new(ToastInner {
                dismiss_after,
                toasts,
            }),
        }
    }

    /// Toasts currently visible, oldest first.
    pub fn active(&self) -> Vec<Toast> {
        self.inner.toasts.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.inner.toasts.subscribe()
    }

    /// Closes a toast early. Returns false if it was already gone.
    pub fn dismiss(&self, id: Uuid) -> bool {
        self.inner.dismiss(id)
    }

    fn schedule_dismiss(&self, id: Uuid) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(%id, "No runtime available, toast will not auto-dismiss");
            return;
        };

        let weak: Weak<ToastInner> = Arc::downgrade(&self.inner);
        let after = self.inner.dismiss_after;
        runtime.spawn(async move {
            tokio::time::sleep(after).await;
            if let Some(inner) = weak.upgrade() {
                inner.dismiss(id);
            }
        });
    }
}

impl Notifier for ToastCenter {
    fn notify(&self, kind: NoticeKind, message: &str) {
        let toast = Toast {
            id: Uuid::new_v4(),
            kind,
            message: message.to_string(),
            issued_at: Utc::now(),
        };
        let id = toast.id;
        debug!(%id, %kind, message, "Toast shown");

        self.inner.toasts.send_modify(|toasts| toasts.push(toast));
        self.schedule_dismiss(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_toast_auto_dismisses() {
        let center = ToastCenter::with_dismiss_after(Duration::from_millis(3_000));
        center.notify(NoticeKind::Success, "Added to cart");

        let active = center.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].kind, NoticeKind::Success);

        sleep(Duration::from_millis(2_999)).await;
        assert_eq!(center.active().len(), 1);

        sleep(Duration::from_millis(2)).await;
        assert!(center.active().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_dismiss_then_timer_is_noop() {
        let center = ToastCenter::with_dismiss_after(Duration::from_millis(3_000));
        center.notify(NoticeKind::Error, "Could not add to cart. Please try again.");
        center.notify(NoticeKind::Success, "Added to wishlist");

        let first = center.active()[0].id;
        assert!(center.dismiss(first));
        assert!(!center.dismiss(first));
        assert_eq!(center.active().len(), 1);

        sleep(Duration::from_millis(3_001)).await;
        assert!(center.active().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_updates() {
        let center = ToastCenter::with_dismiss_after(Duration::from_millis(100));
        let mut rx = center.subscribe();

        center.notify(NoticeKind::Success, "Saved");
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);

        rx.changed().await.unwrap();
        assert!(rx.borrow().is_empty());
    }

    #[test]
    fn test_toast_binding_uses_renderer_field_names() {
        let decl = Toast::decl();
        assert!(decl.contains("issuedAt"));
        assert!(decl.contains("kind: NoticeKind"));
        assert!(!decl.contains("issued_at"));
    }
}
