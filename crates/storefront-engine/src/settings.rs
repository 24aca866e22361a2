//! # Site Settings Cache
//!
//! Site settings are fetched once and shared by every component that needs
//! them. Concurrent first readers share one fetch: the slot lock is held for
//! the duration of the load, so later readers wait for it and then read the
//! cached value.
//!
//! ```text
//!   get() ──► slot lock ──► cached? ── yes ──► Arc<T>
//!                              │
//!                              no ──► loader.load().await ──► store ──► Arc<T>
//!
//!   invalidate() ──► slot = None   (next get() fetches again)
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};

/// Storefront-wide settings served by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub store_name: String,

    #[serde(default = "default_currency")]
    pub currency: String,

    /// Orders at or above this subtotal ship free.
    #[serde(default)]
    pub free_shipping_threshold_cents: Option<i64>,

    /// Banner text shown above the hero carousel.
    #[serde(default)]
    pub announcement: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Fetches settings from wherever they live.
#[async_trait]
pub trait SettingsLoader<T>: Send + Sync {
    async fn load(&self) -> EngineResult<T>;
}

/// Settings delivered as a JSON document.
#[derive(Debug, Clone)]
pub struct JsonSettings {
    body: String,
}

impl JsonSettings {
    pub fn new(body: impl Into<String>) -> Self {
        JsonSettings { body: body.into() }
    }
}

#[async_trait]
impl SettingsLoader<SiteSettings> for JsonSettings {
    async fn load(&self) -> EngineResult<SiteSettings> {
        serde_json::from_str(&self.body).map_err(|e| EngineError::SettingsLoad(e.to_string()))
    }
}

/// Load-once cache in front of a [`SettingsLoader`].
pub struct SettingsCache<T> {
    loader: Arc<dyn SettingsLoader<T>>,
    slot: Mutex<Option<Arc<T>>>,
    fetches: AtomicUsize,
}

impl<T: Send + Sync> SettingsCache<T> {
    pub fn new(loader: Arc<dyn SettingsLoader<T>>) -> Self {
        SettingsCache {
            loader,
            slot: Mutex::new(None),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Returns the cached settings, fetching them on first use.
    ///
    /// A failed fetch is not cached; the next call tries again.
    pub async fn get(&self) -> EngineResult<Arc<T>> {
        let mut slot = self.slot.lock().await;
        if let Some(cached) = slot.as_ref() {
            return Ok(Arc::clone(cached));
        }

        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.loader.load().await {
            Ok(value) => {
                let value = Arc::new(value);
                *slot = Some(Arc::clone(&value));
                info!("Site settings loaded");
                Ok(value)
            }
            Err(e) => {
                warn!(error = %e, "Site settings fetch failed");
                Err(e)
            }
        }
    }

    /// Cached value without fetching. None while a fetch is running.
    pub fn peek(&self) -> Option<Arc<T>> {
        self.slot.try_lock().ok().and_then(|slot| slot.clone())
    }

    /// Drops the cached value so the next [`get`](Self::get) fetches again.
    pub async fn invalidate(&self) {
        if self.slot.lock().await.take().is_some() {
            debug!("Site settings invalidated");
        }
    }

    /// Number of fetches started so far.
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl<T> std::fmt::Debug for SettingsCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsCache")
            .field("fetches", &self.fetches.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct SlowLoader {
        delay: Duration,
        fail_first: AtomicUsize,
    }

    #[async_trait]
    impl SettingsLoader<SiteSettings> for SlowLoader {
        async fn load(&self) -> EngineResult<SiteSettings> {
            tokio::time::sleep(self.delay).await;
            if self.fail_first.load(Ordering::SeqCst) > 0 {
                self.fail_first.fetch_sub(1, Ordering::SeqCst);
                return Err(EngineError::SettingsLoad("503".to_string()));
            }
            Ok(SiteSettings {
                store_name: "Northwind".to_string(),
                currency: "EUR".to_string(),
                free_shipping_threshold_cents: Some(5_000),
                announcement: None,
            })
        }
    }

    fn cache(fail_first: usize) -> SettingsCache<SiteSettings> {
        SettingsCache::new(Arc::new(SlowLoader {
            delay: Duration::from_millis(200),
            fail_first: AtomicUsize::new(fail_first),
        }))
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_first_loads_share_one_fetch() {
        let cache = cache(0);

        let (a, b, c) = tokio::join!(cache.get(), cache.get(), cache.get());
        assert_eq!(a.unwrap().store_name, "Northwind");
        assert!(Arc::ptr_eq(&b.unwrap(), &c.unwrap()));
        assert_eq!(cache.fetches(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_forces_refetch() {
        let cache = cache(0);
        cache.get().await.unwrap();
        assert!(cache.peek().is_some());

        cache.invalidate().await;
        assert!(cache.peek().is_none());

        cache.get().await.unwrap();
        assert_eq!(cache.fetches(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_is_not_cached() {
        let cache = cache(1);

        let err = cache.get().await.unwrap_err();
        assert!(matches!(err, EngineError::SettingsLoad(_)));
        assert!(cache.get().await.is_ok());
        assert_eq!(cache.fetches(), 2);
    }

    #[tokio::test]
    async fn test_json_settings_defaults() {
        let loader = JsonSettings::new(r#"{"storeName": "Northwind"}"#);
        let settings = loader.load().await.unwrap();
        assert_eq!(settings.currency, "USD");
        assert!(settings.announcement.is_none());

        assert!(JsonSettings::new("[]").load().await.is_err());
    }
}
