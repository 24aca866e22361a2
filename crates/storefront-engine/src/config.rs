//! # Storefront Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     STOREFRONT_DWELL_MS=6000                                            │
//! │     STOREFRONT_CHECKOUT_ROUTE=/checkout                                 │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     ~/.config/storefront/storefront.toml (Linux)                        │
//! │     ~/Library/Application Support/com.storefront.web/... (macOS)        │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [carousel]
//! dwell_ms = 5000
//! transition_ms = 1000
//! swipe_threshold_px = 50.0
//!
//! [commerce]
//! checkout_route = "/checkout"
//!
//! [notifications]
//! dismiss_ms = 3000
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use storefront_core::deck::DEFAULT_SWIPE_THRESHOLD_PX;

use crate::error::{EngineError, EngineResult};

// =============================================================================
// Carousel Settings
// =============================================================================

/// Timing for every carousel on the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarouselSettings {
    /// How long a slide stays before autoplay moves on.
    #[serde(default = "default_dwell_ms")]
    pub dwell_ms: u64,

    /// Length of the visual transition; the lock falls back to releasing
    /// after this long.
    #[serde(default = "default_transition_ms")]
    pub transition_ms: u64,

    /// Minimum horizontal drag that counts as a swipe.
    #[serde(default = "default_swipe_threshold")]
    pub swipe_threshold_px: f64,
}

fn default_dwell_ms() -> u64 {
    5_000
}

fn default_transition_ms() -> u64 {
    1_000
}

fn default_swipe_threshold() -> f64 {
    DEFAULT_SWIPE_THRESHOLD_PX
}

impl Default for CarouselSettings {
    fn default() -> Self {
        CarouselSettings {
            dwell_ms: default_dwell_ms(),
            transition_ms: default_transition_ms(),
            swipe_threshold_px: default_swipe_threshold(),
        }
    }
}

impl CarouselSettings {
    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }
}

// =============================================================================
// Commerce Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommerceSettings {
    /// Route opened after a successful "Buy Now".
    #[serde(default = "default_checkout_route")]
    pub checkout_route: String,
}

fn default_checkout_route() -> String {
    "/checkout".to_string()
}

impl Default for CommerceSettings {
    fn default() -> Self {
        CommerceSettings {
            checkout_route: default_checkout_route(),
        }
    }
}

// =============================================================================
// Notification Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// How long a toast stays on screen.
    #[serde(default = "default_dismiss_ms")]
    pub dismiss_ms: u64,
}

fn default_dismiss_ms() -> u64 {
    3_000
}

impl Default for NotificationSettings {
    fn default() -> Self {
        NotificationSettings {
            dismiss_ms: default_dismiss_ms(),
        }
    }
}

impl NotificationSettings {
    pub fn dismiss_after(&self) -> Duration {
        Duration::from_millis(self.dismiss_ms)
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete storefront engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub carousel: CarouselSettings,

    #[serde(default)]
    pub commerce: CommerceSettings,

    #[serde(default)]
    pub notifications: NotificationSettings,
}

impl StorefrontConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (storefront.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> EngineResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> EngineResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| EngineError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| EngineError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| EngineError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Storefront config saved");
        Ok(())
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.carousel.dwell_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "carousel.dwell_ms must be greater than 0".into(),
            ));
        }

        if self.carousel.transition_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "carousel.transition_ms must be greater than 0".into(),
            ));
        }

        if !(self.carousel.swipe_threshold_px > 0.0) {
            return Err(EngineError::InvalidConfig(
                "carousel.swipe_threshold_px must be positive".into(),
            ));
        }

        if !self.commerce.checkout_route.starts_with('/') {
            return Err(EngineError::InvalidConfig(format!(
                "commerce.checkout_route must start with '/', got: {}",
                self.commerce.checkout_route
            )));
        }

        if self.notifications.dismiss_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "notifications.dismiss_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("STOREFRONT_DWELL_MS") {
            if let Ok(ms) = value.parse::<u64>() {
                debug!(dwell_ms = ms, "Overriding dwell time from environment");
                self.carousel.dwell_ms = ms;
            }
        }

        if let Ok(value) = std::env::var("STOREFRONT_TRANSITION_MS") {
            if let Ok(ms) = value.parse::<u64>() {
                self.carousel.transition_ms = ms;
            }
        }

        if let Ok(value) = std::env::var("STOREFRONT_SWIPE_THRESHOLD_PX") {
            match value.parse::<f64>() {
                Ok(px) => self.carousel.swipe_threshold_px = px,
                Err(_) => warn!(value = %value, "Unparseable swipe threshold in environment"),
            }
        }

        if let Ok(route) = std::env::var("STOREFRONT_CHECKOUT_ROUTE") {
            debug!(route = %route, "Overriding checkout route from environment");
            self.commerce.checkout_route = route;
        }

        if let Ok(value) = std::env::var("STOREFRONT_TOAST_DISMISS_MS") {
            if let Ok(ms) = value.parse::<u64>() {
                self.notifications.dismiss_ms = ms;
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "storefront", "web")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StorefrontConfig::default();
        assert_eq!(config.carousel.dwell_ms, 5_000);
        assert_eq!(config.carousel.transition(), Duration::from_millis(1_000));
        assert_eq!(config.commerce.checkout_route, "/checkout");
        assert_eq!(config.notifications.dismiss_after(), Duration::from_secs(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = StorefrontConfig::default();

        config.carousel.dwell_ms = 0;
        assert!(config.validate().is_err());
        config.carousel.dwell_ms = 4_000;

        config.commerce.checkout_route = "checkout".into();
        assert!(config.validate().unwrap_err().is_config_error());
        config.commerce.checkout_route = "/checkout".into();

        config.carousel.swipe_threshold_px = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: StorefrontConfig = toml::from_str("[carousel]\ndwell_ms = 7000\n").unwrap();
        assert_eq!(config.carousel.dwell_ms, 7_000);
        assert_eq!(config.carousel.transition_ms, 1_000);
        assert_eq!(config.notifications.dismiss_ms, 3_000);
    }

    #[test]
    fn test_toml_serialization() {
        let config = StorefrontConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[carousel]"));
        assert!(toml_str.contains("[commerce]"));
    }
}
