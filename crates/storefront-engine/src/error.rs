//! # Engine Error Types
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Engine Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Lifecycle     │  │     Collaborators       │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Disposed       │  │  Service(ServiceError)  │ │
//! │  │  ConfigLoad...  │  │                 │  │  SlideSource            │ │
//! │  │  ConfigSave...  │  │                 │  │  Core(CoreError)        │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `ServiceError` text is for logs only. What the shopper sees comes from
//! [`ServiceError::user_message`].

use storefront_core::{ActionKind, CoreError};
use thiserror::Error;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Service Error
// =============================================================================

/// Failure reported by a cart, wishlist or auth backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Request never reached the backend or the connection dropped.
    #[error("Network error: {0}")]
    Network(String),

    /// Backend answered with a failure.
    #[error("Backend rejected request ({status}): {message}")]
    Backend { status: u16, message: String },

    /// Session expired between the auth check and the call.
    #[error("Session is no longer authenticated")]
    Unauthorized,
}

impl ServiceError {
    /// Returns true if a fresh click could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Network(_) => true,
            ServiceError::Backend { status, .. } => *status >= 500,
            ServiceError::Unauthorized => false,
        }
    }

    /// Generic, non-technical copy for the failure toast.
    pub fn user_message(kind: ActionKind) -> &'static str {
        match kind {
            ActionKind::AddToCart => "Could not add to cart. Please try again.",
            ActionKind::Wishlist => "Could not update your wishlist. Please try again.",
            ActionKind::BuyNow => "Could not start checkout. Please try again.",
        }
    }
}

// =============================================================================
// Engine Error
// =============================================================================

#[derive(Debug, Error)]
pub enum EngineError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid storefront configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Lifecycle Errors
    // =========================================================================
    /// The component was destroyed; the request was not applied.
    #[error("Component has been disposed")]
    Disposed,

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    #[error("Slide source failed: {0}")]
    SlideSource(String),

    #[error("Settings load failed: {0}")]
    SettingsLoad(String),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::SlideSource(err.to_string())
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for EngineError {
    fn from(err: toml::ser::Error) -> Self {
        EngineError::ConfigSaveFailed(err.to_string())
    }
}

impl EngineError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidConfig(_)
                | EngineError::ConfigLoadFailed(_)
                | EngineError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_service_errors() {
        assert!(ServiceError::Network("reset".into()).is_retryable());
        assert!(ServiceError::Backend {
            status: 503,
            message: "busy".into()
        }
        .is_retryable());
        assert!(!ServiceError::Backend {
            status: 409,
            message: "conflict".into()
        }
        .is_retryable());
        assert!(!ServiceError::Unauthorized.is_retryable());
    }

    #[test]
    fn test_user_message_hides_details() {
        let msg = ServiceError::user_message(ActionKind::AddToCart);
        assert!(!msg.contains("Network"));
        assert!(!msg.contains("503"));
    }

    #[test]
    fn test_service_error_converts_transparently() {
        let err: EngineError = ServiceError::Unauthorized.into();
        assert!(matches!(err, EngineError::Service(ServiceError::Unauthorized)));
        assert_eq!(err.to_string(), ServiceError::Unauthorized.to_string());
        assert!(!err.is_config_error());
    }

    #[test]
    fn test_core_error_converts() {
        let err: EngineError = CoreError::EmptyDeck.into();
        assert!(matches!(err, EngineError::Core(CoreError::EmptyDeck)));
        assert!(!err.is_config_error());
    }
}
