//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                     │
//! │  ├── CoreError        - Contract violations on pure state               │
//! │  └── ValidationError  - Selection not committable (shown inline)        │
//! │                                                                         │
//! │  storefront-engine errors (separate crate)                              │
//! │  ├── ServiceError     - Cart/wishlist/auth backend failures             │
//! │  └── EngineError      - Config, disposal, channel failures              │
//! │                                                                         │
//! │  Flow: ValidationError → inline message (never logged, never toasted)   │
//! │        ServiceError    → tracing::error! + generic toast                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised by the pure interaction state.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A slide deck needs at least one slide.
    ///
    /// ## When This Occurs
    /// - The slide source returned an empty list
    /// - Static content was compiled with no entries
    #[error("Slide deck must contain at least one slide")]
    EmptyDeck,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Reasons a Quick View selection cannot be committed.
///
/// These are rendered next to the offending control. They are detected before
/// any service call and never reach the notification layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required choice is missing (e.g. no size available or selected).
    #[error("{field} is required")]
    Required { field: String },

    /// The product has no stock left.
    #[error("{product} is out of stock")]
    OutOfStock { product: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: u32, max: u32 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "size".to_string(),
        };
        assert_eq!(err.to_string(), "size is required");

        let err = ValidationError::OutOfStock {
            product: "Linen Shirt".to_string(),
        };
        assert_eq!(err.to_string(), "Linen Shirt is out of stock");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "size".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
