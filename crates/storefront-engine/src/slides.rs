//! # Slide Sources
//!
//! Slide content comes from either a compiled-in list or a single fetch at
//! mount. Both end up as an immutable [`SlideDeck`].

use async_trait::async_trait;
use storefront_core::{Slide, SlideDeck};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::services::SlideSource;

/// Compiled-in slide list.
#[derive(Debug, Clone)]
pub struct StaticSlides {
    slides: Vec<Slide>,
}

impl StaticSlides {
    pub fn new(slides: Vec<Slide>) -> Self {
        StaticSlides { slides }
    }
}

#[async_trait]
impl SlideSource for StaticSlides {
    async fn load(&self) -> EngineResult<Vec<Slide>> {
        Ok(self.slides.clone())
    }
}

/// Slides delivered as a JSON array (CMS export, API response body).
///
/// ```json
/// [{"imageRef": "hero/1.jpg", "title": "Summer sale",
///   "primaryCta": {"label": "Shop", "href": "/sale"}}]
/// ```
#[derive(Debug, Clone)]
pub struct JsonSlides {
    body: String,
}

impl JsonSlides {
    pub fn new(body: impl Into<String>) -> Self {
        JsonSlides { body: body.into() }
    }
}

#[async_trait]
impl SlideSource for JsonSlides {
    async fn load(&self) -> EngineResult<Vec<Slide>> {
        let slides: Vec<Slide> = serde_json::from_str(&self.body)?;
        debug!(count = slides.len(), "Parsed slides from JSON");
        Ok(slides)
    }
}

/// Loads a source once and builds the deck.
pub async fn load_deck(source: &dyn SlideSource) -> EngineResult<SlideDeck> {
    let slides = source.load().await?;
    SlideDeck::new(slides).map_err(|e| {
        warn!(error = %e, "Slide source produced no usable deck");
        EngineError::from(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::CoreError;

    #[tokio::test]
    async fn test_static_slides_build_deck() {
        let source = StaticSlides::new(vec![Slide::image("a"), Slide::image("b")]);
        let deck = load_deck(&source).await.unwrap();
        assert_eq!(deck.len(), 2);
        assert_eq!(deck.get(1).unwrap().image_ref, "b");
    }

    #[tokio::test]
    async fn test_json_slides() {
        let source = JsonSlides::new(
            r#"[
                {"imageRef": "hero/1.jpg", "title": "Summer sale",
                 "primaryCta": {"label": "Shop", "href": "/sale"}},
                {"imageRef": "hero/2.jpg"}
            ]"#,
        );
        let deck = load_deck(&source).await.unwrap();
        assert_eq!(deck.len(), 2);
        assert_eq!(deck.get(0).unwrap().title.as_deref(), Some("Summer sale"));
        assert_eq!(deck.get(1).unwrap().index, 1);
    }

    #[tokio::test]
    async fn test_malformed_json_is_source_error() {
        let err = load_deck(&JsonSlides::new("{not json")).await.unwrap_err();
        assert!(matches!(err, EngineError::SlideSource(_)));
    }

    #[tokio::test]
    async fn test_empty_source_is_empty_deck() {
        let err = load_deck(&StaticSlides::new(vec![])).await.unwrap_err();
        assert!(matches!(err, EngineError::Core(CoreError::EmptyDeck)));
    }
}
