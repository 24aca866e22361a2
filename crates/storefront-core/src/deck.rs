//! # Slide Deck
//!
//! Cyclic index arithmetic and gesture mapping for carousels.
//!
//! ```text
//!   advance(+1)                         advance(-1)
//!   ───────────                         ───────────
//!   0 ─► 1 ─► 2 ─┐                      ┌─ 0 ◄─ 1 ◄─ 2
//!   ▲            │                      │            ▲
//!   └────────────┘                      └────────────┘
//!
//!   next = (current + dir + len) mod len
//! ```
//!
//! The deck is immutable once built. Timers and the transition lock live in
//! storefront-engine; this module only answers "where would we go".

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::Slide;

/// Minimum horizontal drag (in px) that counts as a swipe.
pub const DEFAULT_SWIPE_THRESHOLD_PX: f64 = 50.0;

// =============================================================================
// Direction
// =============================================================================

/// Navigation direction through the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Signed step (+1 / -1).
    #[inline]
    pub const fn step(&self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

// =============================================================================
// Swipe
// =============================================================================

/// Horizontal touch gesture, recorded at touch start and release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swipe {
    pub start_x: f64,
    pub end_x: f64,
}

impl Swipe {
    pub fn new(start_x: f64, end_x: f64) -> Self {
        Swipe { start_x, end_x }
    }

    /// Drag distance, positive when the finger moved left.
    #[inline]
    pub fn dx(&self) -> f64 {
        self.start_x - self.end_x
    }

    /// Maps the gesture to a navigation direction.
    ///
    /// Drags at or under `threshold` are taps, not swipes. A leftward drag
    /// pulls the next slide in.
    pub fn direction(&self, threshold: f64) -> Option<Direction> {
        let dx = self.dx();
        if dx.abs() <= threshold {
            return None;
        }
        if dx > 0.0 {
            Some(Direction::Forward)
        } else {
            Some(Direction::Backward)
        }
    }
}

// =============================================================================
// Slide Deck
// =============================================================================

/// An ordered, non-empty, cyclic sequence of slides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideDeck {
    slides: Vec<Slide>,
}

impl SlideDeck {
    /// Builds a deck, numbering slides by load order.
    ///
    /// ## Errors
    /// [`CoreError::EmptyDeck`] when `slides` is empty.
    pub fn new(slides: Vec<Slide>) -> CoreResult<Self> {
        if slides.is_empty() {
            return Err(CoreError::EmptyDeck);
        }

        let slides = slides
            .into_iter()
            .enumerate()
            .map(|(index, slide)| Slide { index, ..slide })
            .collect();

        Ok(SlideDeck { slides })
    }

    /// Number of slides (always >= 1).
    #[inline]
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Always false; kept for API symmetry with slices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// True when there is nowhere to navigate to.
    #[inline]
    pub fn is_single(&self) -> bool {
        self.slides.len() == 1
    }

    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Index reached from `current` by one step in `direction`, wrapping
    /// both ways.
    pub fn step(&self, current: usize, direction: Direction) -> usize {
        let len = self.slides.len() as i64;
        ((current as i64 + direction.step() + len) % len) as usize
    }

    /// Returns true if `index` addresses a slide.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        index < self.slides.len()
    }
}
