//! # Transition Lock
//!
//! Idle/Transitioning gate shared by every carousel.
//!
//! ```text
//!            try_acquire()                 deadline passes
//!   ┌──────┐ ───────────────► ┌──────────────┐ ─────────────► ┌──────┐
//!   │ Idle │                  │ Transitioning│                │ Idle │
//!   └──────┘ ◄─────────────── └──────────────┘                └──────┘
//!               release()        │
//!          (completion signal)   └── try_acquire() → false (request dropped)
//! ```
//!
//! The lock is a plain value owned by one task. It never spawns anything: the
//! owner waits on [`sleep_until_opt`] with the current [`deadline`] and calls
//! [`expire`] when it fires, so dropping the owner drops the timer.
//!
//! [`deadline`]: TransitionLock::deadline
//! [`expire`]: TransitionLock::expire

use std::time::Duration;

use tokio::time::{sleep_until, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Idle,
    Transitioning { until: Instant },
}

#[derive(Debug, Clone)]
pub struct TransitionLock {
    duration: Duration,
    state: LockState,
}

impl TransitionLock {
    /// Creates an idle lock that auto-releases `duration` after each acquire.
    pub fn new(duration: Duration) -> Self {
        TransitionLock {
            duration,
            state: LockState::Idle,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    /// True while a transition is in flight at `now`.
    pub fn is_locked_at(&self, now: Instant) -> bool {
        matches!(self.state, LockState::Transitioning { until } if now < until)
    }

    pub fn is_locked(&self) -> bool {
        self.is_locked_at(Instant::now())
    }

    /// Starts a transition. Returns false, changing nothing, if one is
    /// already in flight (first writer wins).
    pub fn try_acquire_at(&mut self, now: Instant) -> bool {
        if self.is_locked_at(now) {
            return false;
        }
        self.state = LockState::Transitioning {
            until: now + self.duration,
        };
        true
    }

    pub fn try_acquire(&mut self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    /// Ends the transition early. Returns true if it was in flight.
    pub fn release(&mut self) -> bool {
        let was_locked = matches!(self.state, LockState::Transitioning { .. });
        self.state = LockState::Idle;
        was_locked
    }

    /// Releases the lock if its timeout has passed at `now`.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.state {
            LockState::Transitioning { until } if now >= until => {
                self.state = LockState::Idle;
                true
            }
            _ => false,
        }
    }

    /// When the fallback unlock is due, if a transition is in flight.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            LockState::Transitioning { until } => Some(until),
            LockState::Idle => None,
        }
    }
}

/// Sleeps until `deadline`, or forever when there is none.
///
/// Meant for `tokio::select!` branches whose timer may be unarmed.
pub async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCK: Duration = Duration::from_millis(800);

    #[test]
    fn test_acquire_blocks_second_writer() {
        let t0 = Instant::now();
        let mut lock = TransitionLock::new(LOCK);

        assert!(lock.try_acquire_at(t0));
        assert!(!lock.try_acquire_at(t0 + Duration::from_millis(10)));
        assert_eq!(lock.deadline(), Some(t0 + LOCK));
    }

    #[test]
    fn test_timeout_unlocks() {
        let t0 = Instant::now();
        let mut lock = TransitionLock::new(LOCK);
        lock.try_acquire_at(t0);

        assert!(!lock.expire(t0 + Duration::from_millis(799)));
        assert!(lock.is_locked_at(t0 + Duration::from_millis(799)));
        assert!(lock.expire(t0 + LOCK));
        assert_eq!(lock.state(), LockState::Idle);
        assert!(lock.deadline().is_none());
    }

    #[test]
    fn test_lapsed_deadline_counts_as_idle() {
        let t0 = Instant::now();
        let mut lock = TransitionLock::new(LOCK);
        lock.try_acquire_at(t0);

        assert!(lock.try_acquire_at(t0 + LOCK));
        assert_eq!(lock.deadline(), Some(t0 + LOCK + LOCK));
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut lock = TransitionLock::new(LOCK);
        assert!(!lock.release());
        lock.try_acquire();
        assert!(lock.release());
        assert!(!lock.release());
        assert!(!lock.is_locked());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_until_opt_fires_at_deadline() {
        let start = Instant::now();
        sleep_until_opt(Some(start + LOCK)).await;
        assert!(Instant::now() >= start + LOCK);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_until_opt_none_never_fires() {
        let fired = tokio::time::timeout(Duration::from_secs(60), sleep_until_opt(None)).await;
        assert!(fired.is_err());
    }
}
