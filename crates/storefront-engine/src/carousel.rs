//! # Autoplay Carousel Controller
//!
//! Drives hero banners and promo strips: a cyclic deck, a dwell timer and
//! manual navigation, serialized through one [`TransitionLock`].
//!
//! ## Controller Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Carousel Task (one per mounted carousel)             │
//! │                                                                         │
//! │   CarouselHandle ──cmd──►  select! {                                    │
//! │   (clone per control)        command   → navigate / start / stop / ...  │
//! │                              unlock_at → lock.expire()                  │
//! │                              tick_at   → advance(+1) or drop + re-arm   │
//! │                            }                                            │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │                      watch::Sender<CarouselSnapshot> ──► renderer       │
//! │                                                                         │
//! │  STATE MACHINE:                                                         │
//! │  Idle ──(tick | user nav)──► Transitioning ──(timeout | finished)──► Idle│
//! │  Requests arriving while Transitioning are DROPPED, not queued.         │
//! │                                                                         │
//! │  Every committed move re-arms the dwell timer, so a manual move is      │
//! │  never followed by an immediate automatic one.                          │
//! │                                                                         │
//! │  destroy() or dropping every handle ends the task; both timers go       │
//! │  with it.                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use storefront_core::{Direction, Slide, SlideDeck, Swipe};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, info};
use ts_rs::TS;

use crate::config::CarouselSettings;
use crate::error::{EngineError, EngineResult};
use crate::services::SlideSource;
use crate::slides::load_deck;
use crate::transition_lock::{sleep_until_opt, TransitionLock};

// =============================================================================
// Snapshot
// =============================================================================

/// Which navigation controls should be clickable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NavControls {
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub indicators_enabled: bool,
}

/// What the renderer needs to draw the carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CarouselSnapshot {
    pub current_index: usize,
    pub len: usize,
    pub is_transitioning: bool,
    pub autoplay: bool,
    pub disposed: bool,
    pub controls: NavControls,
}

impl CarouselSnapshot {
    /// Stopped, idle, showing the first slide.
    fn at_rest(len: usize) -> Self {
        let navigable = len > 1;
        CarouselSnapshot {
            current_index: 0,
            len,
            is_transitioning: false,
            autoplay: false,
            disposed: false,
            controls: NavControls {
                prev_enabled: navigable,
                next_enabled: navigable,
                indicators_enabled: navigable,
            },
        }
    }
}

// =============================================================================
// Navigation
// =============================================================================

/// A navigation request from the shopper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavRequest {
    Advance(Direction),
    JumpTo(usize),
    Swipe(Swipe),
}

/// What happened to a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// A transition started.
    Moved { from: usize, to: usize },
    /// A transition was already in flight; the request was dropped.
    Dropped,
    /// Nothing to do: same index, single slide, short drag or bad index.
    Unchanged,
}

#[derive(Debug)]
enum CarouselCommand {
    Start {
        dwell: Duration,
        reply: oneshot::Sender<CarouselSnapshot>,
    },
    Stop {
        reply: oneshot::Sender<CarouselSnapshot>,
    },
    Navigate {
        request: NavRequest,
        reply: oneshot::Sender<NavOutcome>,
    },
    TransitionFinished {
        reply: oneshot::Sender<bool>,
    },
    Snapshot {
        reply: oneshot::Sender<CarouselSnapshot>,
    },
    Destroy {
        reply: oneshot::Sender<()>,
    },
}

// =============================================================================
// Controller
// =============================================================================

/// Owns a carousel's state until it is spawned.
#[derive(Debug)]
pub struct CarouselController {
    name: String,
    deck: Arc<SlideDeck>,
    lock: TransitionLock,
    current: usize,
    dwell: Duration,
    autoplay: bool,
    next_tick: Option<Instant>,
    swipe_threshold: f64,
    state_tx: watch::Sender<CarouselSnapshot>,
}

impl CarouselController {
    /// Creates a stopped carousel at slide 0.
    pub fn new(name: impl Into<String>, deck: SlideDeck, settings: &CarouselSettings) -> Self {
        let (state_tx, _) = watch::channel(CarouselSnapshot::at_rest(deck.len()));
        CarouselController {
            name: name.into(),
            deck: Arc::new(deck),
            lock: TransitionLock::new(settings.transition()),
            current: 0,
            dwell: settings.dwell(),
            autoplay: false,
            next_tick: None,
            swipe_threshold: settings.swipe_threshold_px,
            state_tx,
        }
    }

    /// Loads slides once from `source`, spawns the carousel and starts
    /// autoplay with the configured dwell time.
    pub async fn mount(
        name: impl Into<String>,
        source: &dyn SlideSource,
        settings: &CarouselSettings,
    ) -> EngineResult<CarouselHandle> {
        let deck = load_deck(source).await?;
        let handle = CarouselController::new(name, deck, settings).spawn();
        handle.start(settings.dwell()).await?;
        Ok(handle)
    }

    /// Spawns the carousel task and returns a handle to it.
    pub fn spawn(self) -> CarouselHandle {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let handle = CarouselHandle {
            name: self.name.clone(),
            deck: self.deck.clone(),
            cmd_tx,
            state_rx: self.state_tx.subscribe(),
        };

        tokio::spawn(async move {
            self.run(cmd_rx).await;
        });

        handle
    }

    async fn run(mut self, mut cmd_rx: mpsc::Receiver<CarouselCommand>) {
        info!(carousel = %self.name, slides = self.deck.len(), "Carousel mounted");

        let destroy_reply = loop {
            let unlock_at = self.lock.deadline();
            let tick_at = self.next_tick;

            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(cmd) => {
                            if let Some(reply) = self.handle_command(cmd) {
                                break Some(reply);
                            }
                        }
                        None => {
                            debug!(carousel = %self.name, "All handles dropped");
                            break None;
                        }
                    }
                }
                _ = sleep_until_opt(unlock_at) => {
                    if self.lock.expire(Instant::now()) {
                        self.publish();
                    }
                }
                _ = sleep_until_opt(tick_at) => {
                    self.on_dwell_elapsed();
                }
            }
        };

        self.teardown();
        if let Some(reply) = destroy_reply {
            let _ = reply.send(());
        }
    }

    /// Applies one command. Returns the reply channel when the command asks
    /// the carousel to shut down.
    fn handle_command(&mut self, cmd: CarouselCommand) -> Option<oneshot::Sender<()>> {
        match cmd {
            CarouselCommand::Start { dwell, reply } => {
                self.dwell = dwell;
                self.autoplay = true;
                self.arm_dwell(Instant::now());
                debug!(carousel = %self.name, dwell_ms = dwell.as_millis() as u64, "Autoplay started");
                self.publish();
                let _ = reply.send(self.snapshot_at(Instant::now()));
            }
            CarouselCommand::Stop { reply } => {
                self.autoplay = false;
                self.next_tick = None;
                self.publish();
                let _ = reply.send(self.snapshot_at(Instant::now()));
            }
            CarouselCommand::Navigate { request, reply } => {
                let outcome = self.navigate(request, Instant::now());
                let _ = reply.send(outcome);
            }
            CarouselCommand::TransitionFinished { reply } => {
                let released = self.lock.release();
                if released {
                    self.publish();
                }
                let _ = reply.send(released);
            }
            CarouselCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot_at(Instant::now()));
            }
            CarouselCommand::Destroy { reply } => return Some(reply),
        }
        None
    }

    fn navigate(&mut self, request: NavRequest, now: Instant) -> NavOutcome {
        let target = match request {
            NavRequest::Advance(direction) => self.deck.step(self.current, direction),
            NavRequest::JumpTo(index) => {
                if !self.deck.contains(index) {
                    debug!(carousel = %self.name, index, len = self.deck.len(), "Jump target out of range");
                    return NavOutcome::Unchanged;
                }
                index
            }
            NavRequest::Swipe(swipe) => match swipe.direction(self.swipe_threshold) {
                Some(direction) => self.deck.step(self.current, direction),
                None => return NavOutcome::Unchanged,
            },
        };

        if self.lock.is_locked_at(now) {
            debug!(carousel = %self.name, ?request, "Transition in flight, request dropped");
            return NavOutcome::Dropped;
        }

        if target == self.current {
            return NavOutcome::Unchanged;
        }

        self.commit(target, now)
    }

    fn commit(&mut self, to: usize, now: Instant) -> NavOutcome {
        let from = self.current;
        if !self.lock.try_acquire_at(now) {
            return NavOutcome::Dropped;
        }
        self.current = to;
        self.arm_dwell(now);
        debug!(carousel = %self.name, from, to, "Slide transition");
        self.publish();
        NavOutcome::Moved { from, to }
    }

    fn on_dwell_elapsed(&mut self) {
        let now = Instant::now();

        if self.lock.is_locked_at(now) {
            debug!(carousel = %self.name, "Dwell tick during transition, dropped");
            self.arm_dwell(now);
            return;
        }

        let next = self.deck.step(self.current, Direction::Forward);
        if next == self.current {
            self.arm_dwell(now);
            return;
        }

        self.commit(next, now);
    }

    fn arm_dwell(&mut self, now: Instant) {
        self.next_tick = self.autoplay.then(|| now + self.dwell);
    }

    fn teardown(&mut self) {
        self.autoplay = false;
        self.next_tick = None;
        self.lock.release();

        let mut snapshot = self.snapshot_at(Instant::now());
        snapshot.disposed = true;
        snapshot.controls = NavControls {
            prev_enabled: false,
            next_enabled: false,
            indicators_enabled: false,
        };
        self.state_tx.send_replace(snapshot);

        info!(carousel = %self.name, "Carousel destroyed");
    }

    fn snapshot_at(&self, now: Instant) -> CarouselSnapshot {
        let is_transitioning = self.lock.is_locked_at(now);
        let navigable = !is_transitioning && !self.deck.is_single();
        CarouselSnapshot {
            current_index: self.current,
            len: self.deck.len(),
            is_transitioning,
            autoplay: self.autoplay,
            disposed: false,
            controls: NavControls {
                prev_enabled: navigable,
                next_enabled: navigable,
                indicators_enabled: navigable,
            },
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.snapshot_at(Instant::now()));
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Cloneable handle to a running carousel.
#[derive(Debug, Clone)]
pub struct CarouselHandle {
    name: String,
    deck: Arc<SlideDeck>,
    cmd_tx: mpsc::Sender<CarouselCommand>,
    state_rx: watch::Receiver<CarouselSnapshot>,
}

impl CarouselHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn deck(&self) -> &SlideDeck {
        &self.deck
    }

    /// The slide currently published to the renderer.
    pub fn current_slide(&self) -> Option<&Slide> {
        let index = self.state_rx.borrow().current_index;
        self.deck.get(index)
    }

    /// Subscribes to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<CarouselSnapshot> {
        self.state_rx.clone()
    }

    /// Starts (or restarts) autoplay with `dwell` between slides.
    pub async fn start(&self, dwell: Duration) -> EngineResult<CarouselSnapshot> {
        self.request(|reply| CarouselCommand::Start { dwell, reply }).await
    }

    /// Pauses autoplay, e.g. while the pointer hovers the carousel.
    pub async fn stop(&self) -> EngineResult<CarouselSnapshot> {
        self.request(|reply| CarouselCommand::Stop { reply }).await
    }

    pub async fn advance(&self, direction: Direction) -> EngineResult<NavOutcome> {
        self.navigate(NavRequest::Advance(direction)).await
    }

    pub async fn next(&self) -> EngineResult<NavOutcome> {
        self.advance(Direction::Forward).await
    }

    pub async fn prev(&self) -> EngineResult<NavOutcome> {
        self.advance(Direction::Backward).await
    }

    pub async fn jump_to(&self, index: usize) -> EngineResult<NavOutcome> {
        self.navigate(NavRequest::JumpTo(index)).await
    }

    /// Feeds a released touch gesture.
    pub async fn swipe(&self, swipe: Swipe) -> EngineResult<NavOutcome> {
        self.navigate(NavRequest::Swipe(swipe)).await
    }

    pub async fn navigate(&self, request: NavRequest) -> EngineResult<NavOutcome> {
        self.request(|reply| CarouselCommand::Navigate { request, reply })
            .await
    }

    /// Reports that the visual transition actually ended. Releases the lock
    /// ahead of the fallback timeout; returns false if nothing was in flight.
    pub async fn transition_finished(&self) -> EngineResult<bool> {
        self.request(|reply| CarouselCommand::TransitionFinished { reply })
            .await
    }

    pub async fn snapshot(&self) -> EngineResult<CarouselSnapshot> {
        self.request(|reply| CarouselCommand::Snapshot { reply }).await
    }

    /// Stops the carousel and cancels both timers. Safe to call repeatedly.
    pub async fn destroy(&self) -> EngineResult<()> {
        match self.request(|reply| CarouselCommand::Destroy { reply }).await {
            Ok(()) | Err(EngineError::Disposed) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> CarouselCommand,
    ) -> EngineResult<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.cmd_tx
            .send(make(reply_tx))
            .await
            .map_err(|_| EngineError::Disposed)?;
        reply_rx.await.map_err(|_| EngineError::Disposed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slides::StaticSlides;
    use tokio::time::sleep;

    fn settings(dwell_ms: u64, transition_ms: u64) -> CarouselSettings {
        CarouselSettings {
            dwell_ms,
            transition_ms,
            swipe_threshold_px: 50.0,
        }
    }

    fn spawn(n: usize, settings: &CarouselSettings) -> CarouselHandle {
        let slides = (0..n).map(|i| Slide::image(format!("hero/{i}.jpg"))).collect();
        CarouselController::new("hero", SlideDeck::new(slides).unwrap(), settings).spawn()
    }

    async fn index(handle: &CarouselHandle) -> usize {
        handle.snapshot().await.unwrap().current_index
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_then_immediate_prev_is_dropped() {
        let handle = spawn(3, &settings(5_000, 1_000));

        assert_eq!(handle.next().await.unwrap(), NavOutcome::Moved { from: 0, to: 1 });
        assert_eq!(handle.prev().await.unwrap(), NavOutcome::Dropped);
        assert_eq!(index(&handle).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_releases_after_transition() {
        let handle = spawn(3, &settings(5_000, 1_000));
        handle.next().await.unwrap();
        assert!(handle.snapshot().await.unwrap().is_transitioning);

        sleep(Duration::from_millis(1_001)).await;

        let snapshot = handle.snapshot().await.unwrap();
        assert!(!snapshot.is_transitioning);
        assert!(snapshot.controls.prev_enabled);
        assert_eq!(handle.prev().await.unwrap(), NavOutcome::Moved { from: 1, to: 0 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_jump_to_while_transitioning_keeps_index() {
        let handle = spawn(4, &settings(5_000, 1_000));
        handle.jump_to(2).await.unwrap();

        assert_eq!(handle.jump_to(3).await.unwrap(), NavOutcome::Dropped);
        assert_eq!(index(&handle).await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_jump_to_same_or_missing_index_is_noop() {
        let handle = spawn(3, &settings(5_000, 1_000));

        assert_eq!(handle.jump_to(0).await.unwrap(), NavOutcome::Unchanged);
        assert_eq!(handle.jump_to(9).await.unwrap(), NavOutcome::Unchanged);
        assert!(!handle.snapshot().await.unwrap().is_transitioning);
    }

    #[tokio::test(start_paused = true)]
    async fn test_advance_wraps_both_ways() {
        let handle = spawn(3, &settings(5_000, 100));

        assert_eq!(handle.prev().await.unwrap(), NavOutcome::Moved { from: 0, to: 2 });
        sleep(Duration::from_millis(150)).await;
        assert_eq!(handle.next().await.unwrap(), NavOutcome::Moved { from: 2, to: 0 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_cyclic_law_through_controller() {
        let handle = spawn(5, &settings(60_000, 100));
        for _ in 0..5 {
            handle.next().await.unwrap();
            sleep(Duration::from_millis(150)).await;
        }
        assert_eq!(index(&handle).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_autoplay_advances_after_dwell() {
        let handle = spawn(3, &settings(5_000, 1_000));
        handle.start(Duration::from_millis(5_000)).await.unwrap();

        sleep(Duration::from_millis(4_999)).await;
        assert_eq!(index(&handle).await, 0);

        sleep(Duration::from_millis(2)).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.current_index, 1);
        assert!(snapshot.is_transitioning);
        assert!(!snapshot.controls.next_enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_move_resets_dwell() {
        let handle = spawn(3, &settings(5_000, 1_000));
        handle.start(Duration::from_millis(5_000)).await.unwrap();

        sleep(Duration::from_millis(3_000)).await;
        handle.next().await.unwrap();

        // The original tick at 5s would have moved to slide 2.
        sleep(Duration::from_millis(4_000)).await;
        assert_eq!(index(&handle).await, 1);

        sleep(Duration::from_millis(1_001)).await;
        assert_eq!(index(&handle).await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_during_transition_is_dropped() {
        let handle = spawn(3, &settings(500, 1_000));
        handle.start(Duration::from_millis(500)).await.unwrap();

        sleep(Duration::from_millis(1_200)).await;
        assert_eq!(index(&handle).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_pauses_autoplay() {
        let handle = spawn(3, &settings(1_000, 100));
        handle.start(Duration::from_millis(1_000)).await.unwrap();
        let snapshot = handle.stop().await.unwrap();
        assert!(!snapshot.autoplay);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(index(&handle).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_slide_never_moves() {
        let handle = spawn(1, &settings(1_000, 100));
        handle.start(Duration::from_millis(1_000)).await.unwrap();

        assert_eq!(handle.next().await.unwrap(), NavOutcome::Unchanged);
        sleep(Duration::from_secs(5)).await;

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.current_index, 0);
        assert!(!snapshot.is_transitioning);
        assert!(!snapshot.controls.next_enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_swipe_maps_to_direction() {
        let handle = spawn(3, &settings(5_000, 100));

        assert_eq!(
            handle.swipe(Swipe::new(120.0, 100.0)).await.unwrap(),
            NavOutcome::Unchanged
        );
        assert_eq!(
            handle.swipe(Swipe::new(300.0, 100.0)).await.unwrap(),
            NavOutcome::Moved { from: 0, to: 1 }
        );
        sleep(Duration::from_millis(150)).await;
        assert_eq!(
            handle.swipe(Swipe::new(100.0, 300.0)).await.unwrap(),
            NavOutcome::Moved { from: 1, to: 0 }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_signal_releases_early() {
        let handle = spawn(3, &settings(5_000, 1_000));
        handle.next().await.unwrap();

        assert!(handle.transition_finished().await.unwrap());
        assert!(!handle.transition_finished().await.unwrap());
        assert_eq!(handle.next().await.unwrap(), NavOutcome::Moved { from: 1, to: 2 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_destroy_cancels_timers() {
        let handle = spawn(3, &settings(1_000, 500));
        handle.start(Duration::from_millis(1_000)).await.unwrap();
        let mut updates = handle.subscribe();

        handle.destroy().await.unwrap();
        handle.destroy().await.unwrap();

        sleep(Duration::from_secs(5)).await;
        assert!(matches!(handle.next().await, Err(EngineError::Disposed)));

        let last = *updates.borrow_and_update();
        assert!(last.disposed);
        assert_eq!(last.current_index, 0);
        assert!(!last.autoplay);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_loads_and_autoplays() {
        let source = StaticSlides::new(vec![Slide::image("a"), Slide::image("b")]);
        let handle = CarouselController::mount("promo", &source, &settings(2_000, 500))
            .await
            .unwrap();

        assert!(handle.snapshot().await.unwrap().autoplay);
        sleep(Duration::from_millis(2_001)).await;
        handle.snapshot().await.unwrap();
        assert_eq!(handle.current_slide().unwrap().image_ref, "b");
    }

    #[test]
    fn test_snapshot_binding_uses_renderer_field_names() {
        let decl = CarouselSnapshot::decl();
        assert!(decl.contains("currentIndex"));
        assert!(decl.contains("isTransitioning"));
        assert!(decl.contains("controls: NavControls"));
        assert!(NavControls::decl().contains("indicatorsEnabled"));
    }
}
