//! Scroll position and direction tracking.
//!
//! Raw samples arrive far faster than anything needs to react to them, so the
//! first sample of a burst opens a short window and the latest sample at the
//! end of the window is the one classified. Direction has hysteresis: it only
//! flips after the position moves at least `threshold` away from where it was
//! last classified.

use crate::app::event::{TimerEvent, TimerToken};
use crate::config::ScrollConfig;
use crate::timer::{Scheduler, TimerSlot};
use std::time::Duration;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    Up,
    Down,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    pub position: f64,
    pub direction: ScrollDirection,
    pub at_top: bool,
    pub near_bottom: bool,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            position: 0.0,
            direction: ScrollDirection::None,
            at_top: true,
            near_bottom: false,
        }
    }
}

pub struct ScrollTracker {
    state: ScrollState,
    latest: Option<f64>,
    last_classified: f64,
    viewport: Option<f64>,
    content: Option<f64>,
    window: TimerSlot,
    scheduler: Scheduler,
    threshold: f64,
    debounce: Duration,
    top_epsilon: f64,
    near_bottom_margin: f64,
}

impl ScrollTracker {
    pub fn new(config: &ScrollConfig, scheduler: Scheduler) -> Self {
        Self {
            state: ScrollState::default(),
            latest: None,
            last_classified: 0.0,
            viewport: None,
            content: None,
            window: TimerSlot::new(),
            scheduler,
            threshold: config.threshold,
            debounce: Duration::from_millis(config.debounce_ms),
            top_epsilon: config.top_epsilon,
            near_bottom_margin: config.near_bottom_margin,
        }
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    /// Record a raw sample. Negative positions (overscroll) count as zero.
    pub fn on_scroll(&mut self, position: f64) {
        self.latest = Some(position.max(0.0));
        if !self.window.is_armed() {
            self.window
                .arm(&self.scheduler, self.debounce, TimerEvent::ScrollSettled);
        }
    }

    /// Debounce window elapsed. Returns `true` if the state changed.
    pub fn on_settled(&mut self, token: TimerToken) -> bool {
        if !self.window.take_fired(token) {
            return false;
        }
        let Some(position) = self.latest.take() else {
            return false;
        };
        let before = self.state;

        self.state.position = position;
        self.state.at_top = position < self.top_epsilon;
        self.state.near_bottom = self.compute_near_bottom(position);

        let moved = position - self.last_classified;
        if moved.abs() >= self.threshold {
            self.state.direction = if moved > 0.0 {
                ScrollDirection::Down
            } else {
                ScrollDirection::Up
            };
            self.last_classified = position;
        }

        trace!(state = ?self.state, "scroll settled");
        self.state != before
    }

    /// Viewport and content heights, in the same unit as positions.
    pub fn set_extent(&mut self, viewport: f64, content: f64) {
        self.viewport = Some(viewport);
        self.content = Some(content);
        self.state.near_bottom = self.compute_near_bottom(self.state.position);
    }

    /// Back to the initial state, dropping any pending window.
    pub fn reset(&mut self) {
        self.window.cancel();
        self.latest = None;
        self.last_classified = 0.0;
        self.state = ScrollState::default();
        self.state.near_bottom = self.compute_near_bottom(0.0);
    }

    fn compute_near_bottom(&self, position: f64) -> bool {
        match (self.viewport, self.content) {
            (Some(viewport), Some(content)) => {
                position + viewport >= content - self.near_bottom_margin
            }
            _ => false,
        }
    }
}
