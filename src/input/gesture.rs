//! Swipe recognition for a single pointer.
//!
//! A drag is classified by its dominant axis: whichever of `|dx|` and `|dy|`
//! is larger. While the pointer moves, live feedback is reported at most once
//! per animation frame with the latest sample. On release, the final delta
//! alone decides whether a swipe completed; axis switches mid-drag only ever
//! affect the live feedback.

use crate::app::event::{TimerEvent, TimerToken};
use crate::haptics::{HapticPattern, Haptics};
use crate::timer::{Scheduler, TimerSlot};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
    None,
}

/// Receives swipe callbacks. Every method defaults to a no-op so a target
/// only implements the directions it cares about.
pub trait SwipeHandler {
    fn on_swipe_left(&mut self) {}
    fn on_swipe_right(&mut self) {}
    fn on_swipe_up(&mut self) {}
    fn on_swipe_down(&mut self) {}
    fn on_swiping(&mut self, _direction: SwipeDirection, _distance: f64) {}
}

/// Completion distances per axis; a swipe must strictly exceed them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub horizontal: f64,
    pub vertical: f64,
}

impl Thresholds {
    #[cfg(test)]
    pub fn uniform(distance: f64) -> Self {
        Self {
            horizontal: distance,
            vertical: distance,
        }
    }
}

/// In-progress drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    pub origin_x: f64,
    pub origin_y: f64,
    pub direction: SwipeDirection,
    pub distance: f64,
}

/// Dominant axis of a delta. Ties go to the vertical axis, a zero delta has
/// no direction.
pub fn classify(dx: f64, dy: f64) -> (SwipeDirection, f64) {
    let (abs_x, abs_y) = (dx.abs(), dy.abs());
    if abs_x == 0.0 && abs_y == 0.0 {
        (SwipeDirection::None, 0.0)
    } else if abs_x > abs_y {
        let dir = if dx > 0.0 {
            SwipeDirection::Right
        } else {
            SwipeDirection::Left
        };
        (dir, abs_x)
    } else {
        let dir = if dy > 0.0 {
            SwipeDirection::Down
        } else {
            SwipeDirection::Up
        };
        (dir, abs_y)
    }
}

pub struct GestureRecognizer {
    thresholds: Thresholds,
    sample: Option<GestureSample>,
    frame: TimerSlot,
    frame_interval: Duration,
    scheduler: Scheduler,
    haptics: Arc<dyn Haptics>,
}

impl GestureRecognizer {
    pub fn new(
        thresholds: Thresholds,
        frame_interval: Duration,
        scheduler: Scheduler,
        haptics: Arc<dyn Haptics>,
    ) -> Self {
        Self {
            thresholds,
            sample: None,
            frame: TimerSlot::new(),
            frame_interval,
            scheduler,
            haptics,
        }
    }

    /// Thresholds used by the next completion check.
    pub fn set_thresholds(&mut self, thresholds: Thresholds) {
        self.thresholds = thresholds;
    }

    pub fn sample(&self) -> Option<&GestureSample> {
        self.sample.as_ref()
    }

    pub fn is_tracking(&self) -> bool {
        self.sample.is_some()
    }

    /// Begin tracking. A start during an unfinished drag restarts it.
    pub fn touch_start(&mut self, x: f64, y: f64) {
        self.frame.cancel();
        self.sample = Some(GestureSample {
            origin_x: x,
            origin_y: y,
            direction: SwipeDirection::None,
            distance: 0.0,
        });
    }

    /// Update the live sample and make sure a frame is pending to report it.
    pub fn touch_move(&mut self, x: f64, y: f64) {
        let Some(sample) = self.sample.as_mut() else {
            return;
        };
        let (direction, distance) = classify(x - sample.origin_x, y - sample.origin_y);
        sample.direction = direction;
        sample.distance = distance;
        if !self.frame.is_armed() {
            self.frame
                .arm(&self.scheduler, self.frame_interval, TimerEvent::GestureFrame);
        }
    }

    /// Animation frame elapsed: report the latest sample.
    pub fn on_frame(&mut self, token: TimerToken, handler: &mut dyn SwipeHandler) {
        if !self.frame.take_fired(token) {
            return;
        }
        if let Some(sample) = self.sample {
            handler.on_swiping(sample.direction, sample.distance);
        }
    }

    /// Finish the drag. Fires at most one completion callback and returns the
    /// completed direction.
    pub fn touch_end(
        &mut self,
        x: f64,
        y: f64,
        handler: &mut dyn SwipeHandler,
    ) -> Option<SwipeDirection> {
        let sample = self.sample.take()?;
        self.frame.cancel();

        let dx = x - sample.origin_x;
        let dy = y - sample.origin_y;
        let (abs_x, abs_y) = (dx.abs(), dy.abs());

        let completed = if abs_x > abs_y && abs_x > self.thresholds.horizontal {
            if dx > 0.0 {
                handler.on_swipe_right();
                SwipeDirection::Right
            } else {
                handler.on_swipe_left();
                SwipeDirection::Left
            }
        } else if abs_y > abs_x && abs_y > self.thresholds.vertical {
            if dy > 0.0 {
                handler.on_swipe_down();
                SwipeDirection::Down
            } else {
                handler.on_swipe_up();
                SwipeDirection::Up
            }
        } else {
            return None;
        };

        self.haptics.pulse(HapticPattern::Tap);
        debug!(?completed, dx, dy, "swipe completed");
        Some(completed)
    }

    /// The platform interrupted the drag: drop it without completing.
    pub fn touch_cancel(&mut self) {
        self.frame.cancel();
        self.sample = None;
    }
}
