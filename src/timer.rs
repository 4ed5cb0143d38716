//! Cancellable deferred actions.
//!
//! A [`Scheduler`] turns "do X after a delay" into a sleeping tokio task that
//! posts an [`AppEvent::Timer`] back into the main event channel, so every
//! deferred mutation still runs on the event loop. A [`TimerSlot`] holds at
//! most one pending timer for one logical operation: arming it again aborts
//! the previous task, and the token check in [`TimerSlot::take_fired`] drops
//! an event that was already queued when the abort happened.

use crate::app::event::{AppEvent, TimerEvent, TimerToken};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct Scheduler {
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl Scheduler {
    pub fn new(event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { event_tx }
    }

    /// Post `event` after `delay`. Must be called from within a tokio runtime.
    pub fn after(&self, delay: Duration, event: TimerEvent) -> TimerHandle {
        let tx = self.event_tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(AppEvent::Timer(event));
        });
        TimerHandle { task }
    }
}

/// Handle to a pending deferred action.
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn cancel(&self) {
        self.task.abort();
    }
}

/// One logical timer: at most one pending handle at a time.
#[derive(Debug, Default)]
pub struct TimerSlot {
    pending: Option<(TimerToken, TimerHandle)>,
    next_token: TimerToken,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel whatever is pending and schedule a fresh timer.
    pub fn arm(
        &mut self,
        scheduler: &Scheduler,
        delay: Duration,
        event: impl FnOnce(TimerToken) -> TimerEvent,
    ) -> TimerToken {
        self.cancel();
        let token = self.next_token;
        self.next_token = self.next_token.wrapping_add(1);
        let handle = scheduler.after(delay, event(token));
        self.pending = Some((token, handle));
        token
    }

    /// Returns `true` if a pending timer was cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some((_, handle)) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Consume a fired timer. Returns `false` for stale tokens.
    pub fn take_fired(&mut self, token: TimerToken) -> bool {
        match self.pending {
            Some((current, _)) if current == token => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> Vec<TimerEvent> {
        let mut out = Vec::new();
        while let Ok(AppEvent::Timer(ev)) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_posts_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(tx);
        let _handle = scheduler.after(Duration::from_millis(100), TimerEvent::DismissNotification(7));

        tokio::time::sleep(Duration::from_millis(99)).await;
        assert!(drain(&mut rx).is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(drain(&mut rx), vec![TimerEvent::DismissNotification(7)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_handle_never_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(tx);
        let handle = scheduler.after(Duration::from_millis(100), TimerEvent::DismissNotification(1));
        handle.cancel();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearming_slot_supersedes_previous() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(tx);
        let mut slot = TimerSlot::new();

        let first = slot.arm(&scheduler, Duration::from_millis(100), TimerEvent::ClearInspected);
        let second = slot.arm(&scheduler, Duration::from_millis(100), TimerEvent::ClearInspected);
        assert_ne!(first, second);

        tokio::time::sleep(Duration::from_millis(150)).await;
        let fired = drain(&mut rx);
        assert_eq!(fired, vec![TimerEvent::ClearInspected(second)]);

        assert!(!slot.take_fired(first));
        assert!(slot.take_fired(second));
        assert!(!slot.is_armed());
        assert!(!slot.take_fired(second));
    }
}
