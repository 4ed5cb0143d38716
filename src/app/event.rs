use crossterm::event::Event as CrosstermEvent;

pub type NotificationId = u64;
pub type TimerToken = u64;

#[derive(Debug)]
pub enum AppEvent {
    /// Terminal input event
    Terminal(CrosstermEvent),

    /// A deferred action scheduled through [`crate::timer::Scheduler`] elapsed
    Timer(TimerEvent),
}

/// Deferred actions. Slot-based variants carry the token they were armed
/// with; a token that no longer matches its slot is stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Exit transition of the detail view finished
    ClearInspected(TimerToken),

    /// Auto-dismiss for a single notification
    DismissNotification(NotificationId),

    /// Scroll debounce window elapsed
    ScrollSettled(TimerToken),

    /// Next animation frame for live swipe feedback
    GestureFrame(TimerToken),
}
