//! Transient notifications ("toasts").
//!
//! Each entry owns its own expiry timer, so dismissing or expiring one entry
//! never disturbs another. Display order is insertion order.

use crate::app::event::{NotificationId, TimerEvent};
use crate::timer::{Scheduler, TimerHandle};
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    /// Zero or negative never auto-dismisses.
    pub ttl_ms: i64,
    pub created_at: DateTime<Local>,
}

#[derive(Debug)]
pub struct NotificationQueue {
    entries: Vec<Notification>,
    timers: HashMap<NotificationId, TimerHandle>,
    next_id: NotificationId,
    scheduler: Scheduler,
}

impl NotificationQueue {
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            entries: Vec::new(),
            timers: HashMap::new(),
            next_id: 1,
            scheduler,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, severity: Severity, ttl_ms: i64) -> NotificationId {
        let id = self.next_id;
        self.next_id += 1;
        let message = message.into();
        debug!(id, ?severity, ttl_ms, %message, "notification pushed");

        self.entries.push(Notification {
            id,
            message,
            severity,
            ttl_ms,
            created_at: Local::now(),
        });
        if ttl_ms > 0 {
            let handle = self.scheduler.after(
                Duration::from_millis(ttl_ms as u64),
                TimerEvent::DismissNotification(id),
            );
            self.timers.insert(id, handle);
        }
        id
    }

    /// Remove the entry if still present. Manual dismissal and expiry can
    /// race; whichever comes second is a no-op.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        if let Some(handle) = self.timers.remove(&id) {
            handle.cancel();
        }
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id);
        self.entries.len() != before
    }

    /// Dismiss the newest entry, if any.
    pub fn dismiss_latest(&mut self) -> bool {
        match self.entries.last().map(|n| n.id) {
            Some(id) => self.dismiss(id),
            None => false,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Notification> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn has_pending_timer(&self, id: NotificationId) -> bool {
        self.timers.contains_key(&id)
    }
}
