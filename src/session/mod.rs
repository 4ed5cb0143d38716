//! Ephemeral UI session state.
//!
//! Owns which catalog partition is shown, what the detail view inspects, the
//! search box, and the notification queue. The inspected item outlives
//! `close_detail` by the exit-transition delay, so the view never loses its
//! content mid-animation; re-opening before the delay cancels the clear.

pub mod notify;

use crate::app::event::{NotificationId, TimerEvent, TimerToken};
use crate::haptics::{HapticPattern, Haptics};
use crate::timer::{Scheduler, TimerSlot};
use notify::{NotificationQueue, Severity};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Active catalog partition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Category(String),
}

pub struct UiSession {
    active_filter: Filter,
    inspected_item: Option<String>,
    detail_open: bool,
    search_open: bool,
    search_query: String,
    clear_inspected: TimerSlot,
    exit_delay: Duration,
    default_ttl_ms: i64,
    scheduler: Scheduler,
    haptics: Arc<dyn Haptics>,
    notifications: NotificationQueue,
}

impl UiSession {
    pub fn new(
        scheduler: Scheduler,
        exit_delay: Duration,
        default_ttl_ms: i64,
        haptics: Arc<dyn Haptics>,
    ) -> Self {
        Self {
            active_filter: Filter::All,
            inspected_item: None,
            detail_open: false,
            search_open: false,
            search_query: String::new(),
            clear_inspected: TimerSlot::new(),
            exit_delay,
            default_ttl_ms,
            notifications: NotificationQueue::new(scheduler.clone()),
            scheduler,
            haptics,
        }
    }

    pub fn open_detail(&mut self, item_id: impl Into<String>) {
        self.clear_inspected.cancel();
        let item_id = item_id.into();
        debug!(item = %item_id, "detail opened");
        self.inspected_item = Some(item_id);
        self.detail_open = true;
    }

    pub fn close_detail(&mut self) {
        if !self.detail_open {
            return;
        }
        self.detail_open = false;
        self.clear_inspected
            .arm(&self.scheduler, self.exit_delay, TimerEvent::ClearInspected);
        debug!("detail closing");
    }

    /// Exit transition finished. Stale tokens are ignored.
    pub fn on_clear_inspected(&mut self, token: TimerToken) -> bool {
        if !self.clear_inspected.take_fired(token) {
            return false;
        }
        self.inspected_item = None;
        true
    }

    pub fn set_filter(&mut self, filter: Filter) {
        debug!(?filter, "filter set");
        self.active_filter = filter;
    }

    pub fn active_filter(&self) -> &Filter {
        &self.active_filter
    }

    pub fn inspected_item(&self) -> Option<&str> {
        self.inspected_item.as_deref()
    }

    pub fn is_detail_open(&self) -> bool {
        self.detail_open
    }

    pub fn open_search(&mut self) {
        self.search_open = true;
    }

    /// Closing search also forgets the query.
    pub fn close_search(&mut self) {
        self.search_open = false;
        self.search_query.clear();
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn is_search_open(&self) -> bool {
        self.search_open
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Show a notification. `ttl_ms` defaults to the configured lifetime.
    pub fn notify(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
        ttl_ms: Option<i64>,
    ) -> NotificationId {
        match severity {
            Severity::Success => self.haptics.pulse(HapticPattern::Confirm),
            Severity::Error => self.haptics.pulse(HapticPattern::Error),
            Severity::Info => {}
        }
        self.notifications
            .push(message, severity, ttl_ms.unwrap_or(self.default_ttl_ms))
    }

    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        self.notifications.dismiss(id)
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationQueue {
        &mut self.notifications
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::event::AppEvent;
    use crate::haptics::testing::RecordingHaptics;
    use crate::haptics::NoHaptics;
    use tokio::sync::mpsc;

    const EXIT: Duration = Duration::from_millis(300);

    fn session() -> (UiSession, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = UiSession::new(Scheduler::new(tx), EXIT, 3000, Arc::new(NoHaptics));
        (session, rx)
    }

    fn pump(session: &mut UiSession, rx: &mut mpsc::UnboundedReceiver<AppEvent>) {
        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::Timer(TimerEvent::ClearInspected(token)) => {
                    session.on_clear_inspected(token);
                }
                AppEvent::Timer(TimerEvent::DismissNotification(id)) => {
                    session.dismiss(id);
                }
                _ => {}
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_keeps_content_until_exit_delay() {
        let (mut session, mut rx) = session();
        session.open_detail("spring-rolls");
        session.close_detail();
        assert!(!session.is_detail_open());
        assert_eq!(session.inspected_item(), Some("spring-rolls"));

        tokio::time::sleep(Duration::from_millis(299)).await;
        pump(&mut session, &mut rx);
        assert_eq!(session.inspected_item(), Some("spring-rolls"));

        tokio::time::sleep(Duration::from_millis(2)).await;
        pump(&mut session, &mut rx);
        assert_eq!(session.inspected_item(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reopen_before_delay_keeps_new_selection() {
        let (mut session, mut rx) = session();
        session.open_detail("a");
        session.close_detail();
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.open_detail("b");

        tokio::time::sleep(EXIT * 2).await;
        pump(&mut session, &mut rx);
        assert_eq!(session.inspected_item(), Some("b"));
        assert!(session.is_detail_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_replaces_open_detail() {
        let (mut session, _rx) = session();
        session.open_detail("a");
        session.open_detail("b");
        assert_eq!(session.inspected_item(), Some("b"));
        assert!(session.is_detail_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_close_does_not_restart_delay() {
        let (mut session, mut rx) = session();
        session.open_detail("a");
        session.close_detail();
        tokio::time::sleep(Duration::from_millis(200)).await;
        session.close_detail();
        tokio::time::sleep(Duration::from_millis(150)).await;
        pump(&mut session, &mut rx);
        assert_eq!(session.inspected_item(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_clear_token_ignored() {
        let (mut session, _rx) = session();
        session.open_detail("a");
        session.close_detail();
        session.open_detail("b");
        // A clear that was already queued before the re-open
        assert!(!session.on_clear_inspected(0));
        assert_eq!(session.inspected_item(), Some("b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_filter_and_search() {
        let (mut session, _rx) = session();
        assert_eq!(session.active_filter(), &Filter::All);
        session.set_filter(Filter::Category("mains".into()));
        assert_eq!(session.active_filter(), &Filter::Category("mains".into()));
        session.set_filter(Filter::Category("does-not-exist".into()));
        assert_eq!(
            session.active_filter(),
            &Filter::Category("does-not-exist".into())
        );

        session.open_search();
        session.set_search_query("tofu");
        assert!(session.is_search_open());
        assert_eq!(session.search_query(), "tofu");
        session.close_search();
        assert!(!session.is_search_open());
        assert_eq!(session.search_query(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_notify_defaults_and_haptics() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let haptics = Arc::new(RecordingHaptics::default());
        let mut session = UiSession::new(Scheduler::new(tx), EXIT, 3000, haptics.clone());

        let added = session.notify("Spring Rolls added to cart", Severity::Success, None);
        session.notify("Cart cleared", Severity::Info, Some(0));
        assert_eq!(haptics.pulses(), vec![HapticPattern::Confirm]);
        let failed = session.notify("Couldn't save your cart", Severity::Error, Some(0));
        assert_eq!(
            haptics.pulses(),
            vec![HapticPattern::Confirm, HapticPattern::Error]
        );
        assert!(session.dismiss(failed));

        tokio::time::sleep(Duration::from_millis(3001)).await;
        pump(&mut session, &mut rx);
        assert!(session.notifications().iter().all(|n| n.id != added));
        assert_eq!(session.notifications().len(), 1);
    }
}
