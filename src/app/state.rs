use crate::cart::checkout::{FulfillmentMethod, OrderSummary};
use crate::cart::line::{CartLine, MAX_NOTE_CHARS, MAX_QUANTITY, MIN_QUANTITY};
use crate::cart::promo::Promo;
use crate::cart::storage::KvStore;
use crate::cart::CartStore;
use crate::catalog::model::MenuItem;
use crate::catalog::{Catalog, ItemFilter};
use crate::config::AppConfig;
use crate::haptics::Haptics;
use crate::input::{GestureRecognizer, ScrollDirection, SwipeDirection, ScrollTracker, Thresholds};
use crate::session::{Filter, UiSession};
use crate::timer::Scheduler;
use std::sync::Arc;
use std::time::Duration;

/// Single-line text entry with a character limit.
#[derive(Debug)]
pub struct InputState {
    pub text: String,
    pub cursor: usize,
    max_chars: usize,
}

impl InputState {
    pub fn new(max_chars: usize) -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            max_chars,
        }
    }

    /// Start editing `text`, cursor at the end.
    pub fn load(&mut self, text: &str) {
        self.text = text.chars().take(self.max_chars).collect();
        self.cursor = self.text.len();
    }

    pub fn insert_char(&mut self, c: char) {
        if self.text.chars().count() >= self.max_chars {
            return;
        }
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn delete_back(&mut self) {
        if self.cursor > 0 {
            let prev = self.text[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.text.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.text[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.text.len() {
            self.cursor = self.text[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.text.len());
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    pub fn take_text(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Cursor position in characters, for placing the terminal cursor.
    pub fn cursor_chars(&self) -> usize {
        self.text[..self.cursor].chars().count()
    }
}

/// What typed characters go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Browse,
    Search,
    Note,
    Promo,
}

/// Choices made in the detail view before adding to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailDraft {
    pub variant_index: usize,
    pub quantity: u32,
    pub note: Option<String>,
}

impl Default for DetailDraft {
    fn default() -> Self {
        Self {
            variant_index: 0,
            quantity: MIN_QUANTITY,
            note: None,
        }
    }
}

impl DetailDraft {
    pub fn adjust_quantity(&mut self, delta: i64) {
        let next = (self.quantity as i64 + delta).clamp(MIN_QUANTITY as i64, MAX_QUANTITY as i64);
        self.quantity = next as u32;
    }

    pub fn cycle_variant(&mut self, variants: usize, forward: bool) {
        if variants == 0 {
            return;
        }
        self.variant_index = if forward {
            (self.variant_index + 1) % variants
        } else {
            (self.variant_index + variants - 1) % variants
        };
    }
}

/// Which surface receives pointer gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeTarget {
    Catalog,
    Detail,
    Cart,
}

pub struct AppState {
    pub config: AppConfig,
    pub catalog: Catalog,
    pub cart: CartStore<Box<dyn KvStore>>,
    pub session: UiSession,
    pub gestures: GestureRecognizer,
    pub scroll: ScrollTracker,
    pub haptics: Arc<dyn Haptics>,
    pub input: InputState,
    pub input_mode: InputMode,
    pub draft: DetailDraft,
    pub fulfillment: FulfillmentMethod,
    pub promo: Option<&'static Promo>,
    pub vegetarian_only: bool,
    pub selected_item: usize,
    pub list_offset: usize,
    pub selected_line: usize,
    pub viewport_rows: usize,
    /// Terminal size in cells, columns then rows.
    pub screen_size: (u16, u16),
    /// Live drag feedback for the surface under the pointer.
    pub swipe_offset: Option<(SwipeDirection, f64)>,
    /// Cart line the current drag started on.
    pub swipe_line: Option<usize>,
    pub should_quit: bool,
    pub dirty: bool,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        catalog: Catalog,
        storage: Box<dyn KvStore>,
        scheduler: Scheduler,
        haptics: Arc<dyn Haptics>,
    ) -> Self {
        let cart = CartStore::new(storage, config.storage.cart_key.clone(), haptics.clone());
        let session = UiSession::new(
            scheduler.clone(),
            Duration::from_millis(config.ui.detail_exit_ms),
            config.notifications.default_ms,
            haptics.clone(),
        );
        let gestures = GestureRecognizer::new(
            Thresholds {
                horizontal: config.gestures.horizontal_threshold,
                vertical: config.gestures.vertical_threshold,
            },
            Duration::from_millis(config.gestures.frame_interval_ms),
            scheduler.clone(),
            haptics.clone(),
        );
        let scroll = ScrollTracker::new(&config.scroll, scheduler);
        Self {
            config,
            catalog,
            cart,
            session,
            gestures,
            scroll,
            haptics,
            input: InputState::new(MAX_NOTE_CHARS),
            input_mode: InputMode::Browse,
            draft: DetailDraft::default(),
            fulfillment: FulfillmentMethod::default(),
            promo: None,
            vegetarian_only: false,
            selected_item: 0,
            list_offset: 0,
            selected_line: 0,
            viewport_rows: 20,
            screen_size: (80, 25),
            swipe_offset: None,
            swipe_line: None,
            should_quit: false,
            dirty: true,
        }
    }

    /// Items in the catalog list: search results while a query is typed,
    /// otherwise the active category.
    pub fn visible_items(&self) -> Vec<&MenuItem> {
        if self.session.is_search_open() && !self.session.search_query().trim().is_empty() {
            return self.catalog.search(self.session.search_query());
        }
        if !self.vegetarian_only {
            return self.catalog.items_for(self.session.active_filter());
        }
        let category = match self.session.active_filter() {
            Filter::All => None,
            Filter::Category(id) => Some(id.clone()),
        };
        self.catalog.filter_items(&ItemFilter {
            vegetarian: Some(true),
            category,
            ..Default::default()
        })
    }

    pub fn selected_menu_item(&self) -> Option<&MenuItem> {
        self.visible_items().get(self.selected_item).copied()
    }

    /// Item shown by the detail view. Lingers while the view closes.
    pub fn inspected_menu_item(&self) -> Option<&MenuItem> {
        self.session
            .inspected_item()
            .and_then(|id| self.catalog.item(id))
    }

    pub fn selected_cart_line(&self) -> Option<&CartLine> {
        self.cart.lines().get(self.selected_line)
    }

    /// Filter tabs in display order: "All" then each category.
    pub fn filter_tabs(&self) -> Vec<Filter> {
        std::iter::once(Filter::All)
            .chain(
                self.catalog
                    .categories()
                    .iter()
                    .map(|c| Filter::Category(c.id.clone())),
            )
            .collect()
    }

    pub fn swipe_target(&self) -> SwipeTarget {
        if self.cart.is_open() {
            SwipeTarget::Cart
        } else if self.session.is_detail_open() {
            SwipeTarget::Detail
        } else {
            SwipeTarget::Catalog
        }
    }

    /// Completion thresholds for the current target. Deleting a cart line
    /// asks for a longer drag.
    pub fn swipe_thresholds(&self) -> Thresholds {
        let gestures = &self.config.gestures;
        let horizontal = match self.swipe_target() {
            SwipeTarget::Cart => gestures.delete_threshold,
            _ => gestures.horizontal_threshold,
        };
        Thresholds {
            horizontal,
            vertical: gestures.vertical_threshold,
        }
    }

    pub fn order_summary(&self) -> OrderSummary {
        OrderSummary::compute(&self.cart, &self.config.delivery, self.fulfillment, self.promo)
    }

    /// The header slides away while scrolling down past the top.
    pub fn header_visible(&self) -> bool {
        let scroll = self.scroll.state();
        scroll.at_top || scroll.direction != ScrollDirection::Down
    }

    pub fn set_screen_size(&mut self, columns: u16, rows: u16) {
        self.screen_size = (columns, rows);
        self.set_viewport_rows(rows.saturating_sub(crate::ui::CHROME_ROWS) as usize);
    }

    pub fn set_viewport_rows(&mut self, rows: usize) {
        self.viewport_rows = rows.max(1);
        self.update_scroll_extent();
    }

    pub fn move_selection(&mut self, delta: i64) {
        let len = self.visible_items().len();
        if len == 0 {
            self.selected_item = 0;
            return;
        }
        let next = (self.selected_item as i64 + delta).clamp(0, len as i64 - 1);
        self.selected_item = next as usize;
        if self.selected_item < self.list_offset {
            self.set_list_offset(self.selected_item);
        } else if self.selected_item >= self.list_offset + self.viewport_rows {
            self.set_list_offset(self.selected_item + 1 - self.viewport_rows);
        }
    }

    /// Wheel scrolling moves the viewport; the selection follows when it
    /// would fall off screen.
    pub fn scroll_list(&mut self, rows: i64) {
        let len = self.visible_items().len();
        let max_offset = len.saturating_sub(self.viewport_rows);
        let next = (self.list_offset as i64 + rows).clamp(0, max_offset as i64) as usize;
        self.set_list_offset(next);
        let last_visible = (self.list_offset + self.viewport_rows).saturating_sub(1);
        self.selected_item = self
            .selected_item
            .clamp(self.list_offset, last_visible.min(len.saturating_sub(1)).max(self.list_offset));
    }

    /// Start over at the top of a new list.
    pub fn reset_list(&mut self) {
        self.selected_item = 0;
        self.list_offset = 0;
        self.scroll.reset();
        self.update_scroll_extent();
    }

    pub fn move_line_selection(&mut self, delta: i64) {
        let len = self.cart.lines().len();
        if len == 0 {
            self.selected_line = 0;
            return;
        }
        let next = (self.selected_line as i64 + delta).clamp(0, len as i64 - 1);
        self.selected_line = next as usize;
    }

    /// Keep the line cursor inside the cart after removals.
    pub fn clamp_line_selection(&mut self) {
        let len = self.cart.lines().len();
        self.selected_line = self.selected_line.min(len.saturating_sub(1));
    }

    fn set_list_offset(&mut self, offset: usize) {
        if offset == self.list_offset {
            return;
        }
        self.list_offset = offset;
        self.scroll
            .on_scroll(offset as f64 * self.config.ui.row_height);
    }

    fn update_scroll_extent(&mut self) {
        let row_height = self.config.ui.row_height;
        let content = self.visible_items().len() as f64 * row_height;
        self.scroll
            .set_extent(self.viewport_rows as f64 * row_height, content);
    }
}
