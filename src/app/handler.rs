use crate::app::action::Action;
use crate::app::event::{AppEvent, TimerEvent};
use crate::app::state::*;
use crate::cart::checkout::call_intent;
use crate::cart::line::Variant;
use crate::cart::promo;
use crate::cart::storage::KvStore;
use crate::cart::CartStore;
use crate::catalog::model::MenuItem;
use crate::input::{GestureRecognizer, SwipeDirection, SwipeHandler};
use crate::session::notify::Severity;
use crate::session::{Filter, UiSession};
use crossterm::event::{
    Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use tracing::debug;

/// Rows moved per wheel notch.
const WHEEL_ROWS: i64 = 3;

pub fn handle_event(state: &mut AppState, event: AppEvent) -> Vec<Action> {
    let actions = match event {
        AppEvent::Terminal(cevent) => handle_terminal(state, cevent),
        AppEvent::Timer(timer) => {
            handle_timer(state, timer);
            vec![]
        }
    };

    // Writes are best effort; tell the user once per failure
    if let Some(err) = state.cart.take_storage_error() {
        state.session.notify(
            format!("Couldn't save your cart: {}", err),
            Severity::Error,
            Some(state.config.notifications.long_ms),
        );
        state.dirty = true;
    }
    actions
}

fn handle_timer(state: &mut AppState, timer: TimerEvent) {
    let changed = match timer {
        TimerEvent::ClearInspected(token) => state.session.on_clear_inspected(token),
        TimerEvent::DismissNotification(id) => state.session.dismiss(id),
        TimerEvent::ScrollSettled(token) => state.scroll.on_settled(token),
        TimerEvent::GestureFrame(token) => {
            with_swipe_target(state, |gestures, target| gestures.on_frame(token, target));
            true
        }
    };
    if changed {
        state.dirty = true;
    }
}

fn handle_terminal(state: &mut AppState, event: CEvent) -> Vec<Action> {
    match event {
        CEvent::Key(key) if key.kind == KeyEventKind::Press => {
            state.dirty = true;
            handle_key(state, key)
        }
        CEvent::Mouse(mouse) => {
            handle_mouse(state, mouse);
            vec![]
        }
        CEvent::FocusLost => {
            state.gestures.touch_cancel();
            state.swipe_offset = None;
            state.swipe_line = None;
            state.dirty = true;
            vec![]
        }
        CEvent::Resize(columns, rows) => {
            state.set_screen_size(columns, rows);
            state.dirty = true;
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return vec![Action::Quit];
    }

    match state.input_mode {
        InputMode::Search => return handle_search_key(state, key),
        InputMode::Note => return handle_note_key(state, key),
        InputMode::Promo => return handle_promo_key(state, key),
        InputMode::Browse => {}
    }

    match key.code {
        KeyCode::Char('q') => return vec![Action::Quit],
        KeyCode::Char('o') => return place_call(state),
        _ => {}
    }

    if state.cart.is_open() {
        handle_cart_key(state, key);
    } else if state.session.is_detail_open() {
        handle_detail_key(state, key);
    } else {
        handle_catalog_key(state, key);
    }
    vec![]
}

fn handle_catalog_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => state.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => state.move_selection(1),
        KeyCode::PageUp => state.scroll_list(-(state.viewport_rows as i64)),
        KeyCode::PageDown => state.scroll_list(state.viewport_rows as i64),
        KeyCode::Enter => open_selected_detail(state),
        KeyCode::Left | KeyCode::Char('h') => cycle_filter(state, false),
        KeyCode::Right | KeyCode::Char('l') => cycle_filter(state, true),
        KeyCode::Char('a') => quick_add(state),
        KeyCode::Char('v') => {
            state.vegetarian_only = !state.vegetarian_only;
            state.reset_list();
        }
        KeyCode::Char('/') => {
            state.session.open_search();
            state.input.load(state.session.search_query());
            state.input_mode = InputMode::Search;
        }
        KeyCode::Char('c') => open_cart(state),
        KeyCode::Esc => {
            if state.session.is_search_open() {
                state.session.close_search();
                state.reset_list();
            } else {
                state.session.notifications_mut().dismiss_latest();
            }
        }
        _ => {}
    }
}

fn handle_detail_key(state: &mut AppState, key: KeyEvent) {
    let variants = state
        .inspected_menu_item()
        .map(|item| item.variants.len())
        .unwrap_or(0);
    match key.code {
        KeyCode::Esc => state.session.close_detail(),
        KeyCode::Left | KeyCode::Char('h') => state.draft.cycle_variant(variants, false),
        KeyCode::Right | KeyCode::Char('l') => state.draft.cycle_variant(variants, true),
        KeyCode::Char('+') | KeyCode::Char('=') => state.draft.adjust_quantity(1),
        KeyCode::Char('-') => state.draft.adjust_quantity(-1),
        KeyCode::Char('n') => {
            let note = state.draft.note.clone().unwrap_or_default();
            state.input.load(&note);
            state.input_mode = InputMode::Note;
        }
        KeyCode::Char('a') | KeyCode::Enter => add_from_detail(state),
        KeyCode::Char('c') => open_cart(state),
        _ => {}
    }
}

fn handle_cart_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => state.cart.set_open(false),
        KeyCode::Char('c') => state.cart.toggle_open(),
        KeyCode::Up | KeyCode::Char('k') => state.move_line_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => state.move_line_selection(1),
        KeyCode::Char('+') | KeyCode::Char('=') => adjust_selected_line(state, 1),
        KeyCode::Char('-') => adjust_selected_line(state, -1),
        KeyCode::Char('d') | KeyCode::Delete => {
            remove_line_at(&mut state.cart, &mut state.session, state.selected_line)
        }
        KeyCode::Char('x') => {
            if !state.cart.is_empty() {
                state.cart.clear();
                state.session.notify(
                    "Cart cleared",
                    Severity::Info,
                    Some(state.config.notifications.short_ms),
                );
            }
        }
        KeyCode::Char('g') => {
            if state.promo.take().is_some() {
                state.session.notify(
                    "Promo code removed",
                    Severity::Info,
                    Some(state.config.notifications.short_ms),
                );
            } else {
                state.input.clear();
                state.input_mode = InputMode::Promo;
            }
        }
        KeyCode::Char('p') => {
            state.fulfillment = state.fulfillment.toggle();
            debug!(method = state.fulfillment.label(), "fulfillment changed");
        }
        _ => {}
    }
    state.clamp_line_selection();
}

fn handle_search_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    match key.code {
        KeyCode::Esc => {
            state.input.clear();
            state.session.close_search();
            state.input_mode = InputMode::Browse;
        }
        KeyCode::Enter => {
            // Keep the results, hand the keys back to the list
            state.input_mode = InputMode::Browse;
            return vec![];
        }
        KeyCode::Backspace => state.input.delete_back(),
        KeyCode::Left => state.input.move_left(),
        KeyCode::Right => state.input.move_right(),
        KeyCode::Home => state.input.move_home(),
        KeyCode::End => state.input.move_end(),
        KeyCode::Char(c) => state.input.insert_char(c),
        _ => return vec![],
    }
    state.session.set_search_query(state.input.text.clone());
    state.reset_list();
    vec![]
}

fn handle_note_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    match key.code {
        KeyCode::Esc => {
            state.input.clear();
            state.input_mode = InputMode::Browse;
        }
        KeyCode::Enter => {
            let note = state.input.take_text();
            state.draft.note = (!note.trim().is_empty()).then_some(note);
            state.input_mode = InputMode::Browse;
        }
        KeyCode::Backspace => state.input.delete_back(),
        KeyCode::Left => state.input.move_left(),
        KeyCode::Right => state.input.move_right(),
        KeyCode::Home => state.input.move_home(),
        KeyCode::End => state.input.move_end(),
        KeyCode::Char(c) => state.input.insert_char(c),
        _ => {}
    }
    vec![]
}

fn handle_promo_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    match key.code {
        KeyCode::Esc => {
            state.input.clear();
            state.input_mode = InputMode::Browse;
        }
        KeyCode::Enter => {
            if state.input.text.trim().is_empty() {
                return vec![];
            }
            let code = state.input.take_text();
            state.input_mode = InputMode::Browse;
            apply_promo(state, &code);
        }
        KeyCode::Backspace => state.input.delete_back(),
        KeyCode::Left => state.input.move_left(),
        KeyCode::Right => state.input.move_right(),
        KeyCode::Home => state.input.move_home(),
        KeyCode::End => state.input.move_end(),
        KeyCode::Char(c) => state.input.insert_char(c.to_ascii_uppercase()),
        _ => {}
    }
    vec![]
}

fn apply_promo(state: &mut AppState, code: &str) {
    let ttl = Some(state.config.notifications.default_ms);
    match promo::lookup(code) {
        Some(promo) => {
            state.promo = Some(promo);
            debug!(code = promo.code, "promo applied");
            state.session.notify(
                format!("Promo code applied! {}", promo.description),
                Severity::Success,
                ttl,
            );
        }
        None => {
            state
                .session
                .notify("Invalid promo code. Please try again.", Severity::Error, ttl);
        }
    }
}

fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    let x = mouse.column as f64 * state.config.gestures.cell_width;
    let y = mouse.row as f64 * state.config.gestures.cell_height;
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let thresholds = state.swipe_thresholds();
            state.gestures.set_thresholds(thresholds);
            state.gestures.touch_start(x, y);
            state.swipe_offset = None;
            state.swipe_line = match state.swipe_target() {
                SwipeTarget::Cart => crate::ui::cart_line_at(state, mouse.column, mouse.row),
                _ => None,
            };
        }
        MouseEventKind::Drag(MouseButton::Left) => state.gestures.touch_move(x, y),
        MouseEventKind::Up(MouseButton::Left) => {
            let filter_before = state.session.active_filter().clone();
            let completed =
                with_swipe_target(state, |gestures, target| gestures.touch_end(x, y, target));
            state.swipe_offset = None;
            state.swipe_line = None;
            if completed.is_some() {
                state.clamp_line_selection();
                if *state.session.active_filter() != filter_before {
                    state.reset_list();
                }
            }
            state.dirty = true;
        }
        MouseEventKind::ScrollDown => {
            if !state.cart.is_open() && !state.session.is_detail_open() {
                state.scroll_list(WHEEL_ROWS);
                state.dirty = true;
            }
        }
        MouseEventKind::ScrollUp => {
            if !state.cart.is_open() && !state.session.is_detail_open() {
                state.scroll_list(-WHEEL_ROWS);
                state.dirty = true;
            }
        }
        _ => {}
    }
}

/// Run `f` against the recognizer and the swipe handler for whatever
/// surface is in front.
fn with_swipe_target<R>(
    state: &mut AppState,
    f: impl FnOnce(&mut GestureRecognizer, &mut dyn SwipeHandler) -> R,
) -> R {
    match state.swipe_target() {
        SwipeTarget::Cart => {
            let mut target = CartSwipe {
                cart: &mut state.cart,
                session: &mut state.session,
                line: state.swipe_line,
                offset: &mut state.swipe_offset,
            };
            f(&mut state.gestures, &mut target)
        }
        SwipeTarget::Detail => {
            let variants = state
                .session
                .inspected_item()
                .and_then(|id| state.catalog.item(id))
                .map(|item| item.variants.len())
                .unwrap_or(0);
            let mut target = DetailSwipe {
                session: &mut state.session,
                draft: &mut state.draft,
                variants,
                offset: &mut state.swipe_offset,
            };
            f(&mut state.gestures, &mut target)
        }
        SwipeTarget::Catalog => {
            let tabs = state.filter_tabs();
            let mut target = CatalogSwipe {
                session: &mut state.session,
                tabs,
                offset: &mut state.swipe_offset,
            };
            f(&mut state.gestures, &mut target)
        }
    }
}

/// Swipe left deletes the line the drag started on, swipe down closes the
/// cart.
struct CartSwipe<'a> {
    cart: &'a mut CartStore<Box<dyn KvStore>>,
    session: &'a mut UiSession,
    line: Option<usize>,
    offset: &'a mut Option<(SwipeDirection, f64)>,
}

impl SwipeHandler for CartSwipe<'_> {
    fn on_swipe_left(&mut self) {
        if let Some(index) = self.line {
            remove_line_at(self.cart, self.session, index);
        }
    }

    fn on_swipe_down(&mut self) {
        self.cart.set_open(false);
    }

    fn on_swiping(&mut self, direction: SwipeDirection, distance: f64) {
        *self.offset = Some((direction, distance));
    }
}

struct DetailSwipe<'a> {
    session: &'a mut UiSession,
    draft: &'a mut DetailDraft,
    variants: usize,
    offset: &'a mut Option<(SwipeDirection, f64)>,
}

impl SwipeHandler for DetailSwipe<'_> {
    fn on_swipe_left(&mut self) {
        self.draft.cycle_variant(self.variants, true);
    }

    fn on_swipe_right(&mut self) {
        self.draft.cycle_variant(self.variants, false);
    }

    fn on_swipe_down(&mut self) {
        self.session.close_detail();
    }

    fn on_swiping(&mut self, direction: SwipeDirection, distance: f64) {
        *self.offset = Some((direction, distance));
    }
}

/// Horizontal swipes page through the filter tabs.
struct CatalogSwipe<'a> {
    session: &'a mut UiSession,
    tabs: Vec<Filter>,
    offset: &'a mut Option<(SwipeDirection, f64)>,
}

impl SwipeHandler for CatalogSwipe<'_> {
    fn on_swipe_left(&mut self) {
        let next = next_tab(&self.tabs, self.session.active_filter(), true);
        self.session.set_filter(next);
    }

    fn on_swipe_right(&mut self) {
        let prev = next_tab(&self.tabs, self.session.active_filter(), false);
        self.session.set_filter(prev);
    }

    fn on_swiping(&mut self, direction: SwipeDirection, distance: f64) {
        *self.offset = Some((direction, distance));
    }
}

fn next_tab(tabs: &[Filter], current: &Filter, forward: bool) -> Filter {
    if tabs.is_empty() {
        return Filter::All;
    }
    let len = tabs.len();
    let index = tabs.iter().position(|f| f == current).unwrap_or(0);
    let next = if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    };
    tabs[next].clone()
}

fn cycle_filter(state: &mut AppState, forward: bool) {
    let tabs = state.filter_tabs();
    let next = next_tab(&tabs, state.session.active_filter(), forward);
    state.session.set_filter(next);
    state.reset_list();
}

fn open_selected_detail(state: &mut AppState) {
    let Some(id) = state.selected_menu_item().map(|item| item.id.clone()) else {
        return;
    };
    state.draft = DetailDraft::default();
    state.session.open_detail(id);
}

fn open_cart(state: &mut AppState) {
    state.cart.set_open(true);
    state.clamp_line_selection();
}

fn quick_add(state: &mut AppState) {
    let Some(item) = state.selected_menu_item().cloned() else {
        return;
    };
    let Some(variant) = item.base_variant().cloned() else {
        return;
    };
    add_to_cart(state, &item, &variant, 1, None);
}

fn add_from_detail(state: &mut AppState) {
    let Some(item) = state.inspected_menu_item().cloned() else {
        return;
    };
    let Some(variant) = item.variants.get(state.draft.variant_index).cloned() else {
        return;
    };
    let quantity = state.draft.quantity;
    let note = state.draft.note.take();
    add_to_cart(state, &item, &variant, quantity, note.as_deref());
    state.session.close_detail();
}

fn add_to_cart(state: &mut AppState, item: &MenuItem, variant: &Variant, quantity: u32, note: Option<&str>) {
    if state.cart.add_line(item, variant, quantity, note).is_some() {
        state.session.notify(
            format!("{} added to cart", item.name),
            Severity::Success,
            Some(state.config.notifications.short_ms),
        );
    }
}

fn adjust_selected_line(state: &mut AppState, delta: i64) {
    if let Some(line_id) = state.selected_cart_line().map(|l| l.line_id) {
        state.cart.adjust_quantity(line_id, delta);
    }
}

fn remove_line_at(cart: &mut CartStore<Box<dyn KvStore>>, session: &mut UiSession, index: usize) {
    let Some(line) = cart.lines().get(index) else {
        return;
    };
    let (line_id, name) = (line.line_id, line.name.clone());
    if cart.remove_line(line_id) {
        session.notify(format!("{} removed from cart", name), Severity::Info, None);
    }
}

fn place_call(state: &mut AppState) -> Vec<Action> {
    let phone = state.config.store.phone.clone();
    let intent = call_intent(&phone);
    let message = if state.cart.is_empty() {
        format!("Call {} to place your order", phone)
    } else {
        let summary = state.order_summary();
        format!(
            "Call {} to order {} items ({} {})",
            phone,
            summary.item_count,
            summary.total,
            state.fulfillment.label().to_lowercase()
        )
    };
    state
        .session
        .notify(message, Severity::Info, Some(state.config.notifications.long_ms));
    vec![Action::PlaceCall { intent }]
}
