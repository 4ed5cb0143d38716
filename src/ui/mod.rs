mod cart_panel;
mod catalog_list;
mod detail;
mod header;
mod layout;
mod status_bar;
mod theme;
mod toasts;

pub use layout::CHROME_ROWS;

/// Cart line under a terminal cell, using the current screen size.
pub fn cart_line_at(state: &AppState, column: u16, row: u16) -> Option<usize> {
    let (columns, rows) = state.screen_size;
    cart_panel::line_at(Rect::new(0, 0, columns, rows), state, column, row)
}

use crate::app::state::AppState;
use ratatui::prelude::*;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    let app_layout = layout::compute_layout(area, state.header_visible());

    if let Some(header_area) = app_layout.header {
        header::render(frame, header_area, state);
    }
    header::render_tabs(frame, app_layout.tabs, state);
    catalog_list::render(frame, app_layout.list, state);
    status_bar::render(frame, app_layout.status_bar, state);

    // Overlays, back to front
    detail::render(frame, area, state);
    cart_panel::render(frame, area, state);
    toasts::render(frame, app_layout.list, state);
}

/// Cut `text` to `max_width` terminal columns, ending in `…` when cut.
pub(crate) fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Pad `text` with spaces to exactly `width` columns, truncating if longer.
pub(crate) fn fit(text: &str, width: usize) -> String {
    let cut = truncate(text, width);
    let pad = width.saturating_sub(cut.width());
    format!("{}{}", cut, " ".repeat(pad))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::storage::MemoryStore;
    use crate::catalog::Catalog;
    use crate::config::AppConfig;
    use crate::haptics::NoHaptics;
    use crate::timer::Scheduler;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_truncate_by_display_width() {
        assert_eq!(truncate("Mapo Tofu", 20), "Mapo Tofu");
        assert_eq!(truncate("Mapo Tofu", 6), "Mapo …");
        assert_eq!(truncate("麻婆豆腐", 5), "麻婆…");
        assert_eq!(truncate("anything", 0), "");
        assert_eq!(fit("ab", 4), "ab  ");
    }

    #[tokio::test]
    async fn test_render_catalog_and_cart() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut state = AppState::new(
            AppConfig::default(),
            Catalog::bundled().unwrap(),
            Box::new(MemoryStore::new()),
            Scheduler::new(tx),
            Arc::new(NoHaptics),
        );
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        terminal.draw(|f| render(f, &state)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Raisa's Chinese Food"));
        assert!(text.contains("Spring Rolls"));
        assert!(text.contains("Market Price"));

        let item = state.catalog.item("spring-rolls").unwrap().clone();
        let variant = item.variants[0].clone();
        state.cart.add_line(&item, &variant, 2, Some("no sauce"));
        state.cart.set_open(true);
        terminal.draw(|f| render(f, &state)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Your Cart"));
        assert!(text.contains("$17.98"));
        assert!(text.contains("no sauce"));
    }
}
