use crate::app::state::{AppState, InputMode, SwipeTarget};
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut parts: Vec<Span> = Vec::new();

    let (mode, hints) = match (state.input_mode, state.swipe_target()) {
        (InputMode::Search, _) => ("SEARCH", "type to filter · Enter browse results · Esc cancel"),
        (InputMode::Note, _) => ("NOTE", "Enter save · Esc cancel"),
        (InputMode::Promo, _) => ("PROMO", "type a code · Enter apply · Esc cancel"),
        (_, SwipeTarget::Cart) => ("CART", "↑/↓ line · swipe left to delete · g promo · Esc close"),
        (_, SwipeTarget::Detail) => ("DETAIL", "swipe down or Esc to close"),
        (_, SwipeTarget::Catalog) => (
            "MENU",
            "↑/↓ select · Enter details · ←/→ tabs · a add · / search · v veg · c cart · o call · q quit",
        ),
    };
    parts.push(Span::styled(format!(" {} ", mode), Theme::status_mode()));
    match state.gestures.sample() {
        Some(sample) if state.gestures.is_tracking() && sample.distance > 0.0 => {
            parts.push(Span::styled(
                format!(" dragging {:?} {:.0}pt ", sample.direction, sample.distance).to_lowercase(),
                Theme::status_bar(),
            ));
        }
        _ => parts.push(Span::styled(format!(" {} ", hints), Theme::status_bar())),
    }

    let right = format!(
        " {} · {} items ",
        state.fulfillment.label(),
        state.cart.item_count()
    );
    // Pad to fill remaining space
    let used: usize = parts.iter().map(|s| s.content.width()).sum();
    let remaining = (area.width as usize).saturating_sub(used + right.width());
    parts.push(Span::styled(" ".repeat(remaining), Theme::status_bar()));
    parts.push(Span::styled(right, Theme::status_bar()));

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}
