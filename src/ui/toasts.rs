use crate::app::state::AppState;
use crate::ui::theme::Theme;
use crate::ui::truncate;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

const MAX_VISIBLE: usize = 3;
const TOAST_WIDTH: u16 = 48;

/// Newest notifications, stacked upward from the bottom of `area`.
pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let notifications = state.session.notifications();
    if notifications.is_empty() {
        return;
    }

    let width = TOAST_WIDTH.min(area.width);
    let x = area.right().saturating_sub(width);
    let mut bottom = area.bottom();
    let newest: Vec<_> = notifications.iter().rev().take(MAX_VISIBLE).collect();
    for notification in newest {
        if bottom < area.y + 3 {
            break;
        }
        let toast = Rect::new(x, bottom - 3, width, 3);
        bottom -= 3;

        frame.render_widget(Clear, toast);
        let style = Theme::severity(notification.severity);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(Theme::border_type())
            .border_style(style)
            .title(Span::styled(
                format!(" {} ", notification.created_at.format("%H:%M")),
                Theme::dim(),
            ));
        let inner = block.inner(toast);
        frame.render_widget(block, toast);
        let text = truncate(&notification.message, inner.width as usize);
        frame.render_widget(Paragraph::new(Span::styled(text, style)), inner);
    }
}
