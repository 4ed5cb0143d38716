use crate::app::state::{AppState, InputMode};
use crate::catalog::model::OpenStatus;
use crate::session::Filter;
use crate::ui::theme::Theme;
use crate::ui::truncate;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::UnicodeWidthStr;

/// Store name, hours and the cart badge. Hidden while scrolling down.
pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Theme::border());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let restaurant = state.catalog.restaurant();
    let (status_label, status_style) = match restaurant.status {
        OpenStatus::Open => ("Open", Theme::vegetarian()),
        OpenStatus::Closed => ("Closed", Theme::spicy()),
    };

    let count = state.cart.item_count();
    let badge = if count == 0 {
        " Cart empty ".to_string()
    } else {
        format!(" Cart: {} · {} ", count, state.cart.subtotal())
    };

    let mut title = vec![
        Span::styled(format!(" {} ", state.config.store.name), Theme::title()),
        Span::styled(format!("[{}]", status_label), status_style),
    ];
    if !restaurant.delivery_time.is_empty() {
        title.push(Span::styled(
            format!("  {}", restaurant.delivery_time),
            Theme::dim(),
        ));
    }
    let used: usize = title.iter().map(|s| s.content.width()).sum();
    let pad = (inner.width as usize).saturating_sub(used + badge.width());
    title.push(Span::raw(" ".repeat(pad)));
    title.push(Span::styled(
        badge,
        if count == 0 {
            Theme::dim()
        } else {
            Theme::tab_active()
        },
    ));

    let description = truncate(
        &restaurant.description,
        (inner.width as usize).saturating_sub(2),
    );
    let lines = vec![
        Line::from(title),
        Line::from(Span::styled(format!(" {}", description), Theme::dim())),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Filter tabs, or the search box while searching.
pub fn render_tabs(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.session.is_search_open() {
        render_search(frame, area, state);
        return;
    }

    let mut spans: Vec<Span> = Vec::new();
    for filter in state.filter_tabs() {
        let label = match &filter {
            Filter::All => "All".to_string(),
            Filter::Category(id) => state
                .catalog
                .category(id)
                .map(|c| {
                    if c.emoji.is_empty() {
                        c.name.clone()
                    } else {
                        format!("{} {}", c.emoji, c.name)
                    }
                })
                .unwrap_or_else(|| id.clone()),
        };
        let style = if &filter == state.session.active_filter() {
            Theme::tab_active()
        } else {
            Theme::tab_inactive()
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!(" {} ", label), style));
    }
    if state.vegetarian_only {
        spans.push(Span::styled("  [vegetarian]", Theme::vegetarian()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_search(frame: &mut Frame, area: Rect, state: &AppState) {
    let editing = state.input_mode == InputMode::Search;
    let query = if editing {
        state.input.text.as_str()
    } else {
        state.session.search_query()
    };
    let results = state.visible_items().len();
    let line = Line::from(vec![
        Span::styled(" / ", Theme::tab_active()),
        Span::styled(format!(" {}", query), Theme::text()),
        Span::styled(
            if query.trim().is_empty() {
                String::new()
            } else {
                format!("  ({} found)", results)
            },
            Theme::dim(),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);

    if editing {
        // " / " prompt plus one space
        let cursor_x = area.x + 4 + state.input.cursor_chars() as u16;
        frame.set_cursor_position((cursor_x.min(area.right().saturating_sub(1)), area.y));
    }
}
