use crate::app::state::AppState;
use crate::cart::line::Price;
use crate::catalog::model::MenuItem;
use crate::ui::theme::Theme;
use crate::ui::{fit, truncate};
use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};

/// Items marked as popular in the unfiltered list.
const FEATURED_COUNT: usize = 3;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let items = state.visible_items();
    if items.is_empty() {
        let message = if state.session.is_search_open() {
            " Nothing matches your search."
        } else {
            " Nothing here yet."
        };
        frame.render_widget(Paragraph::new(Span::styled(message, Theme::dim())), area);
        return;
    }

    let featured: Vec<&str> = state
        .catalog
        .featured(FEATURED_COUNT)
        .into_iter()
        .map(|item| item.id.as_str())
        .collect();

    let height = area.height as usize;
    let width = area.width.saturating_sub(1) as usize;
    let lines: Vec<Line> = items
        .iter()
        .enumerate()
        .skip(state.list_offset)
        .take(height)
        .map(|(i, item)| {
            row(
                item,
                width,
                i == state.selected_item,
                featured.contains(&item.id.as_str()),
            )
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);

    if items.len() > height {
        let mut scrollbar_state = ScrollbarState::new(items.len().saturating_sub(height))
            .position(state.list_offset);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut scrollbar_state,
        );
    }
}

fn price_label(item: &MenuItem) -> String {
    match item.base_variant().map(|v| v.price) {
        Some(Price::Market) | None => "Market Price".to_string(),
        Some(price) if item.variants.len() > 1 => format!("from {}", price),
        Some(price) => price.to_string(),
    }
}

fn row(item: &MenuItem, width: usize, selected: bool, featured: bool) -> Line<'static> {
    let price = price_label(item);
    let is_market = matches!(item.base_variant().map(|v| v.price), Some(Price::Market));
    let marks = format!(
        "{}{}{}",
        if item.is_vegetarian { " veg" } else { "" },
        if item.is_spicy { " hot" } else { "" },
        if featured { " popular" } else { "" },
    );
    let rating = format!(" ★{:.1}", item.rating);
    let fixed = 3 + marks.len() + rating.chars().count() + 2 + price.len();
    let name_width = width.saturating_sub(fixed).max(8);

    let base = if selected { Theme::selected() } else { Theme::text() };
    let pointer = if selected { " ▸ " } else { "   " };
    Line::from(vec![
        Span::styled(pointer, base),
        Span::styled(fit(&truncate(&item.name, name_width), name_width), base),
        Span::styled(marks, Theme::vegetarian()),
        Span::styled(rating, Theme::rating()),
        Span::raw("  "),
        Span::styled(
            price,
            if is_market {
                Theme::market_price()
            } else {
                Theme::price()
            },
        ),
    ])
}
