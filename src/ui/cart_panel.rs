use crate::app::state::{AppState, InputMode, SwipeTarget};
use crate::cart::checkout::FulfillmentMethod;
use crate::cart::line::CartLine;
use crate::input::SwipeDirection;
use crate::ui::layout::right_panel;
use crate::ui::theme::Theme;
use crate::ui::{fit, truncate};
use ratatui::layout::Position;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

const PANEL_WIDTH: u16 = 52;
/// Rows reserved below the lines for totals and key hints.
const SUMMARY_ROWS: u16 = 8;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    if !state.cart.is_open() {
        return;
    }

    let panel = right_panel(area, PANEL_WIDTH);
    frame.render_widget(Clear, panel);
    let block = Block::default()
        .title(format!(" Your Cart ({}) ", state.cart.item_count()))
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_type(Theme::border_type())
        .border_style(Theme::border_focused())
        .style(Style::default().bg(Theme::BG_SURFACE));
    let inner = block.inner(panel);
    frame.render_widget(block, panel);

    if state.cart.is_empty() {
        let lines = vec![
            Line::raw(""),
            Line::from(Span::styled(" Your cart is empty", Theme::dim())),
            Line::from(Span::styled(" Press a on any dish to add it", Theme::dim())),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
        return;
    }

    let (lines_area, summary_area) = split_inner(inner);

    let drag = match (state.swipe_target(), state.swipe_offset) {
        (SwipeTarget::Cart, Some((SwipeDirection::Left, distance))) => distance,
        _ => 0.0,
    };
    let width = inner.width as usize;
    let mut rows: Vec<Line> = Vec::new();
    for (i, line) in state.cart.lines().iter().enumerate() {
        let (first, second) = line_rows(line, width);
        if state.swipe_line == Some(i) && drag > 0.0 {
            rows.push(dragged_row(&first, drag, state));
        } else {
            let style = if i == state.selected_line {
                Theme::selected()
            } else {
                Theme::text()
            };
            rows.push(Line::from(Span::styled(first, style)));
        }
        if let Some(note) = second {
            rows.push(Line::from(Span::styled(note, Theme::note())));
        }
    }
    let skip = first_visible_row(rows.len(), lines_area.height, state.selected_line);
    let visible: Vec<Line> = rows.into_iter().skip(skip).collect();
    frame.render_widget(Paragraph::new(visible), lines_area);

    render_summary(frame, summary_area, state);
}

/// Index of the cart line drawn at a screen cell, if any.
pub fn line_at(area: Rect, state: &AppState, column: u16, row: u16) -> Option<usize> {
    if !state.cart.is_open() || state.cart.is_empty() {
        return None;
    }
    let inner = Block::default()
        .borders(Borders::ALL)
        .inner(right_panel(area, PANEL_WIDTH));
    let (lines_area, _) = split_inner(inner);
    if !lines_area.contains(Position::new(column, row)) {
        return None;
    }

    // One row per line plus one per note, in the order `render` draws them
    let owners: Vec<usize> = state
        .cart
        .lines()
        .iter()
        .enumerate()
        .flat_map(|(i, line)| std::iter::repeat(i).take(1 + line.note.is_some() as usize))
        .collect();
    let skip = first_visible_row(owners.len(), lines_area.height, state.selected_line);
    owners.get(skip + (row - lines_area.y) as usize).copied()
}

/// Lines on top, totals and hints below.
fn split_inner(inner: Rect) -> (Rect, Rect) {
    let lines_height = inner.height.saturating_sub(SUMMARY_ROWS);
    let lines_area = Rect::new(inner.x, inner.y, inner.width, lines_height);
    let summary_area = Rect::new(
        inner.x,
        inner.y + lines_height,
        inner.width,
        inner.height - lines_height,
    );
    (lines_area, summary_area)
}

/// Keep the selected line in view.
fn first_visible_row(total_rows: usize, height: u16, selected_line: usize) -> usize {
    total_rows
        .saturating_sub(height as usize)
        .min(selected_line * 2)
}

/// Main row plus an optional note row.
fn line_rows(line: &CartLine, width: usize) -> (String, Option<String>) {
    let total = if line.unit_price().is_market() {
        "Market Price".to_string()
    } else {
        line.line_total().to_string()
    };
    let label = format!(" {}× {} ({})", line.quantity, line.name, line.variant.size);
    let label_width = width.saturating_sub(total.len() + 1);
    let first = format!("{}{}", fit(&label, label_width), total);
    let second = line
        .note
        .as_ref()
        .map(|note| truncate(&format!("    “{}”", note), width));
    (first, second)
}

/// The selected row slides left under the pointer and turns red once a
/// release would delete it.
fn dragged_row(text: &str, distance: f64, state: &AppState) -> Line<'static> {
    let cells = (distance / state.config.gestures.cell_width) as usize;
    let shifted: String = text.chars().skip(cells).collect();
    let armed = distance > state.config.gestures.delete_threshold;
    let tail = if armed { " delete " } else { "" };
    Line::from(vec![
        Span::styled(
            shifted,
            if armed {
                Theme::delete_armed()
            } else {
                Theme::selected()
            },
        ),
        Span::styled(tail, Theme::delete_armed()),
    ])
}

fn render_summary(frame: &mut Frame, area: Rect, state: &AppState) {
    let summary = state.order_summary();
    let width = area.width as usize;
    let row = |label: &str, value: String| -> Line<'static> {
        let label_width = width.saturating_sub(value.len() + 1);
        Line::from(vec![
            Span::styled(fit(&format!(" {}", label), label_width), Theme::dim()),
            Span::styled(value, Theme::price()),
        ])
    };

    let fee = match state.fulfillment {
        FulfillmentMethod::Pickup => "Pickup".to_string(),
        _ if summary.delivery_fee.cents() == 0 => "Free".to_string(),
        _ => summary.delivery_fee.to_string(),
    };
    let total_label = if summary.is_estimate {
        "Total (est.)"
    } else {
        "Total"
    };

    let editing_promo = state.input_mode == InputMode::Promo;
    let promo_row = if editing_promo {
        Line::from(vec![
            Span::styled(" Promo code ", Theme::dim()),
            Span::styled(truncate(&state.input.text, width.saturating_sub(13)), Theme::title()),
        ])
    } else if let Some(promo) = state.promo {
        let value = if summary.discount.cents() > 0 {
            format!("-{}", summary.discount)
        } else {
            promo.label()
        };
        let label_width = width.saturating_sub(value.len() + 1);
        Line::from(vec![
            Span::styled(fit(&format!(" {}", promo.code), label_width), Theme::vegetarian()),
            Span::styled(value, Theme::vegetarian()),
        ])
    } else {
        Line::raw("")
    };

    let mut lines = vec![
        Line::from(Span::styled("─".repeat(width), Theme::border())),
        row("Subtotal", summary.subtotal.to_string()),
        promo_row,
        row(state.fulfillment.label(), fee),
        row("Tax", summary.tax.to_string()),
        row(total_label, summary.total.to_string()),
    ];
    if !summary.meets_minimum && state.fulfillment == FulfillmentMethod::Delivery {
        lines.push(Line::from(Span::styled(
            format!(" Add {} more for delivery", summary.short_by),
            Theme::warning(),
        )));
    } else if summary.is_estimate {
        lines.push(Line::from(Span::styled(
            " Market-priced items are quoted on the phone",
            Theme::dim(),
        )));
    } else {
        lines.push(Line::raw(""));
    }
    lines.push(Line::from(Span::styled(
        truncate(
            " +/- qty · d remove · x clear · g promo · p pickup/delivery · o call",
            width,
        ),
        Theme::dim(),
    )));
    frame.render_widget(Paragraph::new(lines), area);

    if editing_promo && area.height > 2 {
        let cursor_x = area.x + 12 + state.input.cursor_chars() as u16;
        frame.set_cursor_position((cursor_x.min(area.right().saturating_sub(1)), area.y + 2));
    }
}
