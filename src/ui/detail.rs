use crate::app::state::{AppState, InputMode, SwipeTarget};
use crate::catalog::model::Availability;
use crate::input::SwipeDirection;
use crate::ui::layout::centered;
use crate::ui::theme::Theme;
use crate::ui::truncate;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Item detail popup. Keeps drawing, dimmed, while the view is closing so
/// the content does not vanish mid-transition.
pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(item) = state.inspected_menu_item() else {
        return;
    };
    let closing = !state.session.is_detail_open();

    let mut popup = centered(area, 60, 70, 44, 16);
    // A downward drag pulls the sheet along
    if state.swipe_target() == SwipeTarget::Detail {
        if let Some((SwipeDirection::Down, distance)) = state.swipe_offset {
            let rows = (distance / state.config.gestures.cell_height) as u16;
            let room = area.bottom().saturating_sub(popup.bottom());
            popup.y += rows.min(room);
        }
    }

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .title(format!(" {} ", item.name))
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_type(Theme::border_type())
        .border_style(if closing {
            Theme::border()
        } else {
            Theme::border_focused()
        })
        .style(Style::default().bg(Theme::BG_SURFACE));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let width = inner.width as usize;
    let mut lines: Vec<Line> = Vec::new();

    let mut badges = vec![Span::styled(format!("★ {:.1}", item.rating), Theme::rating())];
    if item.is_vegetarian {
        badges.push(Span::styled("  vegetarian", Theme::vegetarian()));
    }
    if item.is_spicy {
        badges.push(Span::styled("  spicy", Theme::spicy()));
    }
    let availability = match item.availability {
        Availability::Fresh => "fresh",
        Availability::Frozen => "frozen",
        Availability::Both => "fresh or frozen",
    };
    badges.push(Span::styled(format!("  {}", availability), Theme::dim()));
    lines.push(Line::from(badges));
    lines.push(Line::from(Span::styled(
        truncate(&item.description, width),
        Theme::text(),
    )));
    if let Some(ref includes) = item.includes {
        lines.push(Line::from(Span::styled(
            truncate(&format!("Includes: {}", includes.join(", ")), width),
            Theme::dim(),
        )));
    }
    lines.push(Line::raw(""));

    for (i, variant) in item.variants.iter().enumerate() {
        let chosen = i == state.draft.variant_index;
        let pieces = variant
            .pieces
            .map(|p| format!(" ({} pcs)", p))
            .unwrap_or_default();
        let style = if chosen { Theme::selected() } else { Theme::text() };
        lines.push(Line::from(vec![
            Span::styled(if chosen { " ● " } else { " ○ " }, style),
            Span::styled(format!("{}{}", variant.size, pieces), style),
            Span::raw("  "),
            Span::styled(
                variant.price.to_string(),
                if variant.price.is_market() {
                    Theme::market_price()
                } else {
                    Theme::price()
                },
            ),
        ]));
    }
    lines.push(Line::raw(""));

    let line_total = item
        .variants
        .get(state.draft.variant_index)
        .map(|v| {
            if v.price.is_market() {
                "Market Price".to_string()
            } else {
                v.price.extended(state.draft.quantity).to_string()
            }
        })
        .unwrap_or_default();
    lines.push(Line::from(vec![
        Span::styled(" Qty ", Theme::dim()),
        Span::styled(format!("- {} +", state.draft.quantity), Theme::title()),
        Span::styled(format!("   {}", line_total), Theme::price()),
    ]));

    let editing_note = state.input_mode == InputMode::Note;
    let note_text = if editing_note {
        state.input.text.clone()
    } else {
        state.draft.note.clone().unwrap_or_default()
    };
    let note_row = lines.len() as u16;
    lines.push(Line::from(vec![
        Span::styled(" Note ", Theme::dim()),
        Span::styled(
            if note_text.is_empty() && !editing_note {
                "(none)".to_string()
            } else {
                truncate(&note_text, width.saturating_sub(7))
            },
            Theme::note(),
        ),
    ]));

    let hint = if editing_note {
        " Enter save · Esc cancel"
    } else {
        " ←/→ size · +/- qty · n note · a add · Esc close"
    };
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(hint, Theme::dim())));

    let mut paragraph = Paragraph::new(lines);
    if closing {
        paragraph = paragraph.style(Theme::dim());
    }
    frame.render_widget(paragraph, inner);

    if editing_note && note_row < inner.height {
        let cursor_x = inner.x + 6 + state.input.cursor_chars() as u16;
        frame.set_cursor_position((cursor_x.min(inner.right().saturating_sub(1)), inner.y + note_row));
    }
}
