use crate::session::notify::Severity;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

pub struct Theme;

impl Theme {
    pub const ACCENT: Color = Color::Rgb(220, 60, 50);
    pub const GOLD: Color = Color::Rgb(235, 180, 60);
    pub const BG_SURFACE: Color = Color::Rgb(28, 28, 32);

    pub fn border() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(Self::ACCENT)
    }

    pub fn border_type() -> BorderType {
        BorderType::Rounded
    }

    pub fn title() -> Style {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    }

    pub fn text() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn dim() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn note() -> Style {
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn selected() -> Style {
        Style::default()
            .fg(Color::White)
            .bg(Color::Rgb(60, 30, 30))
            .add_modifier(Modifier::BOLD)
    }

    pub fn price() -> Style {
        Style::default().fg(Self::GOLD)
    }

    pub fn market_price() -> Style {
        Style::default()
            .fg(Self::GOLD)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn rating() -> Style {
        Style::default().fg(Color::Yellow)
    }

    pub fn vegetarian() -> Style {
        Style::default().fg(Color::Green)
    }

    pub fn spicy() -> Style {
        Style::default().fg(Color::Red)
    }

    pub fn tab_active() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_inactive() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn delete_armed() -> Style {
        Style::default().fg(Color::White).bg(Color::Red)
    }

    pub fn warning() -> Style {
        Style::default().fg(Color::Yellow)
    }

    pub fn severity(severity: Severity) -> Style {
        match severity {
            Severity::Success => Style::default().fg(Color::Green),
            Severity::Error => Style::default().fg(Color::Red),
            Severity::Info => Style::default().fg(Color::Cyan),
        }
    }

    pub fn status_bar() -> Style {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    }

    pub fn status_mode() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Self::GOLD)
            .add_modifier(Modifier::BOLD)
    }
}
