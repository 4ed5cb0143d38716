use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Rows taken by everything except the catalog list.
pub const CHROME_ROWS: u16 = 5;

pub struct AppLayout {
    pub header: Option<Rect>,
    pub tabs: Rect,
    pub list: Rect,
    pub status_bar: Rect,
}

pub fn compute_layout(area: Rect, show_header: bool) -> AppLayout {
    let header_height = if show_header { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header_height), // Store header
            Constraint::Length(1),             // Filter tabs
            Constraint::Min(3),                // Catalog list
            Constraint::Length(1),             // Status bar
        ])
        .split(area);

    AppLayout {
        header: show_header.then_some(chunks[0]),
        tabs: chunks[1],
        list: chunks[2],
        status_bar: chunks[3],
    }
}

/// Centered popup, as a percentage of `area` with a minimum size.
pub fn centered(area: Rect, width_pct: u16, height_pct: u16, min_w: u16, min_h: u16) -> Rect {
    let popup_w = (area.width * width_pct / 100)
        .max(min_w)
        .min(area.width.saturating_sub(4));
    let popup_h = (area.height * height_pct / 100)
        .max(min_h)
        .min(area.height.saturating_sub(2));
    let popup_x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    Rect::new(popup_x, popup_y, popup_w, popup_h)
}

/// Full-height panel docked to the right edge.
pub fn right_panel(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect::new(area.right() - width, area.y, width, area.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_collapses() {
        let area = Rect::new(0, 0, 80, 24);
        let shown = compute_layout(area, true);
        let hidden = compute_layout(area, false);
        assert_eq!(shown.header.map(|r| r.height), Some(3));
        assert!(hidden.header.is_none());
        assert_eq!(hidden.list.height, shown.list.height + 3);
        assert_eq!(shown.list.height, area.height - CHROME_ROWS);
    }

    #[test]
    fn test_popups_stay_inside() {
        let area = Rect::new(0, 0, 50, 12);
        let popup = centered(area, 70, 80, 60, 20);
        assert!(popup.width <= area.width && popup.height <= area.height);
        let panel = right_panel(area, 120);
        assert_eq!(panel, area);
    }
}
