//! Centered modal boxes drawn over the main screen.

use ratatui::{
    Frame,
    layout::Rect,
    text::Line,
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// A `width` × `height` rect centered in `area`, clamped to fit with a margin.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

pub fn render_overlay(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    lines: Vec<Line<'_>>,
    theme: &Theme,
) {
    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(2);
    let popup = centered_rect(64, height, area);

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .title(format!(" {title} "))
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border(true))
        .style(theme.overlay());

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        popup,
    );
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn centers_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(centered_rect(60, 10, area), Rect::new(20, 15, 60, 10));
    }

    #[test]
    fn clamps_to_small_terminals() {
        let area = Rect::new(0, 0, 30, 8);
        let popup = centered_rect(60, 20, area);
        assert_eq!(popup.width, 26);
        assert_eq!(popup.height, 6);
        assert!(popup.right() <= area.right());
        assert!(popup.bottom() <= area.bottom());
    }
}
