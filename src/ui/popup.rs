//! Popup overlay for the go-to-page prompt.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::core::page::PageNumber;

use super::theme::Theme;

/// Page-number prompt shown over the book.
pub struct JumpPrompt<'a> {
    pub input: &'a str,
    /// Highest valid page, when known.
    pub last_page: Option<PageNumber>,
}

impl JumpPrompt<'_> {
    fn range_hint(&self) -> String {
        match self.last_page {
            Some(last) => format!("  Pages 1–{last}"),
            None => "  Page number".to_string(),
        }
    }
}

impl Widget for JumpPrompt<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup = centered_fixed(32, 7, area);
        Clear.render(popup, buf);

        let block = Block::default()
            .title(" Go to page ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(popup);
        block.render(popup, buf);

        let dim = Style::default().fg(Color::DarkGray);
        let lines = vec![
            Line::from(Span::styled(self.range_hint(), dim)),
            Line::raw(""),
            Line::from(vec![
                Span::styled("  › ", Theme::prompt_style()),
                Span::styled(self.input.to_string(), Theme::prompt_style()),
                Span::styled("▏", Theme::prompt_style().add_modifier(Modifier::SLOW_BLINK)),
            ]),
            Line::raw(""),
            Line::from(Span::styled("  Enter: go  Esc: cancel", dim)),
        ];

        Paragraph::new(lines).render(inner, buf);
    }
}

/// Create a centered rectangle with fixed dimensions, clamped to the available area.
fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popup_is_clamped_to_small_terminals() {
        let area = Rect::new(0, 0, 20, 4);
        assert_eq!(centered_fixed(32, 7, area), Rect::new(0, 0, 20, 4));
        assert_eq!(
            centered_fixed(10, 2, Rect::new(5, 5, 30, 10)),
            Rect::new(15, 9, 10, 2)
        );
    }

    #[test]
    fn prompt_shows_typed_digits() {
        let area = Rect::new(0, 0, 40, 9);
        let mut buf = Buffer::empty(area);
        JumpPrompt {
            input: "245",
            last_page: Some(245),
        }
        .render(area, &mut buf);

        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("245"));
        assert!(text.contains("Go to page"));
    }
}
