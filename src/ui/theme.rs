//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

/// Central theme — change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    // ── page text ──────────────────────────────────────────────
    pub fn text_style() -> Style {
        Style::default().fg(Color::White)
    }

    /// Lines that open a new paragraph.
    pub fn petucha_style() -> Style {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    pub fn indicator_style() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn page_header_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }

    pub fn prompt_style() -> Style {
        Style::default().fg(Color::Yellow)
    }
}
