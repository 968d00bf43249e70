//! Fetch indicator — a small spinner + label for the status bar while
//! either edge has a page fetch in flight.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Braille-dot spinner frames.  Cycles through these on each tick.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Right-aligned in `area`; invisible when `visible` is false.
pub struct FetchIndicator {
    pub visible: bool,
    /// Monotonically increasing tick counter (drives the spinner frame).
    pub tick: u64,
}

impl FetchIndicator {
    fn label(&self) -> String {
        let frame = SPINNER_FRAMES[(self.tick as usize) % SPINNER_FRAMES.len()];
        format!(" {frame} loading ")
    }
}

impl Widget for FetchIndicator {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.visible || area.width < 12 || area.height == 0 {
            return;
        }

        let label = self.label();
        let label_width = label.chars().count() as u16;
        let x = area.x + area.width.saturating_sub(label_width);

        let line = Line::from(Span::styled(
            label,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));

        buf.set_line(x, area.y, &line, label_width);
    }
}
