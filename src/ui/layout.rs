//! Layout helpers — split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Title bar on top, the book in the middle, status bar at the bottom.
pub struct AppLayout {
    pub title_area: Rect,
    pub book_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // title bar
                Constraint::Min(1),    // book (takes all remaining space)
                Constraint::Length(1), // status bar
            ])
            .split(area);

        Self {
            title_area: chunks[0],
            book_area: chunks[1],
            status_area: chunks[2],
        }
    }
}
