//! UI / rendering layer — everything that touches Ratatui widgets.
//!
//! `book` is the terminal-side page container; the rest are widgets and
//! styling around it.  No page fetching happens here.

pub mod book;
pub mod layout;
pub mod markup;
pub mod popup;
pub mod spinner;
pub mod theme;
