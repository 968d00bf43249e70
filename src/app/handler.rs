//! Input handling — maps key/mouse events to state mutations.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::config::Action;
use crate::core::source::PageSource;

use super::state::{ActiveView, AppState};

/// Longest page number the jump prompt accepts.
const MAX_JUMP_DIGITS: usize = 6;

/// Process a key event, dispatching based on the active view.
pub fn handle_key<S: PageSource>(state: &mut AppState<S>, key: KeyEvent) {
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match state.active_view {
        ActiveView::Reading => handle_reading_key(state, key),
        ActiveView::JumpPrompt => handle_prompt_key(state, key),
    }
}

fn handle_reading_key<S: PageSource>(state: &mut AppState<S>, key: KeyEvent) {
    let Some(action) = state.config.match_key(key) else {
        return;
    };
    state.status_message = None;
    let step = i64::from(state.config.scroll_step);

    match action {
        Action::ScrollUp => state.scroll_by(-step),
        Action::ScrollDown => state.scroll_by(step),
        Action::PageUp => state.scroll_by(-state.page_rows()),
        Action::PageDown => state.scroll_by(state.page_rows()),
        Action::ToggleAnnotations => state.toggle_annotations(),
        Action::JumpToPage => {
            state.jump_input.clear();
            state.active_view = ActiveView::JumpPrompt;
        }
        Action::NextSection => state.jump_to_section(true),
        Action::PreviousSection => state.jump_to_section(false),
        Action::Quit => state.should_quit = true,
    }
}

fn handle_prompt_key<S: PageSource>(state: &mut AppState<S>, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            state.jump_input.clear();
            state.active_view = ActiveView::Reading;
        }
        KeyCode::Backspace => {
            state.jump_input.pop();
        }
        KeyCode::Char(c) if c.is_ascii_digit() && state.jump_input.len() < MAX_JUMP_DIGITS => {
            state.jump_input.push(c);
        }
        KeyCode::Enter => {
            let input = std::mem::take(&mut state.jump_input);
            state.active_view = ActiveView::Reading;
            match input.parse::<i64>() {
                Ok(page) if state.is_valid_page(page) => {
                    state.jump_to(page);
                    state.status_message = Some(format!("Page {page}"));
                }
                _ => {
                    state.status_message = Some(format!("No page {input:?}"));
                }
            }
        }
        _ => {}
    }
}

/// Mouse wheel scrolls the book; everything else is ignored.
pub fn handle_mouse<S: PageSource>(state: &mut AppState<S>, mouse: MouseEvent) {
    if state.active_view != ActiveView::Reading {
        return;
    }
    let step = i64::from(state.config.scroll_step);
    match mouse.kind {
        MouseEventKind::ScrollUp => state.scroll_by(-step),
        MouseEventKind::ScrollDown => state.scroll_by(step),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::scroller::{Edge, FetchOutcome};
    use crate::app::state::testing::reader_state as state;
    use crate::core::page::{FetchedPage, LineRecord, PageContent};
    use crate::core::source::testing::MemorySource;
    use crate::core::view::Container;

    fn press(state: &mut AppState<MemorySource>, code: KeyCode) {
        handle_key(state, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn wheel(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[tokio::test]
    async fn jump_prompt_resets_and_sets_title() {
        let mut state = state(MemorySource::default());
        press(&mut state, KeyCode::Char('g'));
        assert_eq!(state.active_view, ActiveView::JumpPrompt);
        for c in ['1', 'x', '2'] {
            press(&mut state, KeyCode::Char(c));
        }
        assert_eq!(state.jump_input, "12");
        press(&mut state, KeyCode::Enter);

        assert_eq!(state.active_view, ActiveView::Reading);
        assert_eq!(state.titles.title(), "title 12");
        assert_eq!(state.scroller.generation(), 1);
        assert!(state.scroller.cache().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_jump_is_rejected() {
        let mut state = state(MemorySource::default());
        press(&mut state, KeyCode::Char('g'));
        press(&mut state, KeyCode::Char('9'));
        press(&mut state, KeyCode::Char('9'));
        press(&mut state, KeyCode::Enter);
        assert_eq!(state.scroller.generation(), 0);
        assert!(state.status_message.unwrap().contains("99"));
    }

    #[test]
    fn escape_leaves_prompt_untouched() {
        let mut state = state(MemorySource::default());
        press(&mut state, KeyCode::Char('g'));
        press(&mut state, KeyCode::Char('4'));
        press(&mut state, KeyCode::Esc);
        assert_eq!(state.active_view, ActiveView::Reading);
        assert!(state.jump_input.is_empty());
        assert_eq!(state.scroller.generation(), 0);
    }

    #[tokio::test]
    async fn next_section_jumps_from_current_page() {
        let mut state = state(MemorySource::default());
        state.jump_to(3);
        press(&mut state, KeyCode::Tab);
        assert_eq!(state.titles.page(), Some(10));
        assert_eq!(state.titles.title(), "title 10");

        press(&mut state, KeyCode::Tab);
        assert_eq!(state.titles.page(), Some(10));
        assert_eq!(state.status_message.as_deref(), Some("No later section"));
    }

    #[tokio::test]
    async fn annotation_key_flips_flag() {
        let mut state = state(MemorySource::default());
        assert!(!state.scroller.annotated());
        press(&mut state, KeyCode::Char('a'));
        assert!(state.scroller.annotated());
        press(&mut state, KeyCode::Char('a'));
        assert!(!state.scroller.annotated());
    }

    #[tokio::test]
    async fn wheel_scrolls_by_configured_step() {
        let mut state = state(MemorySource::default());
        state.scroller.set_viewport_height(5);
        let generation = state.scroller.generation();
        state.apply_fetch(FetchOutcome {
            edge: Edge::Next,
            generation,
            page: Some(FetchedPage {
                key: 1,
                content: PageContent {
                    lines: vec![LineRecord::default(); 40],
                },
            }),
        });
        assert_eq!(state.scroller.container().scroll_top(), 0);

        let step = state.config.scroll_step;
        handle_mouse(&mut state, wheel(MouseEventKind::ScrollDown));
        assert_eq!(state.scroller.container().scroll_top(), step);
        handle_mouse(&mut state, wheel(MouseEventKind::ScrollDown));
        assert_eq!(state.scroller.container().scroll_top(), 2 * step);
        handle_mouse(&mut state, wheel(MouseEventKind::ScrollUp));
        assert_eq!(state.scroller.container().scroll_top(), step);

        // The prompt swallows the wheel.
        state.active_view = ActiveView::JumpPrompt;
        handle_mouse(&mut state, wheel(MouseEventKind::ScrollDown));
        assert_eq!(state.scroller.container().scroll_top(), step);
    }

    #[test]
    fn ctrl_c_quits_from_prompt() {
        let mut state = state(MemorySource::default());
        state.active_view = ActiveView::JumpPrompt;
        handle_key(
            &mut state,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(state.should_quit);
    }
}
