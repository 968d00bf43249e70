//! Central application state.
//!
//! Rendering reads `&AppState`; event handling mutates `&mut AppState`.
//! Scroll events fan out to both the scroll controller and the title
//! tracker, which never talk to each other directly.

use ratatui::layout::Rect;

use crate::config::AppConfig;
use crate::core::page::{section_after, section_before, PageNumber, Section};
use crate::core::source::{DocumentSource, PageSource};
use crate::core::view::Container;
use crate::ui::book::BookView;
use crate::ui::layout::AppLayout;

use super::scroller::{FetchOutcome, InfiniteScroller};
use super::title::{self, TitleTracker};

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Reading,
    JumpPrompt,
}

pub struct AppState<S: PageSource = DocumentSource> {
    pub scroller: InfiniteScroller<BookView, S>,
    pub titles: TitleTracker,
    /// Section start pages, for section jumps.
    pub sections: Vec<Section>,
    /// Highest page the title table knows about, if any.
    pub last_page: Option<PageNumber>,
    pub config: AppConfig,
    pub active_view: ActiveView,
    /// Digits typed into the jump prompt.
    pub jump_input: String,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    pub should_quit: bool,
    /// Frame counter driving the fetch spinner.
    pub tick: u64,
}

impl<S: PageSource> AppState<S> {
    pub fn new(
        scroller: InfiniteScroller<BookView, S>,
        titles: TitleTracker,
        sections: Vec<Section>,
        config: AppConfig,
        last_page: Option<PageNumber>,
    ) -> Self {
        Self {
            scroller,
            titles,
            sections,
            last_page,
            config,
            active_view: ActiveView::default(),
            jump_input: String::new(),
            status_message: None,
            should_quit: false,
            tick: 0,
        }
    }

    /// A raw scroll event of `rows` (negative = up).
    pub fn scroll_by(&mut self, rows: i64) {
        self.scroller.scroll_by(rows);
        self.titles.on_scroll();
    }

    /// A fetch settled.  A mount may shift what is in view, so the title
    /// tracker gets a scroll notification too.
    pub fn apply_fetch(&mut self, outcome: FetchOutcome) {
        if self.scroller.apply(outcome) {
            self.titles.on_scroll();
        }
    }

    /// Debounce token from the title tracker.
    pub fn settle_title(&mut self, token: u64) {
        self.titles.settle(token, self.scroller.container());
    }

    /// Rows moved by a page-up/page-down.
    pub fn page_rows(&self) -> i64 {
        i64::from(self.scroller.container().client_height().saturating_sub(1).max(1))
    }

    /// Terminal resized to `width` × `height`.
    pub fn resize(&mut self, width: u16, height: u16) {
        let layout = AppLayout::from_area(Rect::new(0, 0, width, height));
        self.scroller
            .set_viewport_height(u32::from(layout.book_area.height));
        self.titles.on_scroll();
    }

    /// Tear everything down and start reading at `page`.
    pub fn jump_to(&mut self, page: PageNumber) {
        self.titles.cancel_pending();
        self.scroller.jump_to(page);
        self.titles.show_page(page);
    }

    /// Open the book at `page`, clamped into the known page range.
    /// Returns the page actually opened.
    pub fn open_at(&mut self, page: PageNumber) -> PageNumber {
        let start = match self.last_page {
            Some(last) => page.clamp(1, last.max(1)),
            None => page.max(1),
        };
        if start != page {
            self.status_message = Some(format!("No page {page}; opened page {start}"));
        }
        self.jump_to(start);
        start
    }

    /// Whether `page` is a page the document has.
    pub fn is_valid_page(&self, page: PageNumber) -> bool {
        page >= 1 && self.last_page.map_or(true, |last| page <= last)
    }

    /// Page the reader is looking at.
    pub fn current_page(&self) -> Option<PageNumber> {
        title::first_page_in_view(self.scroller.container()).or(self.titles.page())
    }

    pub fn jump_to_section(&mut self, forward: bool) {
        let Some(current) = self.current_page() else {
            return;
        };
        let target = if forward {
            section_after(&self.sections, current)
        } else {
            section_before(&self.sections, current)
        };
        match target.cloned() {
            Some(section) => {
                self.jump_to(section.page);
                self.status_message = Some(format!("{} (page {})", section.name, section.page));
            }
            None => {
                self.status_message = Some(if forward {
                    "No later section".into()
                } else {
                    "No earlier section".into()
                });
            }
        }
    }

    pub fn toggle_annotations(&mut self) {
        let on = self.scroller.toggle_annotations();
        self.status_message = Some(format!(
            "Annotations {}",
            if on { "shown" } else { "hidden" }
        ));
    }
}
