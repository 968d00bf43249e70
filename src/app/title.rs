//! Viewport title tracker.
//!
//! Raw scroll events only (re)schedule a debounced recomputation.  When
//! the quiet window elapses the topmost page overlapping the viewport
//! decides the title.

use crate::core::page::{PageNumber, TitleTable};
use crate::core::view::{Container, NodeId};

use super::debounce::Debounce;

/// Any vertical overlap between the node and the visible window counts.
pub fn is_in_view(offset_top: u32, height: u32, scroll_top: u32, client_height: u32) -> bool {
    offset_top < scroll_top.saturating_add(client_height)
        && offset_top.saturating_add(height) > scroll_top
}

fn node_in_view(container: &dyn Container, node: NodeId) -> bool {
    match (container.offset_top(node), container.node_height(node)) {
        (Some(top), Some(height)) => is_in_view(
            top,
            height,
            container.scroll_top(),
            container.client_height(),
        ),
        _ => false,
    }
}

/// First mounted page (top to bottom) overlapping the viewport.
pub fn first_page_in_view(container: &dyn Container) -> Option<PageNumber> {
    container
        .children()
        .into_iter()
        .find(|&node| node_in_view(container, node))
        .and_then(|node| container.page_of(node))
}

pub struct TitleTracker {
    titles: TitleTable,
    debounce: Debounce,
    title: String,
    page: Option<PageNumber>,
    recomputations: u64,
}

impl TitleTracker {
    pub fn new(titles: TitleTable, debounce: Debounce) -> Self {
        Self {
            titles,
            debounce,
            title: String::new(),
            page: None,
            recomputations: 0,
        }
    }

    /// Raw scroll event: restart the quiet window.
    pub fn on_scroll(&mut self) {
        self.debounce.schedule();
    }

    /// A debounce token arrived.  Recomputes the title if the token is
    /// still current; returns whether it was.
    pub fn settle(&mut self, token: u64, container: &dyn Container) -> bool {
        if !self.debounce.is_current(token) {
            return false;
        }
        self.recomputations += 1;
        match first_page_in_view(container) {
            Some(page) => self.show_page(page),
            None => tracing::debug!(
                recomputations = self.recomputations,
                "title recompute: no page in view"
            ),
        }
        true
    }

    /// Show the title for `page` directly (page jumps).  Pages missing
    /// from the table are still tracked but keep the previous text.
    pub fn show_page(&mut self, page: PageNumber) {
        self.page = Some(page);
        match self.titles.title_for(page) {
            Some(title) => self.title = title,
            None => tracing::debug!(page, "no title entry"),
        }
    }

    /// Drop any pending recomputation (e.g. the content it would measure
    /// is being torn down).
    pub fn cancel_pending(&mut self) {
        self.debounce.cancel();
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Page whose title is showing.
    pub fn page(&self) -> Option<PageNumber> {
        self.page
    }

    #[cfg(test)]
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc;

    use super::*;
    use crate::core::page::{LineRecord, PageContent, TitleEntry};
    use crate::ui::book::BookView;

    fn page(lines: usize) -> PageContent {
        PageContent {
            lines: vec![LineRecord::default(); lines],
        }
    }

    /// Pages 1..=3, each 20 rows tall (19 lines + header).
    fn book() -> BookView {
        let mut view = BookView::new();
        view.set_client_height(10);
        for n in 1..=3 {
            let node = view.create_node(n);
            view.insert_after(node);
            view.render(node, &page(19), false);
        }
        view
    }

    fn titles() -> TitleTable {
        TitleTable::new(vec![
            TitleEntry::Single("one".into()),
            TitleEntry::Single("two".into()),
            TitleEntry::Single("three".into()),
        ])
    }

    #[test]
    fn overlap_counts_as_in_view() {
        // viewport rows [100, 150)
        assert!(is_in_view(90, 20, 100, 50)); // straddles top
        assert!(is_in_view(140, 20, 100, 50)); // straddles bottom
        assert!(is_in_view(110, 5, 100, 50)); // inside
        assert!(is_in_view(50, 200, 100, 50)); // covers
        assert!(!is_in_view(80, 20, 100, 50)); // ends exactly at top
        assert!(!is_in_view(150, 20, 100, 50)); // starts exactly at bottom
    }

    #[test]
    fn topmost_overlapping_page_wins() {
        let mut view = book();
        assert_eq!(first_page_in_view(&view), Some(1));
        view.set_scroll_top(15);
        assert_eq!(first_page_in_view(&view), Some(1));
        view.set_scroll_top(20);
        assert_eq!(first_page_in_view(&view), Some(2));
        view.set_scroll_top(45);
        assert_eq!(first_page_in_view(&view), Some(3));
    }

    #[test]
    fn empty_container_has_no_page_in_view() {
        let view = BookView::new();
        assert_eq!(first_page_in_view(&view), None);
    }

    #[tokio::test(start_paused = true)]
    async fn scroll_burst_recomputes_once_with_latest_viewport() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tracker = TitleTracker::new(titles(), Debounce::new(Duration::from_millis(100), tx));
        let mut view = book();

        view.set_scroll_top(5);
        tracker.on_scroll();
        tokio::time::advance(Duration::from_millis(30)).await;
        view.set_scroll_top(25);
        tracker.on_scroll();

        tokio::time::advance(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;
        while let Ok(token) = rx.try_recv() {
            tracker.settle(token, &view);
        }

        assert_eq!(tracker.recomputations(), 1);
        assert_eq!(tracker.title(), "two");
        assert_eq!(tracker.page(), Some(2));
    }

    #[test]
    fn stale_token_is_ignored() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut tracker = TitleTracker::new(titles(), Debounce::new(Duration::from_millis(100), tx));
        let view = book();
        assert!(!tracker.settle(999, &view));
        assert_eq!(tracker.recomputations(), 0);
        assert_eq!(tracker.title(), "");
    }

    #[test]
    fn show_page_outside_table_keeps_title() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut tracker = TitleTracker::new(titles(), Debounce::new(Duration::from_millis(100), tx));
        tracker.show_page(3);
        tracker.show_page(40);
        assert_eq!(tracker.title(), "three");
        assert_eq!(tracker.page(), Some(40));
    }
}
