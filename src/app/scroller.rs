//! Bidirectional infinite scroll controller.
//!
//! Each edge (previous / next) gates its fetch → insert pipeline through
//! an `Idle` / `Fetching` state so at most one fetch per edge is ever in
//! flight.  Fetches run as tokio tasks and report back over a channel as
//! [`FetchOutcome`]s tagged with the generation they were issued under;
//! a reset bumps the generation, so late results from before a jump are
//! dropped instead of landing in the new container.
//!
//! Pages inserted above the viewport shift the scroll offset by their
//! own height so the rows on screen stay put.

use tokio::sync::mpsc;

use crate::core::cache::PageCache;
use crate::core::page::{FetchedPage, PageNumber};
use crate::core::sequence::PageSequence;
use crate::core::source::{self, PageSource};
use crate::core::view::{Container, NodeId};

// ───────────────────────────────────────── edges ─────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Previous,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeState {
    #[default]
    Idle,
    Fetching,
}

/// Per-edge fetch/render behaviour handed to the controller.
pub trait EdgeStrategy: Send {
    /// Advance this edge's cursor and return the page to request.
    fn fetch(&self, sequence: &mut PageSequence) -> PageNumber;

    /// Mount a fetched page at this edge and record it in the cache.
    fn render(
        &self,
        container: &mut dyn Container,
        cache: &mut PageCache,
        page: FetchedPage,
        annotated: bool,
    ) -> NodeId;
}

fn mount(
    container: &mut dyn Container,
    cache: &mut PageCache,
    page: FetchedPage,
    annotated: bool,
    insert: fn(&mut dyn Container, NodeId),
) -> NodeId {
    let node = container.create_node(page.key);
    insert(&mut *container, node);
    container.render(node, &page.content, annotated);
    cache.put(page.key, node, page.content);
    node
}

/// Walks toward earlier pages; mounts above the first child.
pub struct PreviousEdge;

impl EdgeStrategy for PreviousEdge {
    fn fetch(&self, sequence: &mut PageSequence) -> PageNumber {
        sequence.previous()
    }

    fn render(
        &self,
        container: &mut dyn Container,
        cache: &mut PageCache,
        page: FetchedPage,
        annotated: bool,
    ) -> NodeId {
        mount(container, cache, page, annotated, |c, node| c.insert_before(node))
    }
}

/// Walks toward later pages; mounts below the last child.
pub struct NextEdge;

impl EdgeStrategy for NextEdge {
    fn fetch(&self, sequence: &mut PageSequence) -> PageNumber {
        sequence.next()
    }

    fn render(
        &self,
        container: &mut dyn Container,
        cache: &mut PageCache,
        page: FetchedPage,
        annotated: bool,
    ) -> NodeId {
        mount(container, cache, page, annotated, |c, node| c.insert_after(node))
    }
}

pub struct EdgeStrategies {
    pub previous: Box<dyn EdgeStrategy>,
    pub next: Box<dyn EdgeStrategy>,
}

impl EdgeStrategies {
    pub fn standard() -> Self {
        Self {
            previous: Box::new(PreviousEdge),
            next: Box::new(NextEdge),
        }
    }
}

/// Result of one edge fetch, delivered back to the controller.
#[derive(Debug)]
pub struct FetchOutcome {
    pub edge: Edge,
    pub generation: u64,
    /// `None` is the sentinel: out of range or failed.
    pub page: Option<FetchedPage>,
}

// ───────────────────────────────────────── controller ────────

#[derive(Debug, Clone, Copy)]
pub struct ScrollOptions {
    /// Distance in rows from an edge that counts as "near" it.
    pub threshold: u32,
    pub annotated: bool,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            threshold: 8,
            annotated: false,
        }
    }
}

pub struct InfiniteScroller<C: Container, S: PageSource> {
    container: C,
    source: S,
    cache: PageCache,
    sequence: PageSequence,
    strategies: EdgeStrategies,
    previous_state: EdgeState,
    next_state: EdgeState,
    /// Bumped on every reset; outcomes from older generations are stale.
    generation: u64,
    annotated: bool,
    threshold: u32,
    outcomes: mpsc::UnboundedSender<FetchOutcome>,
}

impl<C: Container, S: PageSource> InfiniteScroller<C, S> {
    pub fn new(
        container: C,
        source: S,
        strategies: EdgeStrategies,
        outcomes: mpsc::UnboundedSender<FetchOutcome>,
        options: ScrollOptions,
    ) -> Self {
        Self {
            container,
            source,
            cache: PageCache::new(),
            sequence: PageSequence::new(1),
            strategies,
            previous_state: EdgeState::Idle,
            next_state: EdgeState::Idle,
            generation: 0,
            annotated: options.annotated,
            threshold: options.threshold,
            outcomes,
        }
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    #[cfg(test)]
    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[cfg(test)]
    pub fn annotated(&self) -> bool {
        self.annotated
    }

    #[cfg(test)]
    pub fn edge_state(&self, edge: Edge) -> EdgeState {
        match edge {
            Edge::Previous => self.previous_state,
            Edge::Next => self.next_state,
        }
    }

    pub fn is_fetching(&self) -> bool {
        self.previous_state == EdgeState::Fetching || self.next_state == EdgeState::Fetching
    }

    fn state_mut(&mut self, edge: Edge) -> &mut EdgeState {
        match edge {
            Edge::Previous => &mut self.previous_state,
            Edge::Next => &mut self.next_state,
        }
    }

    // ── scrolling ──────────────────────────────────────────────

    /// Nothing is above an empty container: the seed page has to land
    /// first or a previous page would take its place at the top.
    fn near_top(&self) -> bool {
        !self.cache.is_empty() && self.container.scroll_top() <= self.threshold
    }

    fn near_bottom(&self) -> bool {
        let bottom = self.container.scroll_top() + self.container.client_height();
        bottom + self.threshold >= self.container.scroll_height()
    }

    /// Threshold check for a scroll event.  Starts a fetch on every edge
    /// that is near and idle.
    pub fn on_scroll(&mut self) {
        if self.near_top() && self.previous_state == EdgeState::Idle {
            self.request(Edge::Previous);
        }
        if self.near_bottom() && self.next_state == EdgeState::Idle {
            self.request(Edge::Next);
        }
    }

    /// Move the viewport by `delta` rows and run the threshold check.
    pub fn scroll_by(&mut self, delta: i64) {
        let top = i64::from(self.container.scroll_top()).saturating_add(delta);
        self.scroll_to(top.clamp(0, i64::from(u32::MAX)) as u32);
    }

    pub fn scroll_to(&mut self, top: u32) {
        self.container.set_scroll_top(top);
        self.on_scroll();
    }

    /// Viewport resized; may reveal an edge.
    pub fn set_viewport_height(&mut self, height: u32) {
        if height != self.container.client_height() {
            self.container.set_client_height(height);
            self.on_scroll();
        }
    }

    // ── fetch pipeline ─────────────────────────────────────────

    fn request(&mut self, edge: Edge) {
        *self.state_mut(edge) = EdgeState::Fetching;
        let strategy = match edge {
            Edge::Previous => self.strategies.previous.as_ref(),
            Edge::Next => self.strategies.next.as_ref(),
        };
        let page = strategy.fetch(&mut self.sequence);
        let generation = self.generation;
        tracing::debug!(?edge, page, generation, "fetch issued");

        let source = self.source.clone();
        let tx = self.outcomes.clone();
        tokio::spawn(async move {
            let page = source::fetch_page(&source, page).await;
            let _ = tx.send(FetchOutcome {
                edge,
                generation,
                page,
            });
        });
    }

    /// Apply a settled fetch.  Returns `true` when a page was mounted.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        let FetchOutcome {
            edge,
            generation,
            page,
        } = outcome;
        if generation != self.generation {
            tracing::debug!(?edge, generation, current = self.generation, "stale fetch discarded");
            return false;
        }
        *self.state_mut(edge) = EdgeState::Idle;

        let Some(page) = page else {
            tracing::debug!(?edge, "edge exhausted for now");
            return false;
        };
        if self.cache.contains(page.key) {
            tracing::debug!(?edge, page = page.key, "page already mounted");
            return false;
        }

        let key = page.key;
        let anchor = self.container.scroll_top();
        let strategy = match edge {
            Edge::Previous => self.strategies.previous.as_ref(),
            Edge::Next => self.strategies.next.as_ref(),
        };
        let node = strategy.render(&mut self.container, &mut self.cache, page, self.annotated);
        if edge == Edge::Previous {
            let height = self.container.node_height(node).unwrap_or(0);
            self.container.set_scroll_top(anchor + height);
        }
        tracing::debug!(?edge, page = key, mounted = self.cache.len(), "page mounted");

        // Keep filling while the viewport still reaches an edge.
        self.on_scroll();
        true
    }

    // ── reset / jump ───────────────────────────────────────────

    /// Clear the cache and tear down every node in one step.  In-flight
    /// fetches become stale.
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.cache.clear_all();
        self.container.remove_all();
        self.previous_state = EdgeState::Idle;
        self.next_state = EdgeState::Idle;
    }

    /// Reset, re-seed at `page`, and fetch it through the next edge.
    pub fn jump_to(&mut self, page: PageNumber) {
        self.reset();
        self.sequence = PageSequence::new(page);
        self.request(Edge::Next);
    }

    // ── annotations ────────────────────────────────────────────

    /// Re-render every mounted page if the flag changed.
    pub fn set_annotated(&mut self, annotated: bool) {
        if annotated == self.annotated {
            return;
        }
        self.annotated = annotated;
        for (_, entry) in self.cache.iter() {
            self.container.render(entry.node, &entry.content, annotated);
        }
    }

    pub fn toggle_annotations(&mut self) -> bool {
        self.set_annotated(!self.annotated);
        self.annotated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::title::first_page_in_view;
    use crate::core::page::{LineRecord, PageContent};
    use crate::core::source::testing::MemorySource;
    use crate::ui::book::BookView;

    type Scroller = InfiniteScroller<BookView, MemorySource>;

    fn scroller(
        source: MemorySource,
        client_height: u32,
    ) -> (Scroller, mpsc::UnboundedReceiver<FetchOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut view = BookView::new();
        view.set_client_height(client_height);
        let scroller = InfiniteScroller::new(
            view,
            source,
            EdgeStrategies::standard(),
            tx,
            ScrollOptions::default(),
        );
        (scroller, rx)
    }

    fn fetched(key: PageNumber, lines: usize) -> FetchedPage {
        FetchedPage {
            key,
            content: PageContent {
                lines: (0..lines)
                    .map(|i| LineRecord {
                        text: vec![vec![format!("{key}:{i}")]],
                        verses: vec![format!("{key}:{i}")],
                        ..LineRecord::default()
                    })
                    .collect(),
            },
        }
    }

    async fn settle_tasks() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn one_fetch_in_flight_per_edge() {
        let source = MemorySource::gated();
        for n in 3..=5 {
            source.insert_page(n, 30);
        }
        let (mut scroller, mut rx) = scroller(source.clone(), 10);

        scroller.jump_to(5);
        scroller.on_scroll();
        scroller.on_scroll();
        settle_tasks().await;
        assert_eq!(source.requests(), vec!["pages/5.json"]);
        assert_eq!(scroller.edge_state(Edge::Next), EdgeState::Fetching);

        source.release(1);
        assert!(scroller.apply(rx.recv().await.unwrap()));
        // The fill check after mounting asks for the page above.
        assert_eq!(scroller.edge_state(Edge::Previous), EdgeState::Fetching);

        scroller.on_scroll();
        scroller.scroll_by(1);
        scroller.scroll_by(-1);
        settle_tasks().await;
        let above = source
            .requests()
            .iter()
            .filter(|path| *path == "pages/4.json")
            .count();
        assert_eq!(above, 1);

        source.release(1);
        let previous = rx.recv().await.unwrap();
        assert_eq!(previous.edge, Edge::Previous);
        assert!(scroller.apply(previous));
        assert_eq!(scroller.edge_state(Edge::Previous), EdgeState::Idle);

        // Back at the top edge: eligible again.
        scroller.scroll_by(-1000);
        settle_tasks().await;
        assert_eq!(scroller.edge_state(Edge::Previous), EdgeState::Fetching);
        assert!(source.requests().contains(&"pages/3.json".to_string()));
    }

    #[tokio::test]
    async fn start_page_lands_before_anything_above_it() {
        let source = MemorySource::gated();
        source.insert_page(4, 60);
        source.insert_page(5, 60);
        let (mut scroller, mut rx) = scroller(source.clone(), 0);

        scroller.jump_to(5);
        scroller.set_viewport_height(40);
        scroller.on_scroll();
        settle_tasks().await;
        assert_eq!(source.requests(), vec!["pages/5.json"]);
        assert_eq!(scroller.edge_state(Edge::Previous), EdgeState::Idle);

        source.release(1);
        assert!(scroller.apply(rx.recv().await.unwrap()));
        assert_eq!(first_page_in_view(scroller.container()), Some(5));

        source.release(1);
        let previous = rx.recv().await.unwrap();
        assert_eq!(previous.edge, Edge::Previous);
        assert!(scroller.apply(previous));
        assert_eq!(scroller.cache().pages(), vec![4, 5]);
        assert_eq!(scroller.container().scroll_top(), 61);
        assert_eq!(first_page_in_view(scroller.container()), Some(5));
    }

    #[tokio::test]
    async fn prepending_keeps_visible_rows_in_place() {
        let (mut scroller, _rx) = scroller(MemorySource::default(), 50);
        let generation = scroller.generation();

        // 999 lines + header = 1000 rows.
        scroller.apply(FetchOutcome {
            edge: Edge::Next,
            generation,
            page: Some(fetched(10, 999)),
        });
        scroller.scroll_to(500);
        assert_eq!(scroller.container().scroll_top(), 500);

        // 299 lines + header = 300 rows.
        assert!(scroller.apply(FetchOutcome {
            edge: Edge::Previous,
            generation,
            page: Some(fetched(9, 299)),
        }));
        assert_eq!(scroller.container().scroll_top(), 800);
        assert_eq!(scroller.cache().pages(), vec![9, 10]);
        let first = scroller.container().children()[0];
        assert_eq!(scroller.container().page_of(first), Some(9));
    }

    #[tokio::test]
    async fn appending_does_not_move_the_viewport() {
        let (mut scroller, _rx) = scroller(MemorySource::default(), 50);
        let generation = scroller.generation();
        scroller.apply(FetchOutcome {
            edge: Edge::Next,
            generation,
            page: Some(fetched(1, 199)),
        });
        scroller.scroll_to(120);
        scroller.apply(FetchOutcome {
            edge: Edge::Next,
            generation,
            page: Some(fetched(2, 199)),
        });
        assert_eq!(scroller.container().scroll_top(), 120);
        let last = *scroller.container().children().last().unwrap();
        assert_eq!(scroller.container().page_of(last), Some(2));
    }

    #[tokio::test]
    async fn empty_result_mounts_nothing_and_edge_stays_eligible() {
        let source = MemorySource::default();
        source.insert_page(1, 5);
        let (mut scroller, mut rx) = scroller(source, 10);

        scroller.jump_to(1);
        let first = rx.recv().await.unwrap();
        assert!(scroller.apply(first));

        // The fill check asked for page 0 (previous) and page 2 (next);
        // neither exists.
        for _ in 0..2 {
            let outcome = rx.recv().await.unwrap();
            assert!(outcome.page.is_none());
            assert!(!scroller.apply(outcome));
        }
        assert_eq!(scroller.cache().pages(), vec![1]);
        assert_eq!(scroller.container().children().len(), 1);
        assert_eq!(scroller.edge_state(Edge::Previous), EdgeState::Idle);
        assert_eq!(scroller.edge_state(Edge::Next), EdgeState::Idle);

        scroller.on_scroll();
        assert_eq!(scroller.edge_state(Edge::Previous), EdgeState::Fetching);
        assert_eq!(scroller.edge_state(Edge::Next), EdgeState::Fetching);
    }

    #[tokio::test]
    async fn jump_resets_and_discards_stale_results() {
        let source = MemorySource::gated();
        source.insert_page(5, 30);
        source.insert_page(20, 30);
        let (mut scroller, mut rx) = scroller(source.clone(), 10);

        let generation = scroller.generation();
        scroller.apply(FetchOutcome {
            edge: Edge::Next,
            generation,
            page: Some(fetched(2, 30)),
        });
        scroller.jump_to(5);
        assert!(scroller.cache().is_empty());
        assert!(scroller.container().children().is_empty());

        scroller.jump_to(20);
        assert!(scroller.cache().is_empty());
        assert!(scroller.container().children().is_empty());
        assert_eq!(scroller.edge_state(Edge::Next), EdgeState::Fetching);

        // Two outstanding requests: page 5 (stale) and page 20 (current).
        // Anything earlier was issued before the first jump.
        settle_tasks().await;
        source.release(16);
        let mut mounted = Vec::new();
        while scroller.edge_state(Edge::Next) == EdgeState::Fetching {
            let outcome = rx.recv().await.unwrap();
            let key = outcome.page.as_ref().map(|p| p.key);
            if scroller.apply(outcome) {
                mounted.push(key);
            }
        }
        assert_eq!(mounted, vec![Some(20)]);
        assert_eq!(scroller.cache().pages(), vec![20]);
        assert_eq!(scroller.container().children().len(), 1);
    }

    #[tokio::test]
    async fn annotation_toggle_rerenders_mounted_pages() {
        let (mut scroller, _rx) = scroller(MemorySource::default(), 100);
        let generation = scroller.generation();
        for (edge, key) in [(Edge::Next, 1), (Edge::Next, 2)] {
            scroller.apply(FetchOutcome {
                edge,
                generation,
                page: Some(fetched(key, 3)),
            });
        }
        let nodes_before = scroller.container().children();
        let text = |s: &Scroller| -> String {
            s.container()
                .visible_rows()
                .iter()
                .map(|row| row.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        };
        assert!(!text(&scroller).contains("[2:1]"));

        assert!(scroller.toggle_annotations());
        assert!(text(&scroller).contains("[1:0]"));
        assert!(text(&scroller).contains("[2:1]"));
        assert_eq!(scroller.container().children(), nodes_before);
        assert_eq!(scroller.cache().pages(), vec![1, 2]);

        assert!(!scroller.toggle_annotations());
        assert!(!text(&scroller).contains("[2:1]"));
    }
}
