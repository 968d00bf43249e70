//! Terminal implementation of the page container plus the widget that
//! draws its visible window.
//!
//! Nodes live in an arena and are mounted by handle, the same way the
//! tree view keeps its nodes; `order` holds the mounted handles top to
//! bottom.

use std::collections::VecDeque;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::Line,
    widgets::{Block, Widget},
};

use crate::core::page::{PageContent, PageNumber};
use crate::core::view::{Container, NodeId};

use super::markup;

/// One page node: its page number and its current rendered rows.
#[derive(Debug, Clone)]
struct PageNode {
    page: PageNumber,
    rows: Vec<Line<'static>>,
}

#[derive(Debug, Default)]
pub struct BookView {
    nodes: Vec<PageNode>,
    order: VecDeque<NodeId>,
    scroll_top: u32,
    client_height: u32,
}

impl BookView {
    pub fn new() -> Self {
        Self::default()
    }

    fn max_scroll(&self) -> u32 {
        self.scroll_height().saturating_sub(self.client_height)
    }

    fn clamp_scroll(&mut self) {
        self.scroll_top = self.scroll_top.min(self.max_scroll());
    }

    fn node(&self, id: NodeId) -> Option<&PageNode> {
        self.nodes.get(id.0)
    }

    fn is_mounted(&self, id: NodeId) -> bool {
        self.order.contains(&id)
    }

    /// Rows currently inside the viewport, top to bottom.
    pub fn visible_rows(&self) -> Vec<&Line<'static>> {
        let start = self.scroll_top as usize;
        self.order
            .iter()
            .filter_map(|&id| self.node(id))
            .flat_map(|node| node.rows.iter())
            .skip(start)
            .take(self.client_height as usize)
            .collect()
    }
}

impl Container for BookView {
    fn create_node(&mut self, page: PageNumber) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(PageNode {
            page,
            rows: Vec::new(),
        });
        id
    }

    fn insert_before(&mut self, node: NodeId) {
        if self.node(node).is_some() && !self.is_mounted(node) {
            self.order.push_front(node);
        }
    }

    fn insert_after(&mut self, node: NodeId) {
        if self.node(node).is_some() && !self.is_mounted(node) {
            self.order.push_back(node);
        }
    }

    fn remove_all(&mut self) {
        self.order.clear();
        self.nodes.clear();
        self.scroll_top = 0;
    }

    fn render(&mut self, node: NodeId, content: &PageContent, annotated: bool) {
        if let Some(slot) = self.nodes.get_mut(node.0) {
            slot.rows = markup::page_rows(slot.page, content, annotated);
        }
        self.clamp_scroll();
    }

    fn children(&self) -> Vec<NodeId> {
        self.order.iter().copied().collect()
    }

    fn page_of(&self, node: NodeId) -> Option<PageNumber> {
        self.node(node).map(|n| n.page)
    }

    fn offset_top(&self, node: NodeId) -> Option<u32> {
        let mut top = 0u32;
        for &id in &self.order {
            if id == node {
                return Some(top);
            }
            top += self.node_height(id).unwrap_or(0);
        }
        None
    }

    fn node_height(&self, node: NodeId) -> Option<u32> {
        self.node(node).map(|n| n.rows.len() as u32)
    }

    fn scroll_top(&self) -> u32 {
        self.scroll_top
    }

    fn set_scroll_top(&mut self, top: u32) {
        self.scroll_top = top;
        self.clamp_scroll();
    }

    fn client_height(&self) -> u32 {
        self.client_height
    }

    fn set_client_height(&mut self, height: u32) {
        self.client_height = height;
        self.clamp_scroll();
    }

    fn scroll_height(&self) -> u32 {
        self.order
            .iter()
            .filter_map(|&id| self.node_height(id))
            .sum()
    }
}

// ───────────────────────────────────────── widget ────────────

/// Draws the visible window of a [`BookView`].
pub struct BookWidget<'a> {
    view: &'a BookView,
    block: Option<Block<'a>>,
}

impl<'a> BookWidget<'a> {
    pub fn new(view: &'a BookView) -> Self {
        Self { view, block: None }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for BookWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };

        for (i, row) in self
            .view
            .visible_rows()
            .into_iter()
            .take(inner.height as usize)
            .enumerate()
        {
            let y = inner.y + i as u16;
            buf.set_line(inner.x, y, row, inner.width);
        }
    }
}
