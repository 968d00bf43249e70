//! Rendering-collaborator interface.
//!
//! The scroll controller only ever talks to the visual tree through
//! [`Container`]: create a node, insert it at an edge, render content into
//! it, clear everything.  Nodes are referred to by opaque [`NodeId`]
//! handles so the cache never owns visual elements directly.

use super::page::{PageContent, PageNumber};

/// Opaque handle to a mounted page node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// A vertically scrollable container of page nodes.
///
/// All geometry is in rows.
pub trait Container {
    /// Allocate a detached node for `page`.
    fn create_node(&mut self, page: PageNumber) -> NodeId;
    /// Mount `node` before the current first child.
    fn insert_before(&mut self, node: NodeId);
    /// Mount `node` after the current last child.
    fn insert_after(&mut self, node: NodeId);
    /// Tear down every mounted node.
    fn remove_all(&mut self);
    /// Replace the node's rendered subtree wholesale.
    fn render(&mut self, node: NodeId, content: &PageContent, annotated: bool);

    /// Mounted nodes, top to bottom.
    fn children(&self) -> Vec<NodeId>;
    fn page_of(&self, node: NodeId) -> Option<PageNumber>;
    fn offset_top(&self, node: NodeId) -> Option<u32>;
    fn node_height(&self, node: NodeId) -> Option<u32>;

    fn scroll_top(&self) -> u32;
    fn set_scroll_top(&mut self, top: u32);
    fn client_height(&self) -> u32;
    fn set_client_height(&mut self, height: u32);
    /// Total rendered height of all mounted nodes.
    fn scroll_height(&self) -> u32;
}
