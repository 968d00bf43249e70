//! Cache of currently mounted pages.
//!
//! The key set mirrors exactly the pages attached to the container.  The
//! cache itself never touches nodes; [`crate::app::scroller`] clears it and
//! the container together.

use std::collections::BTreeMap;

use super::page::{PageContent, PageNumber};
use super::view::NodeId;

/// A page attached to the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    pub node: NodeId,
    pub content: PageContent,
}

#[derive(Debug, Default)]
pub struct PageCache {
    entries: BTreeMap<PageNumber, PageEntry>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `page`.
    pub fn put(&mut self, page: PageNumber, node: NodeId, content: PageContent) {
        self.entries.insert(page, PageEntry { node, content });
    }

    /// Forget every entry.  Does not touch the container.
    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    pub fn get(&self, page: PageNumber) -> Option<&PageEntry> {
        self.entries.get(&page)
    }

    pub fn contains(&self, page: PageNumber) -> bool {
        self.entries.contains_key(&page)
    }

    /// Entries in page order.
    pub fn iter(&self) -> impl Iterator<Item = (PageNumber, &PageEntry)> {
        self.entries.iter().map(|(&page, entry)| (page, entry))
    }

    #[cfg(test)]
    pub fn pages(&self) -> Vec<PageNumber> {
        self.entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
