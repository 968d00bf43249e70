//! Bidirectional page-number generator.
//!
//! Two independent cursors are seeded from one starting page.  `next()`
//! walks forward starting *at* the seed, `previous()` walks backward
//! starting one *below* it.  No bounds checking happens here; values at
//! or below zero are the fetch layer's "exhausted" condition.

use super::page::PageNumber;

/// Cursor pair over page numbers.  Re-seed by constructing a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSequence {
    /// The value the next call to `next()` returns.
    forward: PageNumber,
    /// The value the next call to `previous()` returns.
    backward: PageNumber,
}

impl PageSequence {
    pub fn new(starting_at: PageNumber) -> Self {
        Self {
            forward: starting_at,
            backward: starting_at - 1,
        }
    }

    /// `s, s+1, s+2, …`
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> PageNumber {
        let n = self.forward;
        self.forward += 1;
        n
    }

    /// `s-1, s-2, s-3, …`
    pub fn previous(&mut self) -> PageNumber {
        let n = self.backward;
        self.backward -= 1;
        n
    }
}
