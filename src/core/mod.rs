//! Core algorithms – page sequencing, the fetch boundary, and the page cache.
//!
//! Nothing in this module depends on any TUI or rendering crate.
//! Rendering is reached only through the [`view::Container`] trait.

pub mod cache;
pub mod page;
pub mod sequence;
pub mod source;
pub mod view;
