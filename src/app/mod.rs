//! Application orchestration — scroll controller, title tracking, state,
//! event loop plumbing, and input handling.

pub mod debounce;
pub mod event;
pub mod handler;
pub mod scroller;
pub mod state;
pub mod title;
