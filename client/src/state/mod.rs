//! Application state shared across pages.

pub mod session;
