//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read the session snapshot from Leptos context; only pages call
//! into the store.

pub mod protected_route;
pub mod session_bar;
