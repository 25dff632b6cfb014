//! Browser adapters for the session core.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns (Web Storage, timers,
//! document visibility, location) from page and component logic.

pub mod platform;
pub mod storage;
