//! # client
//!
//! Leptos + WASM front end for StreamPay.
//!
//! Pages, the `ProtectedRoute` guard component and the browser adapters
//! (`gloo-net` transport, Web Storage tiers, `gloo-timers` clock) that plug
//! the `session` core into a page load.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: installs panic/log hooks and hydrates the SSR markup.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    // `session` emits through `tracing`, which forwards to `log` without a subscriber.
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(app::App);
}
