//! Clock, timers, task spawning, navigation and visibility for the browser.

#![cfg(feature = "hydrate")]

use std::time::Duration;

use futures::future::LocalBoxFuture;
use session::{Navigator, Platform, Route};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

pub struct BrowserPlatform;

impl Platform for BrowserPlatform {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(gloo_timers::future::sleep(duration))
    }

    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        leptos::task::spawn_local(task);
    }
}

/// Redirects issued by the store outside the router (logout, expired
/// session) do a full location change.
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&self, route: Route) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if window.location().pathname().ok().as_deref() == Some(route.path()) {
            return;
        }
        if let Err(err) = window.location().set_href(route.path()) {
            log::warn!("navigation to {} failed: {err:?}", route.path());
        }
    }
}

/// `visibilitychange` subscription; removed from the document on drop.
pub struct VisibilityListener {
    document: web_sys::Document,
    callback: Closure<dyn FnMut()>,
}

impl VisibilityListener {
    /// Call `on_visible` whenever the page becomes visible again.
    pub fn install(on_visible: impl Fn() + 'static) -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let target = document.clone();
        let callback = Closure::<dyn FnMut()>::new(move || {
            if target.visibility_state() == web_sys::VisibilityState::Visible {
                on_visible();
            }
        });
        document
            .add_event_listener_with_callback("visibilitychange", callback.as_ref().unchecked_ref())
            .ok()?;
        Some(Self { document, callback })
    }
}

impl Drop for VisibilityListener {
    fn drop(&mut self) {
        let _ = self
            .document
            .remove_event_listener_with_callback("visibilitychange", self.callback.as_ref().unchecked_ref());
    }
}
