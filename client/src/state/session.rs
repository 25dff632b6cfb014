//! Page-wide session store and its bridge into Leptos reactivity.
//!
//! SYSTEM CONTEXT
//! ==============
//! `App` provides an `RwSignal<SessionSnapshot>` as context; the route guard
//! and pages read it. The store itself is an `Rc` handle and cannot live in a
//! Leptos context (contexts require `Send + Sync`), so the browser build keeps
//! it in a thread-local next to the `visibilitychange` subscription and pages
//! reach it through [`store`].
//!
//! DESIGN
//! ======
//! The snapshot signal is written only from the store's change notifications,
//! so the reactive view never diverges from the store.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use session::SessionConfig;
use session::config::DEFAULT_API_URL;

#[cfg(feature = "hydrate")]
use leptos::prelude::*;
#[cfg(feature = "hydrate")]
use session::{SessionPersistence, SessionSnapshot, SessionStore};
#[cfg(feature = "hydrate")]
use std::cell::RefCell;
#[cfg(feature = "hydrate")]
use std::rc::Rc;

#[cfg(feature = "hydrate")]
use crate::net::api::GlooAuthApi;
#[cfg(feature = "hydrate")]
use crate::util::platform::{BrowserNavigator, BrowserPlatform, VisibilityListener};
#[cfg(feature = "hydrate")]
use crate::util::storage::WebStorage;

/// Backend base URL baked in at build time.
#[cfg(feature = "hydrate")]
const BUILD_API_URL: Option<&str> = option_env!("STREAMPAY_API_URL");

/// Session policy for the browser build; only the base URL is configurable.
#[must_use]
pub fn browser_config(api_url: Option<&str>) -> SessionConfig {
    match api_url.map(str::trim).filter(|url| !url.is_empty()) {
        Some(url) => SessionConfig::with_api_url(url),
        None => SessionConfig::with_api_url(DEFAULT_API_URL),
    }
}

#[cfg(feature = "hydrate")]
struct Bridge {
    store: SessionStore,
    _visibility: Option<VisibilityListener>,
}

#[cfg(feature = "hydrate")]
thread_local! {
    static BRIDGE: RefCell<Option<Bridge>> = const { RefCell::new(None) };
}

/// The page's session store, once [`start`] has run.
#[cfg(feature = "hydrate")]
pub fn store() -> Option<SessionStore> {
    BRIDGE.with(|bridge| bridge.borrow().as_ref().map(|b| b.store.clone()))
}

/// Build the store, mirror it into `snapshot`, and bootstrap from storage.
///
/// Must run inside the `App` owner; the subscription and the scheduled
/// refresh are torn down with it.
#[cfg(feature = "hydrate")]
pub fn start(snapshot: RwSignal<SessionSnapshot>) {
    if store().is_some() {
        return;
    }
    let config = browser_config(BUILD_API_URL);
    let api = Rc::new(GlooAuthApi::new(&config.api_url));
    let persistence = SessionPersistence::new(Rc::new(WebStorage::local()), Rc::new(WebStorage::session()));
    let handle = SessionStore::new(config, api, persistence, Rc::new(BrowserNavigator), Rc::new(BrowserPlatform));
    handle.subscribe(move |next| {
        let _ = snapshot.try_set(next.clone());
    });

    let visibility = VisibilityListener::install(|| {
        if let Some(store) = store() {
            leptos::task::spawn_local(async move { store.on_visible().await });
        }
    });
    if visibility.is_none() {
        log::warn!("visibilitychange listener unavailable; refreshing on schedule only");
    }
    BRIDGE.with(|bridge| {
        *bridge.borrow_mut() = Some(Bridge { store: handle.clone(), _visibility: visibility });
    });

    leptos::task::spawn_local(async move { handle.initialize().await });
    on_cleanup(stop);
}

/// Tear down the bridge: cancel the scheduled refresh and drop the
/// visibility listener.
#[cfg(feature = "hydrate")]
pub fn stop() {
    let bridge = BRIDGE.with(|bridge| bridge.borrow_mut().take());
    if let Some(bridge) = bridge {
        bridge.store.teardown();
    }
}
