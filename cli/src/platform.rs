//! Tokio-backed host services for the session store.
//!
//! Tasks are spawned with `tokio::task::spawn_local`, so every store call
//! must run inside a `tokio::task::LocalSet`.

use std::time::Duration;

use futures_util::future::LocalBoxFuture;
use session::{Navigator, Platform, Route};
use tokio::time::Instant;

pub struct TokioPlatform {
    started: Instant,
}

impl TokioPlatform {
    #[must_use]
    pub fn new() -> Self {
        Self { started: Instant::now() }
    }
}

impl Default for TokioPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for TokioPlatform {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }

    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        drop(tokio::task::spawn_local(task));
    }
}

/// A terminal has no location to change; redirects are reported instead.
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: Route) {
        tracing::info!(path = route.path(), "redirect");
    }
}
