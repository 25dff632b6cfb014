//! Host services the session store needs from its runtime.

use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use futures::future::{Either, LocalBoxFuture, select};

use crate::error::TransportError;
use crate::guard::Route;

/// Clock, timers and task spawning for a single-threaded host.
pub trait Platform {
    /// Milliseconds since an arbitrary fixed epoch; only differences matter.
    fn now_ms(&self) -> u64;

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;

    /// Run `task` to completion in the background on the current thread.
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>);
}

/// Where redirects issued by the store (logout, expired session) go.
pub trait Navigator {
    fn navigate(&self, route: Route);
}

/// Race `request` against the platform timer. The request is polled first,
/// so an already-complete request wins over an already-elapsed timer.
///
/// # Errors
///
/// Returns the request's own error, or [`TransportError::Timeout`].
pub async fn with_timeout<T, F>(platform: &dyn Platform, budget: Duration, request: F) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    let request = pin!(request);
    match select(request, platform.sleep(budget)).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => Err(TransportError::Timeout(budget.as_secs())),
    }
}
