//! The session store: authentication state, persistence and refresh policy.
//!
//! SYSTEM CONTEXT
//! ==============
//! One store exists per page load (or CLI invocation). UI layers hold a
//! cloned handle, call the async operations, and observe state through
//! [`SessionStore::subscribe`]. The route guard reads it through
//! [`AuthQueries`].
//!
//! DESIGN
//! ======
//! - `token` and `user` are only ever written together.
//! - A refresh in flight is a [`Shared`] future stored in the state; later
//!   callers await that same future instead of issuing a second request. A
//!   drop guard inside the request future clears the slot on every exit path.
//! - The slot is tagged with a sequence number and emptied by login and
//!   logout, so a refresh started for an earlier session is never joined.
//! - The scheduled refresh is driven by [`RefreshTimer`]; the store only
//!   executes the actions it returns (spawn, abort).
//!
//! ERROR HANDLING
//! ==============
//! Transport and backend failures become `auth_error` for passive display.
//! Only `login`, `refresh` and the password-reset calls return errors to
//! their caller; background paths (scheduled, visibility) log and continue.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::FutureExt;
use futures::future::{AbortHandle, Abortable, LocalBoxFuture, Shared};
use serde_json::{Value, json};

use crate::api::{
    ApiResponse, AuthApi, GENERIC_LOGIN_ERROR, LOGIN_PATH, LoginGrant, ME_PATH, REQUEST_PASSWORD_RESET_PATH,
    RESET_PASSWORD_PATH, ResetTokenStatus, VERIFY_RESET_TOKEN_PATH,
};
use crate::config::SessionConfig;
use crate::error::{SessionError, TransportError};
use crate::guard::{AuthQueries, Route};
use crate::platform::{Navigator, Platform, with_timeout};
use crate::storage::{Restored, SessionPersistence, StorageTier};
use crate::timer::{RefreshTimer, TimerAction, TimerEvent, TimerState};
use crate::user::{Role, User};

const RESET_LINK_SENT: &str = "If that email is registered, a password reset link has been sent.";
const PASSWORD_RESET_DONE: &str = "Your password has been reset. You can now log in.";

type RefreshResult = Result<Option<User>, SessionError>;
type InFlightRefresh = Shared<LocalBoxFuture<'static, RefreshResult>>;
type Listener = Box<dyn Fn(&SessionSnapshot)>;

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Public session fields at one point in time.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub token_present: bool,
    pub user: Option<User>,
    pub loading: bool,
    pub auth_error: Option<String>,
}

impl SessionSnapshot {
    /// State before bootstrap has read storage.
    #[must_use]
    pub fn bootstrapping() -> Self {
        Self { token_present: false, user: None, loading: true, auth_error: None }
    }
}

impl AuthQueries for SessionSnapshot {
    fn is_loading(&self) -> bool {
        self.loading
    }

    fn is_authenticated(&self) -> bool {
        self.token_present && self.user.is_some()
    }

    fn is_activated(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_activated)
    }

    fn user_role(&self) -> Role {
        self.user.as_ref().map(User::role).unwrap_or_default()
    }
}

// =============================================================================
// STORE
// =============================================================================

struct SessionState {
    token: Option<String>,
    user: Option<User>,
    loading: bool,
    auth_error: Option<String>,
    last_refresh_ms: Option<u64>,
    timer: RefreshTimer,
    timer_handle: Option<AbortHandle>,
    in_flight: Option<(u64, InFlightRefresh)>,
    refresh_seq: u64,
}

struct Inner {
    config: SessionConfig,
    api: Rc<dyn AuthApi>,
    persistence: SessionPersistence,
    navigator: Rc<dyn Navigator>,
    platform: Rc<dyn Platform>,
    state: RefCell<SessionState>,
    listeners: RefCell<Vec<Listener>>,
}

/// Cloneable handle to the page's session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Rc<Inner>,
}

impl SessionStore {
    pub fn new(
        config: SessionConfig,
        api: Rc<dyn AuthApi>,
        persistence: SessionPersistence,
        navigator: Rc<dyn Navigator>,
        platform: Rc<dyn Platform>,
    ) -> Self {
        let state = SessionState {
            token: None,
            user: None,
            loading: true,
            auth_error: None,
            last_refresh_ms: None,
            timer: RefreshTimer::new(config.max_refresh_failures),
            timer_handle: None,
            in_flight: None,
            refresh_seq: 0,
        };
        let inner = Inner {
            config,
            api,
            persistence,
            navigator,
            platform,
            state: RefCell::new(state),
            listeners: RefCell::new(Vec::new()),
        };
        Self { inner: Rc::new(inner) }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Call `listener` with a fresh snapshot after every state change.
    ///
    /// Listeners must not subscribe further listeners from inside the callback.
    pub fn subscribe(&self, listener: impl Fn(&SessionSnapshot) + 'static) {
        self.inner.listeners.borrow_mut().push(Box::new(listener));
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.inner.state.borrow();
        SessionSnapshot {
            token_present: state.token.is_some(),
            user: state.user.clone(),
            loading: state.loading,
            auth_error: state.auth_error.clone(),
        }
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.inner.state.borrow().token.clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.inner.state.borrow().user.clone()
    }

    #[must_use]
    pub fn auth_error(&self) -> Option<String> {
        self.inner.state.borrow().auth_error.clone()
    }

    #[must_use]
    pub fn timer_state(&self) -> TimerState {
        self.inner.state.borrow().timer.state()
    }

    /// Consecutive failed scheduled refreshes.
    #[must_use]
    pub fn refresh_failures(&self) -> u32 {
        self.inner.state.borrow().timer.failures()
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Restore the session persisted by an earlier page load.
    ///
    /// Runs once; later calls are ignored. A malformed stored user wipes
    /// both tiers and leaves the session empty.
    #[allow(clippy::unused_async)]
    pub async fn initialize(&self) {
        if !self.inner.state.borrow().loading {
            return;
        }
        let restored = self.inner.persistence.restore();
        let action = {
            let mut state = self.inner.state.borrow_mut();
            if let Restored::Found(stored) = restored {
                tracing::debug!(tier = ?stored.tier, "restored persisted session");
                state.token = Some(stored.token);
                state.user = Some(stored.user);
            }
            state.loading = false;
            if state.token.is_some() {
                state.timer.apply(TimerEvent::TokenAcquired)
            } else {
                TimerAction::None
            }
        };
        self.perform(action);
        self.notify();
    }

    /// Exchange credentials for a session.
    ///
    /// `remember` selects the durable tier; the other tier is cleared.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Authentication`] when the backend rejects the
    ///   credentials or cannot be reached; `auth_error` carries the message.
    /// - [`SessionError::InvalidResponse`] when a success response lacks
    ///   `token` or `user`.
    pub async fn login(&self, email: &str, password: &str, remember: bool) -> Result<User, SessionError> {
        let body = json!({ "email": email, "password": password });
        let response = match self.post_public(LOGIN_PATH, &body).await {
            Ok(response) => response,
            Err(err) => return Err(self.fail_login(format!("Unable to reach the server: {err}"))),
        };
        if !response.is_ok() {
            let message = response
                .error_message()
                .unwrap_or_else(|| GENERIC_LOGIN_ERROR.to_owned());
            return Err(self.fail_login(message));
        }
        let grant = LoginGrant::from_body(&response.body)
            .inspect_err(|err| tracing::error!(error = %err, "login response violated contract"))?;

        let (action, stale) = {
            let mut state = self.inner.state.borrow_mut();
            state.token = Some(grant.token.clone());
            state.user = Some(grant.user.clone());
            state.auth_error = None;
            (state.timer.apply(TimerEvent::LoginSucceeded), state.in_flight.take())
        };
        drop(stale);
        let tier = StorageTier::for_remember(remember);
        if let Err(err) = self.inner.persistence.save(tier, &grant.token, &grant.user) {
            tracing::warn!(error = %err, ?tier, "failed to persist session");
        }
        self.perform(action);
        tracing::info!(remember, role = grant.user.role().as_str(), "login succeeded");
        self.notify();
        Ok(grant.user)
    }

    /// Drop the session everywhere and go to the login screen. Idempotent.
    pub fn logout(&self) {
        let (action, had_session, stale) = {
            let mut state = self.inner.state.borrow_mut();
            let had_session = state.token.is_some();
            state.token = None;
            state.user = None;
            state.auth_error = None;
            state.last_refresh_ms = None;
            (state.timer.apply(TimerEvent::TokenLost), had_session, state.in_flight.take())
        };
        // Released outside the borrow: dropping the last handle runs InFlightGuard.
        drop(stale);
        self.inner.persistence.clear();
        self.perform(action);
        if had_session {
            tracing::info!("logged out");
        }
        self.notify();
        self.inner.navigator.navigate(Route::Login);
    }

    /// Stop background work owned by the store (the scheduled refresh).
    pub fn teardown(&self) {
        let action = self.inner.state.borrow_mut().timer.apply(TimerEvent::Teardown);
        self.perform(action);
    }

    // -------------------------------------------------------------------------
    // Refresh
    // -------------------------------------------------------------------------

    /// Re-fetch the current user.
    ///
    /// Without a token this returns the cached user and sends nothing. A
    /// refresh already in flight is joined. Unless `force` is set, a refresh
    /// within the throttle window of the last successful one returns the
    /// cached user. A 401 ends the session and yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Refresh`] on network failure, timeout or a
    /// non-401 error status. The session is kept.
    pub async fn refresh(&self, force: bool) -> RefreshResult {
        let pending = {
            let mut state = self.inner.state.borrow_mut();
            let Some(token) = state.token.clone() else {
                return Ok(state.user.clone());
            };
            if let Some((_, in_flight)) = state.in_flight.clone() {
                tracing::debug!("refresh already in flight; joining it");
                in_flight
            } else {
                if !force && self.is_throttled(&state) {
                    tracing::trace!("refresh throttled; returning cached user");
                    return Ok(state.user.clone());
                }
                state.refresh_seq += 1;
                let seq = state.refresh_seq;
                let request = self.clone().fetch_current_user(seq, token).boxed_local().shared();
                state.in_flight = Some((seq, request.clone()));
                request
            }
        };
        pending.await
    }

    /// The page became visible again: refresh now, ignoring the throttle.
    /// Failures are logged only.
    pub async fn on_visible(&self) {
        if self.token().is_none() {
            return;
        }
        if let Err(err) = self.refresh(true).await {
            tracing::debug!(error = %err, "visibility refresh failed");
        }
    }

    fn is_throttled(&self, state: &SessionState) -> bool {
        let Some(last) = state.last_refresh_ms else {
            return false;
        };
        let elapsed = self.inner.platform.now_ms().saturating_sub(last);
        u128::from(elapsed) < self.inner.config.refresh_throttle.as_millis()
    }

    async fn fetch_current_user(self, seq: u64, token: String) -> RefreshResult {
        let _in_flight = InFlightGuard { store: Rc::downgrade(&self.inner), seq };
        let inner = &self.inner;
        let response = with_timeout(
            inner.platform.as_ref(),
            inner.config.request_timeout,
            inner.api.get_json(ME_PATH, &[], Some(&token)),
        )
        .await;

        if self.token().as_deref() != Some(token.as_str()) {
            tracing::debug!("session changed while refreshing; discarding response");
            return Ok(self.user());
        }

        match response {
            Ok(response) if response.is_ok() => match User::from_me_response(response.body) {
                Some(user) => {
                    self.apply_refreshed_user(user.clone());
                    Ok(Some(user))
                }
                None => Err(self.fail_refresh("current user response is not an object".to_owned())),
            },
            Ok(response) if response.is_unauthorized() => {
                tracing::warn!("refresh rejected with 401; ending session");
                self.logout();
                Ok(None)
            }
            Ok(response) => Err(self.fail_refresh(response.error_message_or_status())),
            Err(err) => Err(self.fail_refresh(err.to_string())),
        }
    }

    fn apply_refreshed_user(&self, user: User) {
        let now = self.inner.platform.now_ms();
        {
            let mut state = self.inner.state.borrow_mut();
            state.user = Some(user.clone());
            state.auth_error = None;
            state.last_refresh_ms = Some(now);
            state.timer.apply(TimerEvent::RefreshSucceeded);
        }
        if let Err(err) = self.inner.persistence.save_user(&user) {
            tracing::warn!(error = %err, "failed to persist refreshed user");
        }
        self.notify();
    }

    fn fail_refresh(&self, message: String) -> SessionError {
        tracing::warn!(error = %message, "refresh failed");
        self.inner.state.borrow_mut().auth_error = Some(message.clone());
        self.notify();
        SessionError::Refresh(message)
    }

    fn fail_login(&self, message: String) -> SessionError {
        tracing::info!(error = %message, "login rejected");
        self.inner.state.borrow_mut().auth_error = Some(message.clone());
        self.notify();
        SessionError::Authentication(message)
    }

    // -------------------------------------------------------------------------
    // Scheduled refresh
    // -------------------------------------------------------------------------

    fn timer_is_current(&self, generation: u64) -> bool {
        self.inner.state.borrow().timer.is_current(generation)
    }

    async fn scheduled_tick(&self) {
        if let Err(err) = self.refresh(false).await {
            let (action, failures) = {
                let mut state = self.inner.state.borrow_mut();
                let action = state.timer.apply(TimerEvent::ScheduledRefreshFailed);
                (action, state.timer.failures())
            };
            tracing::warn!(error = %err, failures, "scheduled refresh failed");
            if action == TimerAction::Cancel {
                tracing::warn!(failures, "scheduled refresh halted until next login");
            }
            self.perform(action);
        }
    }

    fn perform(&self, action: TimerAction) {
        match action {
            TimerAction::None => {}
            TimerAction::Cancel => self.cancel_timer_task(),
            TimerAction::Start { generation } | TimerAction::Restart { generation } => {
                self.cancel_timer_task();
                self.spawn_timer_task(generation);
            }
        }
    }

    fn cancel_timer_task(&self) {
        let handle = self.inner.state.borrow_mut().timer_handle.take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    fn spawn_timer_task(&self, generation: u64) {
        let (handle, registration) = AbortHandle::new_pair();
        let task = Abortable::new(timer_loop(Rc::downgrade(&self.inner), generation), registration);
        self.inner.state.borrow_mut().timer_handle = Some(handle);
        self.inner.platform.spawn_local(Box::pin(async move {
            let _ = task.await;
        }));
        tracing::debug!(generation, "scheduled refresh armed");
    }

    // -------------------------------------------------------------------------
    // Other endpoints
    // -------------------------------------------------------------------------

    /// Bearer GET of a domain endpoint (dashboard, tasks, transactions...).
    ///
    /// # Errors
    ///
    /// - [`SessionError::SessionExpired`] without a session or on 401 (the
    ///   session is ended as by [`SessionStore::logout`]).
    /// - [`SessionError::Request`] on transport failure or other error status.
    pub async fn fetch_authorized(&self, path: &str) -> Result<Value, SessionError> {
        let Some(token) = self.token() else {
            return Err(SessionError::SessionExpired);
        };
        let inner = &self.inner;
        let response = with_timeout(
            inner.platform.as_ref(),
            inner.config.request_timeout,
            inner.api.get_json(path, &[], Some(&token)),
        )
        .await
        .map_err(|err| SessionError::Request(err.to_string()))?;

        if response.is_unauthorized() {
            tracing::warn!(path, "authorized request rejected with 401; ending session");
            self.logout();
            return Err(SessionError::SessionExpired);
        }
        if !response.is_ok() {
            return Err(SessionError::Request(response.error_message_or_status()));
        }
        Ok(response.body)
    }

    /// Ask the backend to email a reset link. Returns the message to show.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::PasswordReset`] on transport failure or an
    /// error status.
    pub async fn request_password_reset(&self, email: &str) -> Result<String, SessionError> {
        let body = json!({ "email": email });
        let response = self
            .post_public(REQUEST_PASSWORD_RESET_PATH, &body)
            .await
            .map_err(unreachable_reset)?;
        if !response.is_ok() {
            return Err(reset_failure(&response, "Unable to send the reset email."));
        }
        Ok(message_or(&response.body, RESET_LINK_SENT))
    }

    /// Check a reset token from an emailed link.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::PasswordReset`] only when the backend could
    /// not be reached; a rejected token is reported as `valid: false`.
    pub async fn verify_reset_token(&self, token: &str) -> Result<ResetTokenStatus, SessionError> {
        let inner = &self.inner;
        let response = with_timeout(
            inner.platform.as_ref(),
            inner.config.login_timeout,
            inner.api.get_json(VERIFY_RESET_TOKEN_PATH, &[("token", token)], None),
        )
        .await
        .map_err(unreachable_reset)?;
        Ok(ResetTokenStatus::from_response(&response))
    }

    /// Set a new password using a reset token. Returns the message to show.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::PasswordReset`] on transport failure or when
    /// the backend rejects the token or password.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<String, SessionError> {
        let body = json!({ "token": token, "new_password": new_password });
        let response = self
            .post_public(RESET_PASSWORD_PATH, &body)
            .await
            .map_err(unreachable_reset)?;
        if !response.is_ok() {
            return Err(reset_failure(&response, "Unable to reset the password."));
        }
        Ok(message_or(&response.body, PASSWORD_RESET_DONE))
    }

    /// Unauthenticated POST with the login time budget.
    async fn post_public(&self, path: &str, body: &Value) -> Result<ApiResponse, TransportError> {
        let inner = &self.inner;
        with_timeout(inner.platform.as_ref(), inner.config.login_timeout, inner.api.post_json(path, body, None)).await
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        for listener in self.inner.listeners.borrow().iter() {
            listener(&snapshot);
        }
    }
}

impl AuthQueries for SessionStore {
    fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    fn is_authenticated(&self) -> bool {
        let state = self.inner.state.borrow();
        state.token.is_some() && state.user.is_some()
    }

    fn is_activated(&self) -> bool {
        self.inner.state.borrow().user.as_ref().is_some_and(User::is_activated)
    }

    fn user_role(&self) -> Role {
        self.inner.state.borrow().user.as_ref().map(User::role).unwrap_or_default()
    }
}

/// Clears the in-flight slot when the refresh future finishes or is dropped,
/// unless the slot already belongs to a newer refresh.
struct InFlightGuard {
    store: Weak<Inner>,
    seq: u64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let Some(inner) = self.store.upgrade() else {
            return;
        };
        let Ok(mut state) = inner.state.try_borrow_mut() else {
            return;
        };
        if state.in_flight.as_ref().is_some_and(|(seq, _)| *seq == self.seq) {
            // Dropped after the borrow ends so a nested guard cannot re-borrow.
            let finished = state.in_flight.take();
            drop(state);
            drop(finished);
        }
    }
}

/// Body of one scheduled-refresh timer. Holds the store weakly so a dropped
/// store ends the loop at its next wake-up.
async fn timer_loop(store: Weak<Inner>, generation: u64) {
    loop {
        let Some(sleep) = store
            .upgrade()
            .map(|inner| inner.platform.sleep(inner.config.refresh_interval))
        else {
            break;
        };
        sleep.await;

        let Some(inner) = store.upgrade() else {
            break;
        };
        let session = SessionStore { inner };
        if !session.timer_is_current(generation) {
            break;
        }
        session.scheduled_tick().await;
        if !session.timer_is_current(generation) {
            break;
        }
    }
    tracing::debug!(generation, "scheduled refresh stopped");
}

fn unreachable_reset(err: TransportError) -> SessionError {
    SessionError::PasswordReset(format!("Unable to reach the server: {err}"))
}

fn reset_failure(response: &ApiResponse, fallback: &str) -> SessionError {
    SessionError::PasswordReset(response.error_message().unwrap_or_else(|| fallback.to_owned()))
}

fn message_or(body: &Value, fallback: &str) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .map_or_else(|| fallback.to_owned(), str::to_owned)
}
