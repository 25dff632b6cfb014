//! Error taxonomy for session operations.
//!
//! ERROR HANDLING
//! ==============
//! Both enums are `Clone` because a single refresh result is handed to every
//! caller awaiting the shared in-flight future.

/// Failure of one HTTP exchange before a status code was obtained.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, CORS rejection, etc.
    #[error("network error: {0}")]
    Network(String),

    /// The request did not complete within its time budget.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The response body could not be read.
    #[error("response read failed: {0}")]
    Decode(String),
}

/// Errors surfaced by [`crate::SessionStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Credentials rejected or the backend reported a login failure.
    /// Carries the message shown inline on the login form.
    #[error("{0}")]
    Authentication(String),

    /// The backend violated its contract (e.g. login without `token`/`user`).
    #[error("invalid response from server: {0}")]
    InvalidResponse(String),

    /// Transient refresh failure. The session is kept and may be retried.
    #[error("refresh failed: {0}")]
    Refresh(String),

    /// The backend rejected the bearer token; the session has been cleared.
    #[error("session expired")]
    SessionExpired,

    /// Password reset request, token check or confirmation failed.
    #[error("{0}")]
    PasswordReset(String),

    /// Authenticated request to a domain endpoint failed.
    #[error("request failed: {0}")]
    Request(String),
}
