//! Backend auth endpoints and the transport seam used to reach them.
//!
//! SYSTEM CONTEXT
//! ==============
//! Implementations of [`AuthApi`] only move bytes: they attach the bearer
//! header, perform the request and hand back status + JSON body. Every
//! interpretation of that body (error messages, envelopes, required fields)
//! lives here so it behaves identically in the browser and the CLI.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde_json::Value;

use crate::error::{SessionError, TransportError};
use crate::user::User;

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const ME_PATH: &str = "/api/auth/me";
pub const REQUEST_PASSWORD_RESET_PATH: &str = "/api/auth/request-password-reset";
pub const VERIFY_RESET_TOKEN_PATH: &str = "/api/auth/verify-reset-token";
pub const RESET_PASSWORD_PATH: &str = "/api/auth/reset-password";

pub const GENERIC_LOGIN_ERROR: &str = "Login failed. Please check your credentials.";

/// Status code and decoded body of one backend exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Server-provided error message, if the body carries one.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        error_message(&self.body)
    }

    /// Server message, or a status-based fallback.
    #[must_use]
    pub fn error_message_or_status(&self) -> String {
        self.error_message()
            .unwrap_or_else(|| format!("server returned status {}", self.status))
    }
}

/// HTTP transport for the StreamPay backend.
///
/// Paths are absolute (`/api/...`); implementations prepend their base URL.
/// Non-2xx statuses are returned as `Ok` responses, not errors.
#[async_trait::async_trait(?Send)]
pub trait AuthApi {
    /// # Errors
    ///
    /// Returns [`TransportError`] when no status code could be obtained.
    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, &str)],
        bearer: Option<&str>,
    ) -> Result<ApiResponse, TransportError>;

    /// # Errors
    ///
    /// Returns [`TransportError`] when no status code could be obtained.
    async fn post_json(&self, path: &str, body: &Value, bearer: Option<&str>) -> Result<ApiResponse, TransportError>;
}

/// Decode a raw response body. Empty bodies become `null`; bodies that are
/// not JSON (proxy error pages) are kept as a string.
#[must_use]
pub fn body_from_text(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_owned()))
}

/// Extract a human-readable message from an error body.
///
/// Checks `detail` (a string, or a validation list whose first entry has a
/// `msg`), then `message`, then `error`.
#[must_use]
pub fn error_message(body: &Value) -> Option<String> {
    let object = body.as_object()?;
    if let Some(detail) = object.get("detail") {
        match detail {
            Value::String(s) if !s.trim().is_empty() => return Some(s.clone()),
            Value::Array(items) => {
                if let Some(msg) = items
                    .iter()
                    .find_map(|item| item.get("msg").and_then(Value::as_str))
                {
                    return Some(msg.to_owned());
                }
            }
            _ => {}
        }
    }
    ["message", "error"]
        .iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
        .map(str::to_owned)
}

/// Token and user issued by a successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginGrant {
    pub token: String,
    pub user: User,
}

impl LoginGrant {
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidResponse`] when `token` or `user` is
    /// missing or has the wrong type.
    pub fn from_body(body: &Value) -> Result<Self, SessionError> {
        let token = body
            .get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SessionError::InvalidResponse("login response is missing `token`".into()))?;
        let user = body
            .get("user")
            .cloned()
            .and_then(User::from_value)
            .ok_or_else(|| SessionError::InvalidResponse("login response is missing `user`".into()))?;
        Ok(Self { token: token.to_owned(), user })
    }
}

/// Result of checking a password-reset link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetTokenStatus {
    pub valid: bool,
    pub email: Option<String>,
    pub message: Option<String>,
}

impl ResetTokenStatus {
    /// Interpret a verify-reset-token response. A 2xx body counts as valid
    /// unless it says `"valid": false`.
    #[must_use]
    pub fn from_response(response: &ApiResponse) -> Self {
        if !response.is_ok() {
            return Self { valid: false, email: None, message: response.error_message() };
        }
        let valid = response
            .body
            .get("valid")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        Self {
            valid,
            email: response.body.get("email").and_then(Value::as_str).map(str::to_owned),
            message: response.error_message(),
        }
    }
}
