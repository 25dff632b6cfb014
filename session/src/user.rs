//! The signed-in user record.
//!
//! DESIGN
//! ======
//! The backend owns the user schema; the client only depends on `role` and
//! `is_activated`. The record is therefore kept as the raw JSON object and
//! every other profile field passes through untouched, so persisting and
//! re-reading a user never drops data.

#[cfg(test)]
#[path = "user_test.rs"]
mod user_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Access level derived from the user's `role` field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    /// Parse a role string. Anything other than `admin` is a regular user.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("admin") { Self::Admin } else { Self::User }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

/// User record as returned by `/api/auth/login` and `/api/auth/me`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct User(Map<String, Value>);

impl User {
    /// Wrap a JSON value, which must be an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Interpret a `/api/auth/me` body, which is either `{ "user": {...} }`
    /// or the user fields directly.
    #[must_use]
    pub fn from_me_response(body: Value) -> Option<Self> {
        match body {
            Value::Object(mut map) => match map.remove("user") {
                Some(Value::Object(inner)) => Some(Self(inner)),
                Some(other) => {
                    map.insert("user".to_owned(), other);
                    Some(Self(map))
                }
                None => Some(Self(map)),
            },
            _ => None,
        }
    }

    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Role after unwrapping one nested `user` object; `User` when absent.
    #[must_use]
    pub fn role(&self) -> Role {
        self.profile()
            .get("role")
            .and_then(Value::as_str)
            .map(Role::parse)
            .unwrap_or_default()
    }

    /// Whether the account has completed its activation deposit.
    #[must_use]
    pub fn is_activated(&self) -> bool {
        is_truthy_flag(self.profile().get("is_activated"))
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.profile().get("email").and_then(Value::as_str)
    }

    /// User id rendered as a string; numeric ids are accepted.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        match self.profile().get("id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// The record itself, or its nested `user` object when present.
    fn profile(&self) -> &Map<String, Value> {
        match self.0.get("user") {
            Some(Value::Object(inner)) => inner,
            _ => &self.0,
        }
    }
}

/// `true`, `"true"` and `1` count as set; every other encoding does not.
#[must_use]
pub fn is_truthy_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true",
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        _ => false,
    }
}
