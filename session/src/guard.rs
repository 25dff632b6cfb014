//! Route guard: turns session state into a render / loading / redirect
//! decision for a screen.
//!
//! SYSTEM CONTEXT
//! ==============
//! Evaluated on every navigation by the `ProtectedRoute` component and by the
//! CLI's `guard` command. It is a pure function over [`AuthQueries`], so the
//! live store, a reactive snapshot and test fakes all plug in the same way.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::user::Role;

pub const ADMIN_SECTION: &str = "/admin";

/// Logical redirect targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    /// Activation deposit screen.
    Payments,
    Admin,
    Home,
}

impl Route {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/pages/login",
            Self::Payments => "/pages/payments",
            Self::Admin => ADMIN_SECTION,
            Self::Home => "/",
        }
    }
}

/// Read-only session questions the guard asks.
pub trait AuthQueries {
    /// Bootstrap from storage has not finished yet.
    fn is_loading(&self) -> bool;
    fn is_authenticated(&self) -> bool;
    fn is_activated(&self) -> bool;
    fn user_role(&self) -> Role;
}

/// Whether session state can be trusted yet.
#[derive(Debug)]
pub enum SessionAvailability<'a, S: ?Sized> {
    /// Rendered outside the session provider (e.g. server pre-render).
    NoProvider,
    Loading,
    Ready(&'a S),
}

impl<'a, S: AuthQueries + ?Sized> SessionAvailability<'a, S> {
    #[must_use]
    pub fn from_provider(provider: Option<&'a S>) -> Self {
        match provider {
            None => Self::NoProvider,
            Some(session) if session.is_loading() => Self::Loading,
            Some(session) => Self::Ready(session),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    Loading,
    /// Navigate away; show a loading indicator until the navigation lands.
    Redirect(Route),
}

/// Decide what a screen at `path` may show.
///
/// Rules, first match wins: untrusted state → loading; public screen →
/// render; anonymous → login; not activated → payments; admin outside the
/// admin section → admin; regular user inside it → home; else render.
/// A redirect to the page already being shown renders it instead.
#[must_use]
pub fn decide<S: AuthQueries + ?Sized>(
    availability: SessionAvailability<'_, S>,
    require_auth: bool,
    path: &str,
) -> GuardDecision {
    let session = match availability {
        SessionAvailability::NoProvider | SessionAvailability::Loading => return GuardDecision::Loading,
        SessionAvailability::Ready(session) => session,
    };
    if !require_auth {
        return GuardDecision::Render;
    }

    let target = if !session.is_authenticated() {
        Some(Route::Login)
    } else if !session.is_activated() {
        Some(Route::Payments)
    } else {
        match session.user_role() {
            Role::Admin if !is_admin_path(path) => Some(Route::Admin),
            Role::User if is_admin_path(path) => Some(Route::Home),
            _ => None,
        }
    };

    match target {
        Some(route) if !same_path(route.path(), path) => GuardDecision::Redirect(route),
        _ => GuardDecision::Render,
    }
}

/// `/admin` itself or anything below it; `/administrator` is not included.
#[must_use]
pub fn is_admin_path(path: &str) -> bool {
    let path = strip_query(path);
    path == ADMIN_SECTION
        || path
            .strip_prefix(ADMIN_SECTION)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn same_path(a: &str, b: &str) -> bool {
    let b = strip_query(b);
    let trim = |p: &str| if p.len() > 1 { p.trim_end_matches('/').to_owned() } else { p.to_owned() };
    trim(a) == trim(b)
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}
