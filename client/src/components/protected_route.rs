//! Role-gated wrapper around a screen.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every routed page renders inside `ProtectedRoute`. On each navigation and
//! each session change it asks `session::decide` whether to render the page,
//! show a loading indicator, or replace the location with a redirect target.
//!
//! DESIGN
//! ======
//! A missing `RwSignal<SessionSnapshot>` context (pre-render outside `App`)
//! counts as "not ready yet" rather than an error, so the component never
//! panics before the session provider is mounted.

#[cfg(test)]
#[path = "protected_route_test.rs"]
mod protected_route_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};
use session::{GuardDecision, SessionAvailability, SessionSnapshot, decide};

/// Path to navigate to for a decision, if any.
fn redirect_target(decision: GuardDecision) -> Option<&'static str> {
    match decision {
        GuardDecision::Redirect(route) => Some(route.path()),
        GuardDecision::Render | GuardDecision::Loading => None,
    }
}

fn evaluate(snapshot: Option<&SessionSnapshot>, require_auth: bool, path: &str) -> GuardDecision {
    decide(SessionAvailability::from_provider(snapshot), require_auth, path)
}

#[component]
pub fn ProtectedRoute(
    /// `false` for public screens (login, password reset).
    #[prop(default = true)]
    require_auth: bool,
    children: ChildrenFn,
) -> impl IntoView {
    let session = use_context::<RwSignal<SessionSnapshot>>();
    let location = use_location();

    let decision = Memo::new(move |_| {
        let path = location.pathname.get();
        let snapshot = session.map(|s| s.get());
        evaluate(snapshot.as_ref(), require_auth, &path)
    });

    let navigate = use_navigate();
    Effect::new(move || {
        if let Some(target) = redirect_target(decision.get()) {
            navigate(target, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });

    view! {
        <Show when=move || decision.get() == GuardDecision::Render fallback=|| view! { <LoadingScreen/> }>
            {children()}
        </Show>
    }
}

#[component]
pub fn LoadingScreen() -> impl IntoView {
    view! {
        <div class="loading-screen" role="status">
            <div class="loading-screen__spinner"></div>
            <p>"Loading..."</p>
        </div>
    }
}
