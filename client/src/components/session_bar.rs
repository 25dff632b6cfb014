//! Header strip with the signed-in identity and a logout button.

#[cfg(test)]
#[path = "session_bar_test.rs"]
mod session_bar_test;

use leptos::prelude::*;
use session::SessionSnapshot;

/// Label for the signed-in user: `name`, then `email`, then a placeholder.
pub(crate) fn identity_label(snapshot: &SessionSnapshot) -> String {
    let Some(user) = snapshot.user.as_ref() else {
        return "Signed out".to_owned();
    };
    user.get("name")
        .and_then(serde_json::Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .or_else(|| user.email())
        .unwrap_or("Account")
        .to_owned()
}

#[component]
pub fn SessionBar() -> impl IntoView {
    let session = expect_context::<RwSignal<SessionSnapshot>>();

    let on_logout = move |_| {
        #[cfg(feature = "hydrate")]
        {
            if let Some(store) = crate::state::session::store() {
                store.logout();
            }
        }
    };

    view! {
        <header class="session-bar">
            <span class="session-bar__identity">{move || identity_label(&session.get())}</span>
            <Show when=move || session.get().auth_error.is_some()>
                <span class="session-bar__warning">{move || session.get().auth_error.unwrap_or_default()}</span>
            </Show>
            <button class="session-bar__logout" on:click=on_logout>"Log out"</button>
        </header>
    }
}
