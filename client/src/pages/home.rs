//! Authenticated landing page for activated regular users.

use leptos::prelude::*;
use session::SessionSnapshot;

use crate::components::session_bar::SessionBar;

#[component]
pub fn HomePage() -> impl IntoView {
    let session = expect_context::<RwSignal<SessionSnapshot>>();
    let refreshing = RwSignal::new(false);

    let on_refresh = move |_| {
        if refreshing.get() {
            return;
        }
        refreshing.set(true);
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            if let Some(store) = crate::state::session::store() {
                // Failures land in `auth_error`, shown by the session bar.
                let _ = store.refresh(true).await;
            }
            refreshing.set(false);
        });
    };

    let email = move || {
        session
            .get()
            .user
            .and_then(|user| user.email().map(str::to_owned))
            .unwrap_or_default()
    };

    view! {
        <div class="home-page">
            <SessionBar/>
            <main class="home-page__body">
                <h1>"Welcome back"</h1>
                <p class="home-page__email">{email}</p>
                <button class="home-page__refresh" on:click=on_refresh disabled=move || refreshing.get()>
                    {move || if refreshing.get() { "Refreshing..." } else { "Refresh account" }}
                </button>
            </main>
        </div>
    }
}
