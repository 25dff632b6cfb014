//! Admin section landing page.

use leptos::prelude::*;
use session::{AuthQueries, SessionSnapshot};

use crate::components::session_bar::SessionBar;

#[component]
pub fn AdminPage() -> impl IntoView {
    let session = expect_context::<RwSignal<SessionSnapshot>>();

    view! {
        <div class="admin-page">
            <SessionBar/>
            <main class="admin-page__body">
                <h1>"Administration"</h1>
                <p class="admin-page__role">"Signed in as " {move || session.get().user_role().as_str()}</p>
            </main>
        </div>
    }
}
