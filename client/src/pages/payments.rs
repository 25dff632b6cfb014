//! Activation screen for signed-in accounts that have not paid the deposit.
//!
//! The route guard sends every unactivated user here. Once the backend
//! reports the account as activated, a forced refresh updates the session and
//! the guard moves the user on to their home screen.

use leptos::prelude::*;

use crate::components::session_bar::SessionBar;

#[component]
pub fn PaymentsPage() -> impl IntoView {
    let checking = RwSignal::new(false);

    let on_check = move |_| {
        if checking.get() {
            return;
        }
        checking.set(true);
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            if let Some(store) = crate::state::session::store() {
                let _ = store.refresh(true).await;
            }
            checking.set(false);
        });
    };

    view! {
        <div class="payments-page">
            <SessionBar/>
            <main class="payments-page__body">
                <h1>"Activate your account"</h1>
                <p>"Complete the activation deposit to unlock your dashboard."</p>
                <button class="payments-page__check" on:click=on_check disabled=move || checking.get()>
                    {move || if checking.get() { "Checking..." } else { "I've paid, check again" }}
                </button>
            </main>
        </div>
    }
}
