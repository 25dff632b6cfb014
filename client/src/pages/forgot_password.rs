//! Request a password reset email.

#[cfg(test)]
#[path = "forgot_password_test.rs"]
mod forgot_password_test;

use leptos::prelude::*;

fn validate_email_input(raw: &str) -> Result<String, &'static str> {
    let email = raw.trim();
    if email.is_empty() || !email.contains('@') {
        return Err("Enter the email address you signed up with.");
    }
    Ok(email.to_owned())
}

#[component]
pub fn ForgotPasswordPage() -> impl IntoView {
    let email = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let email_value = match validate_email_input(&email.get()) {
            Ok(value) => value,
            Err(message) => {
                info.set(message.to_owned());
                return;
            }
        };
        busy.set(true);
        info.set("Sending reset link...".to_owned());

        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            if let Some(store) = crate::state::session::store() {
                match store.request_password_reset(&email_value).await {
                    Ok(message) | Err(session::SessionError::PasswordReset(message)) => info.set(message),
                    Err(err) => info.set(err.to_string()),
                }
            }
            busy.set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = email_value;
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Reset your password"</h1>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="email"
                        placeholder="you@example.com"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Send reset link"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <a class="login-link" href="/pages/login">"Back to sign in"</a>
            </div>
        </div>
    }
}
