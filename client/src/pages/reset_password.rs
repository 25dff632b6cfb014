//! Set a new password from an emailed reset link (`?token=...`).
//!
//! SYSTEM CONTEXT
//! ==============
//! The token is checked with the backend before the form is shown; an
//! expired or unknown token shows the backend's message and a link back to
//! the request form.

#[cfg(test)]
#[path = "reset_password_test.rs"]
mod reset_password_test;

use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq)]
enum ResetStage {
    Checking,
    Invalid(String),
    Ready { email: Option<String> },
    Done(String),
}

fn validate_new_password(password: &str, confirm: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 8 characters.");
    }
    if password != confirm {
        return Err("Passwords do not match.");
    }
    Ok(())
}

#[component]
pub fn ResetPasswordPage() -> impl IntoView {
    let query = use_query_map();
    let token = move || query.get().get("token").unwrap_or_default();

    let stage = RwSignal::new(ResetStage::Checking);
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let error = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    #[cfg(feature = "hydrate")]
    Effect::new(move || {
        let token_value = token();
        if token_value.is_empty() {
            stage.set(ResetStage::Invalid("This reset link is missing its token.".to_owned()));
            return;
        }
        leptos::task::spawn_local(async move {
            let Some(store) = crate::state::session::store() else {
                return;
            };
            let next = match store.verify_reset_token(&token_value).await {
                Ok(status) if status.valid => ResetStage::Ready { email: status.email },
                Ok(status) => ResetStage::Invalid(
                    status
                        .message
                        .unwrap_or_else(|| "This reset link is invalid or has expired.".to_owned()),
                ),
                Err(err) => ResetStage::Invalid(err.to_string()),
            };
            stage.set(next);
        });
    });

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        if let Err(message) = validate_new_password(&password.get(), &confirm.get()) {
            error.set(Some(message.to_owned()));
            return;
        }
        busy.set(true);
        error.set(None);

        #[cfg(feature = "hydrate")]
        {
            let token_value = token();
            let password_value = password.get();
            leptos::task::spawn_local(async move {
                if let Some(store) = crate::state::session::store() {
                    match store.reset_password(&token_value, &password_value).await {
                        Ok(message) => stage.set(ResetStage::Done(message)),
                        Err(err) => error.set(Some(err.to_string())),
                    }
                }
                busy.set(false);
            });
        }
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Choose a new password"</h1>
                {move || match stage.get() {
                    ResetStage::Checking => view! { <p class="login-message">"Checking your link..."</p> }.into_any(),
                    ResetStage::Invalid(message) => view! {
                        <p class="login-message login-message--error">{message}</p>
                        <a class="login-link" href="/pages/forgot-password">"Request a new link"</a>
                    }
                    .into_any(),
                    ResetStage::Done(message) => view! {
                        <p class="login-message">{message}</p>
                        <a class="login-link" href="/pages/login">"Sign in"</a>
                    }
                    .into_any(),
                    ResetStage::Ready { email } => view! {
                        {email.map(|email| view! { <p class="login-card__subtitle">{email}</p> })}
                        <form class="login-form" on:submit=on_submit>
                            <input
                                class="login-input"
                                type="password"
                                placeholder="New password"
                                autocomplete="new-password"
                                prop:value=move || password.get()
                                on:input=move |ev| password.set(event_target_value(&ev))
                            />
                            <input
                                class="login-input"
                                type="password"
                                placeholder="Confirm new password"
                                autocomplete="new-password"
                                prop:value=move || confirm.get()
                                on:input=move |ev| confirm.set(event_target_value(&ev))
                            />
                            <button class="login-button" type="submit" disabled=move || busy.get()>
                                "Reset password"
                            </button>
                        </form>
                        <Show when=move || error.get().is_some()>
                            <p class="login-message login-message--error">{move || error.get().unwrap_or_default()}</p>
                        </Show>
                    }
                    .into_any(),
                }}
            </div>
        </div>
    }
}
