//! Root application component with routing and the session provider.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};
use session::SessionSnapshot;

use crate::components::protected_route::ProtectedRoute;
use crate::pages::{
    admin::AdminPage, forgot_password::ForgotPasswordPage, home::HomePage, login::LoginPage, payments::PaymentsPage,
    reset_password::ResetPasswordPage,
};

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Provides the session snapshot signal (starting in the bootstrapping state
/// on both server and browser so hydration matches) and starts the browser
/// session store.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let session = RwSignal::new(SessionSnapshot::bootstrapping());
    provide_context(session);

    #[cfg(feature = "hydrate")]
    crate::state::session::start(session);

    view! {
        <Stylesheet id="leptos" href="/pkg/streampay.css"/>
        <Title text="StreamPay"/>

        <Router>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route
                    path=(StaticSegment("pages"), StaticSegment("login"))
                    view=|| view! { <ProtectedRoute require_auth=false><LoginPage/></ProtectedRoute> }
                />
                <Route
                    path=(StaticSegment("pages"), StaticSegment("forgot-password"))
                    view=|| view! { <ProtectedRoute require_auth=false><ForgotPasswordPage/></ProtectedRoute> }
                />
                <Route
                    path=(StaticSegment("pages"), StaticSegment("reset-password"))
                    view=|| view! { <ProtectedRoute require_auth=false><ResetPasswordPage/></ProtectedRoute> }
                />
                <Route
                    path=(StaticSegment("pages"), StaticSegment("payments"))
                    view=|| view! { <ProtectedRoute><PaymentsPage/></ProtectedRoute> }
                />
                <Route
                    path=StaticSegment("admin")
                    view=|| view! { <ProtectedRoute><AdminPage/></ProtectedRoute> }
                />
                <Route path=StaticSegment("") view=|| view! { <ProtectedRoute><HomePage/></ProtectedRoute> }/>
            </Routes>
        </Router>
    }
}
