//! Login page

use casemind_core::guard::HOME_PATH;
use casemind_core::{services, ApiError, AuthGuard, FieldErrors, LoginForm};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

use crate::components::Header;
use crate::state::{error_message, AppState};

/// Login page
#[component]
pub fn LoginPage() -> impl IntoView {
    let state = expect_context::<AppState>();
    let navigate = use_navigate();

    // Form state
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let is_loading = RwSignal::new(false);
    let field_errors = RwSignal::new(FieldErrors::new());
    let error = RwSignal::new(Option::<String>::None);

    // Redirect if already logged in
    let navigate_for_redirect = navigate.clone();
    let session = state.session.clone();
    let auth = state.auth;
    Effect::new(move |_| {
        auth.track();
        if let Some(path) = AuthGuard::login_redirect(&session) {
            navigate_for_redirect(path, Default::default());
        }
    });

    // Handle form submission
    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if is_loading.get_untracked() {
            return;
        }

        let form = LoginForm::new(email.get_untracked(), password.get_untracked());
        let gateway = state.hooks.gateway().clone();
        let navigate = navigate.clone();

        field_errors.set(FieldErrors::new());
        error.set(None);
        is_loading.set(true);
        spawn_local(async move {
            let result = services::sign_in(&gateway, &form).await;
            is_loading.set(false);

            match result {
                Ok(_) => navigate(HOME_PATH, Default::default()),
                Err(ApiError::Validation(errors)) => field_errors.set(errors),
                Err(e) => {
                    let message = services::sign_in_failure(&e).unwrap_or_else(|| error_message(&e));
                    error.set(Some(message));
                }
            }
        });
    };

    let field_error = move |field: &'static str| {
        move || {
            field_errors.with(|errors| {
                errors.get(field).map(|message| {
                    view! { <p class="text-xs text-[var(--accent-error)] mt-1">{message.to_string()}</p> }
                })
            })
        }
    };

    view! {
        <div class="min-h-screen flex flex-col bg-[var(--bg-primary)]">
            <Header />

            <main class="auth-container flex-1">
                <div class="w-full max-w-md px-4">
                    <div class="auth-card">
                        <div class="auth-header">
                            <h1 class="auth-title text-gradient">"Casemind AI"</h1>
                            <p class="auth-subtitle">"Sign in to review high-risk claims"</p>
                        </div>

                        // Error message
                        <Show when=move || error.get().is_some()>
                            <div class="mb-6 p-4 bg-[var(--accent-error)]/10 border border-[var(--accent-error)]/50
                                        rounded-[var(--radius-md)] text-[var(--accent-error)] text-sm animate-fade-in">
                                {move || error.get().unwrap_or_default()}
                            </div>
                        </Show>

                        <form on:submit=on_submit class="auth-form" novalidate=true>
                            <div class="auth-input-group">
                                <label class="auth-label">"Email"</label>
                                <input
                                    type="email"
                                    prop:value=move || email.get()
                                    on:input=move |ev| email.set(event_target_value(&ev))
                                    placeholder="auditor@casemind.ai"
                                    class="input"
                                />
                                {field_error("email")}
                            </div>

                            <div class="auth-input-group">
                                <label class="auth-label">"Password"</label>
                                <input
                                    type="password"
                                    prop:value=move || password.get()
                                    on:input=move |ev| password.set(event_target_value(&ev))
                                    placeholder="••••••••"
                                    class="input"
                                />
                                {field_error("password")}
                            </div>

                            <button
                                type="submit"
                                disabled=move || is_loading.get()
                                class="btn btn-primary w-full py-3"
                            >
                                <Show when=move || is_loading.get()>
                                    <div class="loading-spinner"></div>
                                </Show>
                                "Sign In"
                            </button>
                        </form>
                    </div>
                </div>
            </main>
        </div>
    }
}
