//! Header component

use casemind_core::guard::LOGIN_PATH;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::state::AppState;

/// Main application header
#[component]
pub fn Header() -> impl IntoView {
    let state = expect_context::<AppState>();
    let navigate = use_navigate();
    let auth = state.auth;

    let user_name = Signal::derive(move || {
        auth.get()
            .record
            .map(|record| record.user.display_name().to_string())
    });

    view! {
        <header class="header h-16 sticky top-0 z-40">
            <div class="h-full max-w-7xl mx-auto px-4 flex items-center justify-between">
                // Logo
                <a href="/" class="logo hover:opacity-80 transition-opacity">
                    <div>
                        <h1 class="text-xl font-bold text-gradient">"Casemind AI"</h1>
                        <p class="text-xs text-[var(--text-muted)] -mt-0.5">"High-risk claims review"</p>
                    </div>
                </a>

                // Navigation
                <nav class="flex items-center gap-2">
                    {move || match user_name.get() {
                        Some(name) => {
                            let state = state.clone();
                            let navigate = navigate.clone();
                            view! {
                                <a href="/" class="btn btn-ghost">"Klaim"</a>
                                <a href="/reports" class="btn btn-ghost">"Reports"</a>
                                <span class="text-sm text-[var(--text-secondary)] px-2">{name}</span>
                                <button
                                    on:click=move |_| {
                                        state.sign_out();
                                        navigate(LOGIN_PATH, Default::default());
                                    }
                                    class="btn btn-ghost"
                                >
                                    "Sign Out"
                                </button>
                            }
                            .into_any()
                        }
                        None => view! {
                            <a href=LOGIN_PATH class="btn btn-primary">"Sign In"</a>
                        }
                        .into_any(),
                    }}
                </nav>
            </div>
        </header>
    }
}
