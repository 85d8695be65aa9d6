//! Casemind AI dashboard - Leptos frontend
//!
//! Browser client for reviewing high-risk claims. Filters, session handling
//! and the query cache come from `casemind-core`; this crate supplies the
//! browser adapters and the views.

pub mod api;
pub mod components;
pub mod pages;
pub mod state;

use leptos::prelude::*;
use leptos_meta::{provide_meta_context, Title};
use leptos_router::{
    components::{Route, Router, Routes},
    path,
};

use pages::{claims::ClaimsPage, login::LoginPage, reports::ReportsPage};
use state::AppState;

/// Main application component
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    // Initialize global state
    let app_state = AppState::new();
    app_state.hydrate();
    provide_context(app_state);

    view! {
        <Title text="Casemind AI" />
        <Router>
            <main class="min-h-screen bg-slate-900 text-slate-100">
                <Routes fallback=|| view! { <NotFound /> }>
                    <Route path=path!("/") view=ClaimsPage />
                    <Route path=path!("/reports") view=ReportsPage />
                    <Route path=path!("/login") view=LoginPage />
                </Routes>
            </main>
        </Router>
    }
}

/// 404 Not Found page
#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="min-h-screen flex items-center justify-center">
            <div class="text-center">
                <h1 class="text-6xl font-bold text-slate-500 mb-4">"404"</h1>
                <p class="text-xl text-slate-400 mb-8">"Page not found"</p>
                <a
                    href="/"
                    class="px-6 py-3 bg-blue-600 hover:bg-blue-700 rounded-lg font-medium transition-colors"
                >
                    "Go Home"
                </a>
            </div>
        </div>
    }
}
