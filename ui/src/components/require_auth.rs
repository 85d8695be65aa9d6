//! Route guard for signed-in views

use casemind_core::guard::LOGIN_PATH;
use casemind_core::GuardDecision;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use leptos_router::NavigateOptions;

use crate::components::LoadingOverlay;
use crate::state::AppState;

/// Renders `children` for a signed-in user, "Loading session..." until the
/// stored session is restored, and redirects to the login view otherwise.
#[component]
pub fn RequireAuth(children: ChildrenFn) -> impl IntoView {
    let state = expect_context::<AppState>();
    let guard = state.guard();
    let navigate = use_navigate();

    Effect::new(move |_| {
        if matches!(guard.get(), GuardDecision::RedirectToLogin) {
            navigate(
                LOGIN_PATH,
                NavigateOptions {
                    replace: true,
                    ..Default::default()
                },
            );
        }
    });

    move || match guard.get() {
        GuardDecision::Allow(_) => children().into_any(),
        GuardDecision::Pending => {
            view! { <LoadingOverlay message="Loading session..." /> }.into_any()
        }
        GuardDecision::RedirectToLogin => ().into_any(),
    }
}
