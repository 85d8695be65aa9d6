//! Claims dashboard: filters, the high-risk table and the detail sheet

use leptos::prelude::*;

use crate::components::{
    ChatPanel, ClaimDetail, ClaimTable, FilterBar, FilterHandle, Header, RequireAuth,
};
use crate::state::{refetch, use_query, AppState};

#[component]
fn ClaimsContent() -> impl IntoView {
    let state = expect_context::<AppState>();
    let hooks = state.hooks.clone();
    let filters = FilterHandle::from_location();

    let claims = use_query({
        let hooks = hooks.clone();
        let filters = filters.clone();
        move || hooks.high_risk_claims(&filters.filters())
    });
    let on_sync = {
        let filters = filters.clone();
        Callback::new(move |_| {
            let current = filters.snapshot.get_untracked().filters;
            refetch(hooks.high_risk_claims(&current));
        })
    };

    let selected = {
        let filters = filters.clone();
        Signal::derive(move || filters.selected())
    };
    let page_size = {
        let filters = filters.clone();
        Signal::derive(move || filters.snapshot.with(|s| s.filters.page_size.value()))
    };
    let is_fetching = Signal::derive(move || claims.with(|s| s.is_fetching));

    let on_select = {
        let filters = filters.clone();
        Callback::new(move |claim_id: String| filters.select_claim(claim_id))
    };
    let on_page = {
        let filters = filters.clone();
        Callback::new(move |page: i64| filters.set_page(page))
    };
    let close_sheet = filters.clone();

    let share_url = {
        let filters = filters.clone();
        move || {
            let origin = web_sys::window()
                .and_then(|w| w.location().origin().ok())
                .unwrap_or_default();
            format!("{}{}", origin, filters.shareable_url())
        }
    };

    view! {
        <div class="flex flex-col gap-4 py-4 md:gap-6 md:py-6">
            <FilterBar filters=filters.clone() is_fetching=is_fetching on_sync=on_sync />
            <ClaimTable
                state=claims
                selected=selected
                page_size=page_size
                on_select=on_select
                on_page=on_page
                on_retry=on_sync
            />
            <p class="px-4 lg:px-6 text-xs text-[var(--text-muted)] break-all">
                "Share: " {share_url}
            </p>
        </div>

        <Show when=move || selected.get().is_some()>
            <div class="fixed inset-0 bg-black/60 z-40" on:click={
                let close_sheet = close_sheet.clone();
                move |_| close_sheet.clear_selection()
            }></div>
            <aside class="fixed inset-y-0 right-0 z-50 w-full max-w-5xl overflow-y-auto bg-[var(--bg-primary)] p-4 animate-fade-in">
                <div class="flex items-center justify-between mb-4">
                    <h2 class="text-xl font-semibold">"Detail Klaim & Chat"</h2>
                    <button class="btn btn-ghost" on:click={
                        let close_sheet = close_sheet.clone();
                        move |_| close_sheet.clear_selection()
                    }>
                        "Tutup"
                    </button>
                </div>
                <div class="grid gap-4 xl:grid-cols-[1.4fr_1fr]">
                    <ClaimDetail claim_id=selected />
                    <ChatPanel claim_id=selected />
                </div>
            </aside>
        </Show>
    }
}

/// Claims dashboard page
#[component]
pub fn ClaimsPage() -> impl IntoView {
    view! {
        <div class="min-h-screen flex flex-col bg-[var(--bg-primary)]">
            <Header />
            <main class="flex-1">
                <RequireAuth>
                    <ClaimsContent />
                </RequireAuth>
            </main>
        </div>
    }
}
