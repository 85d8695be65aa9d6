//! Per-claim copilot chat

use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::{ScrollBehavior, ScrollIntoViewOptions};

use crate::components::{ChatInput, ChatMessage, ErrorNotice, Skeleton, TypingIndicator};
use crate::state::{error_message, refetch, use_query, AppState};

const PROMPT_SUGGESTIONS: [&str; 4] = [
    "Kenapa klaim ini ditandai fraud?",
    "Bandingkan biaya dengan peer group",
    "Apa flag aktif dan tindak lanjutnya?",
    "Dokumen apa yang perlu diverifikasi?",
];

/// Transcript plus message box for the selected claim
#[component]
pub fn ChatPanel(#[prop(into)] claim_id: Signal<Option<String>>) -> impl IntoView {
    let state = expect_context::<AppState>();
    let hooks = state.hooks.clone();

    let transcript = use_query({
        let hooks = hooks.clone();
        move || hooks.claim_chat(claim_id.get().as_deref()).query
    });
    let on_retry = {
        let hooks = hooks.clone();
        Callback::new(move |_| refetch(hooks.claim_chat(claim_id.get_untracked().as_deref()).query))
    };

    let draft = RwSignal::new(String::new());
    let sending = RwSignal::new(false);
    let failure = RwSignal::new(Option::<String>::None);
    let bottom = NodeRef::<leptos::html::Div>::new();

    let on_send = Callback::new(move |_| {
        let message = draft.get_untracked();
        if message.trim().is_empty() || sending.get_untracked() {
            return;
        }
        let chat = hooks.claim_chat(claim_id.get_untracked().as_deref());
        sending.set(true);
        failure.set(None);
        spawn_local(async move {
            match chat.send_message(&message).await {
                Ok(_) => draft.set(String::new()),
                Err(err) => failure.set(Some(error_message(&err))),
            }
            sending.set(false);
        });
    });

    // Keep the newest message in view.
    Effect::new(move |_| {
        let count = transcript.with(|s| s.data.as_ref().map(|messages| messages.len()));
        if count.is_some() {
            if let Some(el) = bottom.get() {
                let options = ScrollIntoViewOptions::new();
                options.set_behavior(ScrollBehavior::Smooth);
                el.scroll_into_view_with_scroll_into_view_options(&options);
            }
        }
    });

    let messages = move || {
        let current = transcript.get();
        if let Some(messages) = current.data {
            if messages.is_empty() {
                return view! {
                    <p class="text-sm text-[var(--text-muted)]">
                        "Belum ada percakapan. Tanyakan sesuatu ke copilot."
                    </p>
                }
                .into_any();
            }
            return messages
                .iter()
                .map(|message| view! { <ChatMessage message=message.clone() /> })
                .collect_view()
                .into_any();
        }
        match current.error {
            Some(err) => view! {
                <ErrorNotice title="Gagal memuat chat" message=error_message(&err) on_retry=on_retry />
            }
            .into_any(),
            None => view! {
                <div class="flex flex-col gap-3">
                    <Skeleton class="h-16 w-full" />
                    <Skeleton class="h-16 w-full" />
                    <Skeleton class="h-16 w-full" />
                </div>
            }
            .into_any(),
        }
    };

    view! {
        <div class="card h-full flex flex-col gap-3 p-4">
            <h3 class="text-lg font-semibold">"Chat Copilot"</h3>
            {move || if claim_id.get().is_none() {
                view! {
                    <p class="text-sm text-[var(--text-muted)]">
                        "Pilih klaim untuk mulai percakapan dengan copilot."
                    </p>
                }
                .into_any()
            } else {
                view! {
                    <div class="flex-1 space-y-3 overflow-auto pr-2 max-h-[50vh]">
                        {messages}
                        <Show when=move || sending.get()>
                            <TypingIndicator />
                        </Show>
                        <div node_ref=bottom></div>
                    </div>
                    <div class="flex flex-wrap gap-2">
                        {PROMPT_SUGGESTIONS
                            .iter()
                            .map(|prompt| view! {
                                <button
                                    class="btn btn-ghost text-xs"
                                    on:click=move |_| draft.set(prompt.to_string())
                                >
                                    {*prompt}
                                </button>
                            })
                            .collect_view()}
                    </div>
                    <Show when=move || failure.get().is_some()>
                        <p class="text-sm text-[var(--accent-error)]">{move || failure.get().unwrap_or_default()}</p>
                    </Show>
                    <ChatInput value=draft on_submit=on_send sending=sending />
                }
                .into_any()
            }}
        </div>
    }
}
