//! Chat input component

use leptos::prelude::*;

/// Message box with Enter-to-send (Shift+Enter for a newline)
#[component]
pub fn ChatInput(
    /// Current input value
    value: RwSignal<String>,
    /// Called when user submits
    on_submit: Callback<()>,
    /// Whether a message is being sent
    #[prop(into)]
    sending: Signal<bool>,
    #[prop(default = "Tuliskan pertanyaan")] placeholder: &'static str,
) -> impl IntoView {
    let is_empty = Signal::derive(move || value.get().trim().is_empty());

    let on_keydown = move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            if !is_empty.get_untracked() && !sending.get_untracked() {
                on_submit.run(());
            }
        }
    };

    view! {
        <div class="flex items-end gap-3 pt-3 border-t border-slate-700">
            <textarea
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
                on:keydown=on_keydown
                placeholder=placeholder
                disabled=move || sending.get()
                rows="2"
                class="flex-1 px-4 py-3 bg-slate-900 border border-slate-700 rounded-xl resize-none
                       text-slate-100 placeholder-slate-500
                       focus:outline-none focus:ring-2 focus:ring-blue-500 focus:border-transparent
                       disabled:opacity-50 disabled:cursor-not-allowed"
            ></textarea>
            <button
                on:click=move |_| on_submit.run(())
                disabled=move || sending.get() || is_empty.get()
                class="btn btn-primary"
            >
                {move || if sending.get() { "Mengirim..." } else { "Kirim" }}
            </button>
        </div>
    }
}
