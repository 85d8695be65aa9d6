//! Audit feedback form

use casemind_core::types::{FeedbackDecision, FeedbackSnapshot};
use casemind_core::{ApiError, FeedbackForm, FieldErrors};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::state::{error_message, AppState};

#[component]
fn LatestFeedback(feedback: FeedbackSnapshot) -> impl IntoView {
    view! {
        <div class="mt-2 text-sm text-[var(--text-secondary)]">
            <p>"Keputusan: " <strong>{feedback.decision.unwrap_or_default()}</strong></p>
            {feedback.correction_ratio.map(|ratio| view! { <p>"Correction ratio: " {ratio}</p> })}
            {feedback.notes.map(|notes| view! { <p>"Catatan: " {notes}</p> })}
        </div>
    }
}

fn field_error(errors: RwSignal<FieldErrors>, field: &'static str) -> impl IntoView {
    move || {
        errors.with(|e| {
            e.get(field).map(|message| {
                view! { <p class="text-xs text-[var(--accent-error)]">{message.to_string()}</p> }
            })
        })
    }
}

/// Shows the latest decision when there is one, otherwise the form.
#[component]
pub fn FeedbackPanel(claim_id: String, latest: Option<FeedbackSnapshot>) -> impl IntoView {
    let state = expect_context::<AppState>();
    let submitted = RwSignal::new(latest);
    let decision = RwSignal::new(String::new());
    let ratio = RwSignal::new(String::new());
    let notes = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::new());
    let failure = RwSignal::new(Option::<String>::None);
    let submitting = RwSignal::new(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let form = FeedbackForm::new(decision.get_untracked())
            .with_correction_ratio(ratio.get_untracked())
            .with_notes(notes.get_untracked());
        let feedback = state.hooks.claim_feedback(Some(&claim_id));

        errors.set(FieldErrors::new());
        failure.set(None);
        submitting.set(true);
        spawn_local(async move {
            match feedback.submit(&form).await {
                Ok(record) => {
                    submitted.set(Some(FeedbackSnapshot {
                        decision: Some(record.decision),
                        correction_ratio: record.correction_ratio,
                        notes: record.notes,
                        ..Default::default()
                    }));
                    decision.set(String::new());
                    ratio.set(String::new());
                    notes.set(String::new());
                }
                Err(ApiError::Validation(invalid)) => errors.set(invalid),
                Err(err) => failure.set(Some(error_message(&err))),
            }
            submitting.set(false);
        });
    };

    view! {
        <div class="rounded-lg border border-slate-700 p-3 text-sm">
            <div class="flex items-center justify-between">
                <p class="font-medium">"Audit Feedback"</p>
                <Show when=move || submitting.get()>
                    <span class="text-xs text-[var(--text-muted)]">"Menyimpan..."</span>
                </Show>
            </div>

            {move || match submitted.get() {
                Some(feedback) => view! { <LatestFeedback feedback=feedback /> }.into_any(),
                None => view! {
                    <form class="mt-2 space-y-3" on:submit=on_submit.clone()>
                        <div>
                            <label class="auth-label">"Keputusan"</label>
                            <div class="grid grid-cols-3 gap-2">
                                {FeedbackDecision::ALL
                                    .iter()
                                    .map(|option| {
                                        let value = option.as_str();
                                        view! {
                                            <label class="flex items-center gap-2">
                                                <input
                                                    type="radio"
                                                    name="decision"
                                                    value=value
                                                    prop:checked=move || decision.get() == value
                                                    on:change=move |_| decision.set(value.to_string())
                                                />
                                                {option.label()}
                                            </label>
                                        }
                                    })
                                    .collect_view()}
                            </div>
                            {field_error(errors, "decision")}
                        </div>
                        <div>
                            <label class="auth-label">"Correction Ratio (0-1)"</label>
                            <input
                                class="input"
                                placeholder="0.35"
                                prop:value=move || ratio.get()
                                on:input=move |ev| ratio.set(event_target_value(&ev))
                            />
                            {field_error(errors, "correction_ratio")}
                        </div>
                        <div>
                            <label class="auth-label">"Catatan"</label>
                            <textarea
                                class="input"
                                rows="3"
                                placeholder="Catatan tambahan"
                                prop:value=move || notes.get()
                                on:input=move |ev| notes.set(event_target_value(&ev))
                            ></textarea>
                        </div>
                        <Show when=move || failure.get().is_some()>
                            <p class="text-[var(--accent-error)]">{move || failure.get().unwrap_or_default()}</p>
                        </Show>
                        <button type="submit" class="btn btn-primary" disabled=move || submitting.get()>
                            "Simpan Feedback"
                        </button>
                    </form>
                }
                .into_any(),
            }}
        </div>
    }
}
