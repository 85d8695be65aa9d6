//! Claim summary card

use casemind_core::format::{format_number, format_optional_currency, humanize_flag, EMPTY};
use casemind_core::types::ClaimSummary;
use leptos::prelude::*;

use crate::components::{ErrorNotice, FeedbackPanel, Skeleton};
use crate::state::{error_message, refetch, use_query, AppState};

#[component]
fn SummaryBody(summary: ClaimSummary) -> impl IntoView {
    let claim = summary.claim.clone();
    let los = claim.los.map(|los| format_number(los, 1));
    let context = [
        claim.service_type.as_deref(),
        claim.facility_class.as_deref(),
        claim.province_name.as_deref(),
    ]
    .iter()
    .map(|part| part.unwrap_or(EMPTY))
    .collect::<Vec<_>>()
    .join(" · ");
    let costs = format!(
        "Klaim {} · Dibayar {} · Gap {}",
        format_optional_currency(claim.amount_claimed),
        format_optional_currency(claim.amount_paid),
        format_optional_currency(claim.amount_gap),
    );
    let peer = format!(
        "Peer {} · P90 {} · Z {}",
        if summary.peer.key.is_empty() { EMPTY } else { summary.peer.key.as_str() },
        format_optional_currency(summary.peer.p90),
        summary
            .peer
            .cost_zscore
            .map(|z| format_number(z, 2))
            .unwrap_or_else(|| EMPTY.to_string()),
    );
    let generative = summary.generative_summary.clone().filter(|text| !text.trim().is_empty());

    view! {
        <div class="flex flex-wrap gap-2 text-sm">
            <span class="badge">"Severity " {claim.severity_group.clone().unwrap_or_else(|| EMPTY.to_string())}</span>
            <span class="badge badge-outline">"LOS " {los.unwrap_or_else(|| EMPTY.to_string())} " hari"</span>
            <span class="badge badge-outline">{format!("Risk {:.2}", summary.risk_score)}</span>
        </div>
        <p class="text-sm text-[var(--text-muted)]">{context}</p>

        <div class="grid gap-3">
            <div class="rounded-lg border border-slate-700 p-3 text-sm">
                <p class="font-medium">"Ringkasan Biaya"</p>
                <p class="text-[var(--text-muted)]">{costs}</p>
            </div>
            <div class="rounded-lg border border-slate-700 p-3 text-sm">
                <p class="font-medium">"Peer & Z-score"</p>
                <p class="text-[var(--text-muted)]">{peer}</p>
            </div>
            <div class="rounded-lg border border-slate-700 p-3 text-sm">
                <p class="font-medium">"Flags Aktif"</p>
                <div class="flex flex-wrap gap-2 pt-1">
                    {if summary.flags.is_empty() {
                        view! { <span class="text-[var(--text-muted)]">"Tidak ada flag rules"</span> }.into_any()
                    } else {
                        summary
                            .flags
                            .iter()
                            .map(|flag| view! { <span class="badge badge-outline">{humanize_flag(flag)}</span> })
                            .collect_view()
                            .into_any()
                    }}
                </div>
            </div>
        </div>

        {generative.map(|text| view! {
            <div class="rounded-lg border border-blue-800 p-3 text-sm">
                <p class="font-medium">"Ringkasan AI"</p>
                <p class="text-[var(--text-secondary)] whitespace-pre-wrap">{text}</p>
            </div>
        })}

        <div class="space-y-3">
            {summary
                .sections
                .iter()
                .map(|section| view! {
                    <div class="rounded-lg border border-slate-700 p-3 text-sm">
                        <p class="font-medium">{section.title.clone()}</p>
                        <p class="text-[var(--text-muted)] whitespace-pre-wrap">{section.content.clone()}</p>
                    </div>
                })
                .collect_view()}
        </div>

        <p class="text-xs text-[var(--text-muted)]">
            {format!("Model {} · Ruleset {}", summary.model_version, summary.ruleset_version)}
        </p>

        <FeedbackPanel claim_id=summary.claim_id.clone() latest=summary.latest_feedback.clone() />
    }
}

/// Summary, flags and feedback for the selected claim
#[component]
pub fn ClaimDetail(#[prop(into)] claim_id: Signal<Option<String>>) -> impl IntoView {
    let state = expect_context::<AppState>();
    let hooks = state.hooks.clone();
    let make_query = move || hooks.claim_summary(claim_id.get().as_deref());
    let retry_query = make_query.clone();
    let summary = use_query(make_query);
    let on_retry = Callback::new(move |_| refetch(retry_query()));

    let title = move || match claim_id.get() {
        Some(id) => format!("Detail Klaim {}", id),
        None => "Detail Klaim".to_string(),
    };

    let body = move || {
        if claim_id.get().is_none() {
            return view! {
                <p class="text-sm text-[var(--text-muted)]">"Pilih klaim dari tabel untuk melihat ringkasan."</p>
            }
            .into_any();
        }
        let current = summary.get();
        if let Some(data) = current.data {
            return view! { <SummaryBody summary=(*data).clone() /> }.into_any();
        }
        match current.error {
            Some(err) => view! {
                <ErrorNotice
                    title="Gagal memuat ringkasan klaim"
                    message=error_message(&err)
                    on_retry=on_retry
                />
            }
            .into_any(),
            None => view! {
                <div class="flex flex-col gap-4">
                    <Skeleton class="h-6 w-2/3" />
                    <Skeleton class="h-20 w-full" />
                    <Skeleton class="h-20 w-full" />
                    <Skeleton class="h-20 w-full" />
                </div>
            }
            .into_any(),
        }
    };

    view! {
        <div class="card h-full flex flex-col gap-3 p-4">
            <div class="flex items-center justify-between">
                <h3 class="text-lg font-semibold">{title}</h3>
                <button
                    class="btn btn-ghost"
                    disabled=move || claim_id.get().is_none()
                    on:click=move |_| on_retry.run(())
                >
                    "Refresh"
                </button>
            </div>
            <div class="flex flex-col gap-4 max-h-[60vh] overflow-auto">{body}</div>
        </div>
    }
}
