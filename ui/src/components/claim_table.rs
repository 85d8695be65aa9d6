//! High-risk claims table with pagination

use casemind_core::format::{format_currency, format_date, format_number, humanize_flag, EMPTY};
use casemind_core::types::{HighRiskClaim, HighRiskResponse};
use casemind_core::QueryState;
use leptos::prelude::*;

use crate::components::{ErrorNotice, Skeleton};
use crate::state::error_message;

const COLUMNS: usize = 8;

fn or_empty(value: Option<&str>) -> String {
    value.unwrap_or(EMPTY).to_string()
}

#[component]
fn ClaimRow(
    claim: HighRiskClaim,
    position: u64,
    selected: bool,
    on_select: Callback<String>,
) -> impl IntoView {
    let claim_id = claim.claim_id.clone();
    let los = claim.los.map(|los| format_number(los, 1));
    let stay = format!(
        "LOS: {} hari · Masuk {} · Pulang {}",
        los.as_deref().unwrap_or(EMPTY),
        format_date(claim.admit_dt.as_deref()),
        format_date(claim.discharge_dt.as_deref()),
    );
    let region = format!(
        "{} · {}",
        claim.facility_class.as_deref().unwrap_or("Kelas ?"),
        claim.province_name.as_deref().unwrap_or("Wilayah ?"),
    );
    let peer_mean = claim.peer.as_ref().and_then(|peer| peer.mean);
    let flags = claim.flags.clone();

    view! {
        <tr
            class=if selected { "cursor-pointer bg-slate-800/80" } else { "cursor-pointer hover:bg-slate-800/40" }
            on:click=move |_| on_select.run(claim_id.clone())
        >
            <td class="w-12 text-center text-sm text-[var(--text-muted)]">{position}</td>
            <td class="font-medium">
                <div class="flex flex-col">
                    <span>{claim.claim_id.clone()}</span>
                    <span class="text-sm text-[var(--text-muted)]">
                        {claim.dx_primary_label.clone().unwrap_or_else(|| "Diagnosis tidak tersedia".to_string())}
                    </span>
                    <span class="text-xs text-[var(--text-muted)]">{stay}</span>
                </div>
            </td>
            <td>
                <div class="flex flex-col">
                    <span>{or_empty(claim.facility_name.as_deref())}</span>
                    <span class="text-xs text-[var(--text-muted)]">{region}</span>
                </div>
            </td>
            <td>
                <div class="flex flex-col gap-1">
                    <span class="badge badge-outline">{or_empty(claim.severity_group.as_deref())}</span>
                    <span class="badge">{claim.service_type.clone().unwrap_or_else(|| "Layanan ?".to_string())}</span>
                </div>
            </td>
            <td class="text-right">
                <div class="flex flex-col items-end text-sm">
                    <span>{format_currency(claim.amount_claimed)}</span>
                    <span class="text-[var(--text-muted)]">"Dibayar " {format_currency(claim.amount_paid)}</span>
                    {peer_mean.map(|mean| view! {
                        <span class="text-xs text-[var(--text-muted)]">"Peer mean: " {format_currency(mean)}</span>
                    })}
                </div>
            </td>
            <td class="text-right">
                <div class="flex flex-col items-end">
                    <span class="font-semibold text-rose-400">{format!("{:.2}", claim.risk_score)}</span>
                    <span class="text-xs text-[var(--text-muted)]">
                        {format!("Rules {:.2} · ML {:.2}", claim.rule_score, claim.ml_score_normalized)}
                    </span>
                </div>
            </td>
            <td>
                <div class="flex flex-wrap gap-1">
                    {if flags.is_empty() {
                        view! { <span class="badge badge-outline text-xs">"No flag"</span> }.into_any()
                    } else {
                        flags
                            .iter()
                            .map(|flag| view! { <span class="badge badge-outline text-xs">{humanize_flag(flag)}</span> })
                            .collect_view()
                            .into_any()
                    }}
                </div>
            </td>
            <td>
                {if claim.latest_feedback.is_some() {
                    view! { <span class="badge">"Reviewed"</span> }.into_any()
                } else {
                    view! { <span class="badge badge-outline">"Pending"</span> }.into_any()
                }}
            </td>
        </tr>
    }
}

/// Claims table for the current filters
#[component]
pub fn ClaimTable(
    #[prop(into)] state: Signal<QueryState<HighRiskResponse>>,
    #[prop(into)] selected: Signal<Option<String>>,
    #[prop(into)] page_size: Signal<u32>,
    on_select: Callback<String>,
    on_page: Callback<i64>,
    on_retry: Callback<()>,
) -> impl IntoView {
    let body = move || {
        let current = state.get();
        if let (true, Some(err)) = (current.is_error, current.error.as_ref()) {
            return view! {
                <tr>
                    <td colspan="8">
                        <ErrorNotice
                            title="Gagal memuat klaim"
                            message=error_message(err)
                            on_retry=on_retry
                        />
                    </td>
                </tr>
            }
            .into_any();
        }

        let Some(response) = current.data else {
            return (0..page_size.get())
                .map(|_| view! {
                    <tr>
                        {(0..COLUMNS).map(|_| view! { <td><Skeleton /></td> }).collect_view()}
                    </tr>
                })
                .collect_view()
                .into_any();
        };

        if response.data.is_empty() {
            return view! {
                <tr>
                    <td colspan="8" class="h-32 text-center">
                        <p class="font-medium">"Tidak ada klaim sesuai filter"</p>
                        <p class="text-sm text-[var(--text-muted)]">
                            "Coba ubah filter severity, layanan, atau tanggal."
                        </p>
                    </td>
                </tr>
            }
            .into_any();
        }

        let first = response.meta.first_row();
        let selected = selected.get();
        response
            .data
            .iter()
            .enumerate()
            .map(|(index, claim)| {
                let is_selected = selected.as_deref() == Some(claim.claim_id.as_str());
                view! {
                    <ClaimRow
                        claim=claim.clone()
                        position=first + index as u64
                        selected=is_selected
                        on_select=on_select
                    />
                }
            })
            .collect_view()
            .into_any()
    };

    let page = Signal::derive(move || {
        state.with(|s| s.data.as_ref().map(|r| (r.meta.page, r.meta.total_pages())))
            .unwrap_or((1, 1))
    });
    let is_fetching = Signal::derive(move || state.with(|s| s.is_fetching));

    view! {
        <div class="flex flex-col gap-4 px-4 lg:px-6">
            <div class="card overflow-x-auto">
                <table class="w-full text-sm">
                    <thead>
                        <tr class="text-left text-xs uppercase text-[var(--text-muted)]">
                            <th class="w-12 text-center">"#"</th>
                            <th>"Klaim"</th>
                            <th>"Fasilitas & Wilayah"</th>
                            <th>"Severity / Layanan"</th>
                            <th class="text-right">"Biaya (Claimed / Paid)"</th>
                            <th class="text-right">"Risk Score"</th>
                            <th>"Flags"</th>
                            <th>"Status"</th>
                        </tr>
                    </thead>
                    <tbody>{body}</tbody>
                </table>
            </div>

            <div class="flex flex-wrap items-center justify-between gap-3">
                <div class="text-sm text-[var(--text-muted)]">
                    {move || {
                        let (page, total) = page.get();
                        format!("Halaman {} dari {}", page, total)
                    }}
                </div>
                <div class="flex items-center gap-2">
                    <button
                        class="btn btn-ghost"
                        disabled=move || page.get().0 <= 1 || is_fetching.get()
                        on:click=move |_| on_page.run(i64::from(page.get_untracked().0) - 1)
                    >
                        "Sebelumnya"
                    </button>
                    <button
                        class="btn btn-ghost"
                        disabled=move || { let (p, total) = page.get(); p >= total || is_fetching.get() }
                        on:click=move |_| {
                            let (p, total) = page.get_untracked();
                            on_page.run(i64::from((p + 1).min(total)))
                        }
                    >
                        "Berikutnya"
                    </button>
                </div>
            </div>
        </div>
    }
}
