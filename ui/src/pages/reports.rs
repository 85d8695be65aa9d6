//! Reports page: severity mismatch, duplicate candidates and tariff insight

use casemind_core::format::{format_currency, format_number, format_optional_currency, EMPTY};
use casemind_core::hooks::DEFAULT_REPORT_LIMIT;
use casemind_core::types::{DuplicateClaimRow, SeverityMismatchRow, TariffInsightParams, TariffInsightRow};
use casemind_core::QueryState;
use leptos::prelude::*;

use crate::components::{ErrorNotice, Header, RequireAuth, Skeleton};
use crate::state::{error_message, refetch, use_query, AppState};

const LIMIT_OPTIONS: [u32; 3] = [20, 50, 100];

fn text(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or(EMPTY).to_string()
}

fn optional_number(value: Option<f64>, digits: usize) -> String {
    value
        .map(|v| format_number(v, digits))
        .unwrap_or_else(|| EMPTY.to_string())
}

fn percent(value: Option<f64>) -> String {
    value
        .map(|v| format!("{}%", format_number(v, 1)))
        .unwrap_or_else(|| EMPTY.to_string())
}

fn blank_to_none(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn severity_row(index: usize, row: &SeverityMismatchRow) -> AnyView {
    view! {
        <tr>
            <td class="font-medium">{index + 1}</td>
            <td>
                <div class="font-semibold">{row.claim_id.clone()}</div>
                <div class="text-xs text-[var(--text-muted)]">{text(row.dx_primary.as_deref())}</div>
            </td>
            <td>
                <div>{text(row.province.as_deref())}</div>
                <div class="text-xs text-[var(--text-muted)]">{text(row.facility_class.as_deref())}</div>
            </td>
            <td>{optional_number(row.los, 1)}</td>
            <td>
                <div>{format_optional_currency(row.claimed)}</div>
                <div class="text-xs text-[var(--text-muted)]">"Peer P90: " {format_optional_currency(row.peer_p90)}</div>
            </td>
            <td class="font-semibold text-red-400">{percent(row.delta_pct)}</td>
        </tr>
    }
    .into_any()
}

fn duplicate_row(index: usize, row: &DuplicateClaimRow) -> AnyView {
    view! {
        <tr>
            <td class="font-medium">{index + 1}</td>
            <td class="font-semibold">{row.claim_id.clone()}</td>
            <td>{text(row.matched_claim_id.as_deref())}</td>
            <td>{text(row.dx_primary.as_deref())}</td>
            <td>{text(row.procedure_code.as_deref())}</td>
            <td>{row.episode_gap_days.map(|gap| format!("{} hari", format_number(gap, 0))).unwrap_or_else(|| EMPTY.to_string())}</td>
        </tr>
    }
    .into_any()
}

fn tariff_row(index: usize, row: &TariffInsightRow) -> AnyView {
    view! {
        <tr>
            <td class="font-medium">{index + 1}</td>
            <td>
                <div class="font-semibold">{text(Some(row.facility_name.as_str()))}</div>
                <div class="text-xs text-[var(--text-muted)]">{text(row.facility_id.as_deref())}</div>
            </td>
            <td>
                <div>{text(Some(row.province_name.as_str()))}</div>
                <div class="text-xs text-[var(--text-muted)]">{text(Some(row.district_name.as_str()))}</div>
            </td>
            <td>{text(row.dx_primary_group.as_deref())}</td>
            <td class="text-right">{format_number(row.claim_count as f64, 0)}</td>
            <td class="text-right">
                <div>{format_currency(row.total_claimed)}</div>
                <div class="text-xs text-[var(--text-muted)]">"Dibayar " {format_currency(row.total_paid)}</div>
            </td>
            <td class="text-right">
                <div>{format_currency(row.total_gap)}</div>
                <div class="text-xs text-[var(--text-muted)]">"Rata-rata " {format_currency(row.avg_gap)}</div>
            </td>
            <td class="text-right">{optional_number(row.avg_cost_zscore, 2)}</td>
        </tr>
    }
    .into_any()
}

/// One report table with its loading, error and empty states.
#[component]
fn ReportTable<T>(
    #[prop(into)] state: Signal<QueryState<Vec<T>>>,
    headers: &'static [&'static str],
    row: fn(usize, &T) -> AnyView,
    error_title: &'static str,
    empty: &'static str,
    on_retry: Callback<()>,
) -> impl IntoView
where
    T: Send + Sync + 'static,
{
    move || {
        let current = state.get();
        if let Some(rows) = current.data {
            if rows.is_empty() {
                return view! {
                    <div class="rounded-md border border-dashed border-slate-700 p-6 text-center text-sm text-[var(--text-muted)]">
                        {empty}
                    </div>
                }
                .into_any();
            }
            return view! {
                <table class="w-full text-sm">
                    <thead>
                        <tr class="text-left text-xs uppercase text-[var(--text-muted)]">
                            {headers.iter().map(|h| view! { <th>{*h}</th> }).collect_view()}
                        </tr>
                    </thead>
                    <tbody>
                        {rows.iter().enumerate().map(|(i, r)| row(i, r)).collect_view()}
                    </tbody>
                </table>
            }
            .into_any();
        }
        match current.error {
            Some(err) => view! {
                <ErrorNotice title=error_title message=error_message(&err) on_retry=on_retry />
            }
            .into_any(),
            None => view! {
                <div class="space-y-2">
                    {(0..6).map(|_| view! { <Skeleton class="h-10 w-full" /> }).collect_view()}
                </div>
            }
            .into_any(),
        }
    }
}

#[component]
fn LimitSelect(limit: RwSignal<u32>) -> impl IntoView {
    view! {
        <select
            class="input w-32"
            prop:value=move || limit.get().to_string()
            on:change=move |ev| {
                let value = event_target_value(&ev).parse().unwrap_or(DEFAULT_REPORT_LIMIT);
                limit.set(value);
            }
        >
            {LIMIT_OPTIONS
                .iter()
                .map(|value| view! { <option value=value.to_string()>{format!("Top {}", value)}</option> })
                .collect_view()}
        </select>
    }
}

#[component]
fn ReportsContent() -> impl IntoView {
    let state = expect_context::<AppState>();
    let hooks = state.hooks.clone();

    let severity_limit = RwSignal::new(DEFAULT_REPORT_LIMIT);
    let duplicate_limit = RwSignal::new(DEFAULT_REPORT_LIMIT);
    let tariff_params = RwSignal::new(Option::<TariffInsightParams>::None);

    let severity = use_query({
        let hooks = hooks.clone();
        move || hooks.severity_mismatch(severity_limit.get())
    });
    let duplicates = use_query({
        let hooks = hooks.clone();
        move || hooks.duplicate_claims(duplicate_limit.get())
    });
    let tariff = use_query({
        let hooks = hooks.clone();
        move || hooks.tariff_insight(tariff_params.get().as_ref())
    });

    let refresh_severity = {
        let hooks = hooks.clone();
        Callback::new(move |_| refetch(hooks.severity_mismatch(severity_limit.get_untracked())))
    };
    let refresh_duplicates = {
        let hooks = hooks.clone();
        Callback::new(move |_| refetch(hooks.duplicate_claims(duplicate_limit.get_untracked())))
    };
    let refresh_tariff = {
        let hooks = hooks.clone();
        Callback::new(move |_| {
            refetch(hooks.tariff_insight(tariff_params.get_untracked().as_ref()))
        })
    };

    // Tariff form
    let province = RwSignal::new(String::new());
    let facility_id = RwSignal::new(String::new());
    let dx_group = RwSignal::new(String::new());
    let unscoped = RwSignal::new(false);
    let on_tariff_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let params = TariffInsightParams {
            province: blank_to_none(province.get_untracked()).map(|p| p.to_uppercase()),
            facility_id: blank_to_none(facility_id.get_untracked()),
            dx_group: blank_to_none(dx_group.get_untracked()),
            ..Default::default()
        };
        unscoped.set(!params.is_scoped());
        tariff_params.set(Some(params));
    };

    let severity_summary = move || {
        severity.with(|s| {
            s.data.as_ref().map(|rows| {
                let top = rows.first();
                (
                    format!("{} klaim", format_number(rows.len() as f64, 0)),
                    format!(
                        "Top delta {} di {} ({})",
                        percent(top.and_then(|r| r.delta_pct)),
                        text(top.and_then(|r| r.facility_class.as_deref())),
                        text(top.and_then(|r| r.province.as_deref())),
                    ),
                )
            })
        })
    };
    let duplicate_summary = move || {
        duplicates.with(|s| {
            s.data.as_ref().map(|rows| {
                let first = rows.first();
                (
                    format!("{} pasangan", format_number(rows.len() as f64, 0)),
                    format!(
                        "Gap tercepat {} ({})",
                        first
                            .and_then(|r| r.episode_gap_days)
                            .map(|gap| format!("{} hari", format_number(gap, 0)))
                            .unwrap_or_else(|| EMPTY.to_string()),
                        text(first.and_then(|r| r.dx_primary.as_deref())),
                    ),
                )
            })
        })
    };

    view! {
        <div class="flex flex-1 flex-col gap-6 p-4 pb-10 md:p-6 max-w-7xl mx-auto w-full">
            <div>
                <h2 class="text-2xl font-bold">"Reports & Analytics"</h2>
                <p class="text-[var(--text-muted)]">"Pantau mismatch severity dan kandidat klaim duplikat secara realtime."</p>
            </div>

            <div class="grid gap-4 md:grid-cols-2">
                <div class="card p-4">
                    <h3 class="font-semibold">"Severity mismatch"</h3>
                    <p class="text-sm text-[var(--text-muted)]">"Klaim severity ringan dengan biaya di atas peer P90."</p>
                    {move || match severity_summary() {
                        Some((count, detail)) => view! {
                            <div class="text-3xl font-semibold mt-2">{count}</div>
                            <p class="text-sm text-[var(--text-muted)]">{detail}</p>
                        }
                        .into_any(),
                        None => view! { <Skeleton class="h-16 w-full" /> }.into_any(),
                    }}
                </div>
                <div class="card p-4">
                    <h3 class="font-semibold">"Duplikasi potensial"</h3>
                    <p class="text-sm text-[var(--text-muted)]">"Episode pasien dengan jarak ≤3 hari dan diagnosis serupa."</p>
                    {move || match duplicate_summary() {
                        Some((count, detail)) => view! {
                            <div class="text-3xl font-semibold mt-2">{count}</div>
                            <p class="text-sm text-[var(--text-muted)]">{detail}</p>
                        }
                        .into_any(),
                        None => view! { <Skeleton class="h-16 w-full" /> }.into_any(),
                    }}
                </div>
            </div>

            <section class="card p-4 flex flex-col gap-4">
                <div class="flex flex-wrap items-center justify-between gap-4">
                    <h3 class="font-semibold">"Daftar severity mismatch"</h3>
                    <div class="flex items-center gap-3">
                        <LimitSelect limit=severity_limit />
                        <button
                            class="btn btn-ghost"
                            disabled=move || severity.with(|s| s.is_fetching)
                            on:click=move |_| refresh_severity.run(())
                        >
                            "Muat ulang"
                        </button>
                    </div>
                </div>
                <ReportTable
                    state=severity
                    headers=&["#", "Klaim", "Wilayah & Faskes", "LOS", "Biaya", "Delta %"]
                    row=severity_row
                    error_title="Gagal memuat data severity mismatch"
                    empty="Tidak ada data severity mismatch untuk limit ini."
                    on_retry=refresh_severity
                />
            </section>

            <section class="card p-4 flex flex-col gap-4">
                <div class="flex flex-wrap items-center justify-between gap-4">
                    <h3 class="font-semibold">"Kandidat klaim duplikat"</h3>
                    <div class="flex items-center gap-3">
                        <LimitSelect limit=duplicate_limit />
                        <button
                            class="btn btn-ghost"
                            disabled=move || duplicates.with(|s| s.is_fetching)
                            on:click=move |_| refresh_duplicates.run(())
                        >
                            "Muat ulang"
                        </button>
                    </div>
                </div>
                <ReportTable
                    state=duplicates
                    headers=&["#", "Klaim", "Pasangan", "Diagnosis", "Prosedur", "Gap"]
                    row=duplicate_row
                    error_title="Gagal memuat kandidat duplikat"
                    empty="Tidak ada kandidat duplikat untuk limit ini."
                    on_retry=refresh_duplicates
                />
            </section>

            <section class="card p-4 flex flex-col gap-4">
                <h3 class="font-semibold">"Tariff insight"</h3>
                <form class="flex flex-wrap items-end gap-4" on:submit=on_tariff_submit>
                    <div class="flex flex-col gap-1">
                        <label class="text-xs uppercase text-[var(--text-muted)]">"Provinsi"</label>
                        <input
                            class="input w-52"
                            placeholder="Contoh: JAWA TENGAH"
                            prop:value=move || province.get()
                            on:input=move |ev| province.set(event_target_value(&ev))
                        />
                    </div>
                    <div class="flex flex-col gap-1">
                        <label class="text-xs uppercase text-[var(--text-muted)]">"Facility ID"</label>
                        <input
                            class="input w-40"
                            prop:value=move || facility_id.get()
                            on:input=move |ev| facility_id.set(event_target_value(&ev))
                        />
                    </div>
                    <div class="flex flex-col gap-1">
                        <label class="text-xs uppercase text-[var(--text-muted)]">"Kelompok DX"</label>
                        <input
                            class="input w-40"
                            prop:value=move || dx_group.get()
                            on:input=move |ev| dx_group.set(event_target_value(&ev))
                        />
                    </div>
                    <button type="submit" class="btn btn-primary">"Tampilkan"</button>
                </form>
                {move || {
                    if unscoped.get() {
                        view! {
                            <p class="text-sm text-[var(--text-muted)]">"Isi provinsi atau facility ID untuk menampilkan tariff insight."</p>
                        }
                        .into_any()
                    } else if tariff_params.with(Option::is_none) {
                        ().into_any()
                    } else {
                        view! {
                            <ReportTable
                                state=tariff
                                headers=&["#", "Faskes", "Wilayah", "DX", "Klaim", "Biaya", "Gap", "Z-score"]
                                row=tariff_row
                                error_title="Gagal memuat tariff insight"
                                empty="Tidak ada data tariff untuk filter ini."
                                on_retry=refresh_tariff
                            />
                        }
                        .into_any()
                    }
                }}
            </section>
        </div>
    }
}

/// Reports page
#[component]
pub fn ReportsPage() -> impl IntoView {
    view! {
        <div class="min-h-screen flex flex-col bg-[var(--bg-primary)]">
            <Header />
            <RequireAuth>
                <ReportsContent />
            </RequireAuth>
        </div>
    }
}
