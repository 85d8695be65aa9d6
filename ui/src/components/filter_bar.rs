//! Claims list filters

use std::sync::Arc;

use casemind_core::guard::HOME_PATH;
use casemind_core::{FilterController, FilterField, FilterSnapshot, FilterState, PageSize};
use leptos::prelude::*;

use crate::api::{current_location, BrowserHistory};

const SEVERITY_OPTIONS: [(&str, &str); 4] = [
    ("", "Semua Severity"),
    ("ringan", "Ringan"),
    ("sedang", "Sedang"),
    ("berat", "Berat"),
];

const SERVICE_TYPE_OPTIONS: [(&str, &str); 5] = [
    ("", "Semua Layanan"),
    ("RITL", "Rawat Inap (RITL)"),
    ("RJTL", "Rawat Jalan (RJTL)"),
    ("RITP", "RITP"),
    ("RJP", "RJP"),
];

const FACILITY_CLASS_OPTIONS: [(&str, &str); 7] = [
    ("", "Semua Fasilitas"),
    ("RS Kelas A", "RS Kelas A"),
    ("RS Kelas B", "RS Kelas B"),
    ("RS Kelas C", "RS Kelas C"),
    ("RS Kelas D", "RS Kelas D"),
    ("RS Kelas D PRATAMA", "RS Kelas D PRATAMA"),
    ("RS Kelas Belum Ditetapkan", "RS Kelas Tidak Ditetapkan"),
];

/// The page's filter controller plus a signal that follows it.
#[derive(Clone)]
pub struct FilterHandle {
    controller: Arc<FilterController>,
    pub snapshot: RwSignal<FilterSnapshot>,
}

impl FilterHandle {
    /// Initialize from the current URL; every change is written back with
    /// `history.replaceState`.
    pub fn from_location() -> Self {
        let (_, search) = current_location();
        let controller = Arc::new(FilterController::from_url(
            HOME_PATH,
            &search,
            Arc::new(BrowserHistory),
        ));
        let snapshot = RwSignal::new(controller.snapshot());
        controller.subscribe(move |next| {
            snapshot.try_set(next.clone());
        });
        Self {
            controller,
            snapshot,
        }
    }

    pub fn filters(&self) -> FilterState {
        self.snapshot.get().filters
    }

    pub fn selected(&self) -> Option<String> {
        self.snapshot.get().selected
    }

    pub fn value_of(&self, field: FilterField) -> String {
        self.snapshot.with(|s| s.filters.value_of(field))
    }

    pub fn set_field(&self, field: FilterField, value: &str) {
        self.controller.set_field(field, value);
    }

    pub fn set_page(&self, page: i64) {
        self.controller.set_page(page);
    }

    pub fn reset(&self) {
        self.controller.reset();
    }

    pub fn select_claim(&self, claim_id: String) {
        self.controller.select_claim(claim_id);
    }

    pub fn clear_selection(&self) {
        self.controller.clear_selection();
    }

    /// Path and query string of the current view.
    pub fn shareable_url(&self) -> String {
        self.snapshot.track();
        self.controller.shareable_url()
    }
}

#[component]
fn SelectFilter(
    filters: FilterHandle,
    field: FilterField,
    label: &'static str,
    options: &'static [(&'static str, &'static str)],
) -> impl IntoView {
    let current = filters.clone();
    view! {
        <div class="flex flex-col gap-1">
            <label class="text-xs uppercase text-[var(--text-muted)]">{label}</label>
            <select
                class="input"
                prop:value=move || current.value_of(field)
                on:change=move |ev| filters.set_field(field, &event_target_value(&ev))
            >
                {options
                    .iter()
                    .map(|(value, text)| view! { <option value=*value>{*text}</option> })
                    .collect_view()}
            </select>
        </div>
    }
}

/// Committed on `change` (blur or Enter) so typing does not refetch per key.
#[component]
fn InputFilter(
    filters: FilterHandle,
    field: FilterField,
    label: &'static str,
    #[prop(default = "text")] kind: &'static str,
    #[prop(default = "")] placeholder: &'static str,
    #[prop(default = "any")] step: &'static str,
) -> impl IntoView {
    let current = filters.clone();
    view! {
        <div class="flex flex-col gap-1">
            <label class="text-xs uppercase text-[var(--text-muted)]">{label}</label>
            <input
                type=kind
                step=step
                placeholder=placeholder
                class="input w-44"
                prop:value=move || current.value_of(field)
                on:change=move |ev| filters.set_field(field, &event_target_value(&ev))
            />
        </div>
    }
}

/// Filter controls above the claims table
#[component]
pub fn FilterBar(
    filters: FilterHandle,
    #[prop(into)] is_fetching: Signal<bool>,
    on_sync: Callback<()>,
) -> impl IntoView {
    let page_sizes: Vec<String> = PageSize::ALL
        .iter()
        .map(|size| size.value().to_string())
        .collect();

    let is_default = {
        let filters = filters.clone();
        Signal::derive(move || filters.snapshot.with(|s| s.filters.is_default()))
    };
    let refresh_cache = {
        let filters = filters.clone();
        Signal::derive(move || filters.snapshot.with(|s| s.filters.refresh_cache))
    };
    let page_size_value = filters.clone();
    let page_size_change = filters.clone();
    let refresh_change = filters.clone();
    let reset = filters.clone();

    view! {
        <div class="flex flex-col gap-4 px-4 lg:px-6">
            <div class="flex flex-wrap items-end gap-4">
                <SelectFilter filters=filters.clone() field=FilterField::Severity label="Severity" options=&SEVERITY_OPTIONS />
                <SelectFilter filters=filters.clone() field=FilterField::ServiceType label="Layanan" options=&SERVICE_TYPE_OPTIONS />
                <SelectFilter filters=filters.clone() field=FilterField::FacilityClass label="Kelas Fasilitas" options=&FACILITY_CLASS_OPTIONS />
                <div class="flex flex-col gap-1">
                    <label class="text-xs uppercase text-[var(--text-muted)]">"Page Size"</label>
                    <select
                        class="input w-28"
                        prop:value=move || page_size_value.value_of(FilterField::PageSize)
                        on:change=move |ev| page_size_change.set_field(FilterField::PageSize, &event_target_value(&ev))
                    >
                        {page_sizes
                            .into_iter()
                            .map(|size| view! { <option value=size.clone()>{size.clone()}</option> })
                            .collect_view()}
                    </select>
                </div>
            </div>

            <div class="flex flex-wrap items-end gap-4">
                <InputFilter filters=filters.clone() field=FilterField::Province label="Provinsi" placeholder="Contoh: JAWA TENGAH" />
                <InputFilter filters=filters.clone() field=FilterField::Dx label="Kode DX (ICD-10)" placeholder="Contoh: A09" />
                <InputFilter filters=filters.clone() field=FilterField::StartDate label="Admit Start" kind="date" />
                <InputFilter filters=filters.clone() field=FilterField::EndDate label="Admit End" kind="date" />
                <InputFilter filters=filters.clone() field=FilterField::DischargeStart label="Discharge Start" kind="date" />
                <InputFilter filters=filters.clone() field=FilterField::DischargeEnd label="Discharge End" kind="date" />
            </div>

            <div class="flex flex-wrap items-end gap-4">
                <InputFilter filters=filters.clone() field=FilterField::MinRiskScore label="Min Risk Score" kind="number" step="0.01" />
                <InputFilter filters=filters.clone() field=FilterField::MaxRiskScore label="Max Risk Score" kind="number" step="0.01" />
                <InputFilter filters=filters.clone() field=FilterField::MinMlScore label="Min ML Score" kind="number" step="0.01" />

                <div class="flex flex-1 justify-end items-center gap-2">
                    <label class="flex items-center gap-2 text-xs uppercase text-[var(--text-muted)] pr-4">
                        <input
                            type="checkbox"
                            prop:checked=move || refresh_cache.get()
                            on:change=move |ev| {
                                let checked = event_target_checked(&ev);
                                refresh_change.set_field(FilterField::RefreshCache, &checked.to_string());
                            }
                        />
                        "Refresh Cache"
                    </label>
                    <button
                        class="btn btn-ghost"
                        disabled=move || is_default.get()
                        on:click=move |_| reset.reset()
                    >
                        "Reset Filter"
                    </button>
                    <button
                        class="btn btn-secondary"
                        disabled=move || is_fetching.get()
                        on:click=move |_| on_sync.run(())
                    >
                        "Sinkronisasi"
                    </button>
                </div>
            </div>
        </div>
    }
}
