//! Filter state for the high-risk claims list and its URL synchronization.
//!
//! [`FilterState`] is a plain value: every operation returns a new state. The
//! [`FilterController`] owns the current state plus the selected claim and
//! mirrors both into the page URL through a [`UrlHistory`].
//!
//! # Query string contract
//!
//! - Parameters use the field names of [`FilterField`] plus `selected`.
//! - An absent parameter means "default value for that field".
//! - Only fields that are set AND differ from the defaults are written, in
//!   [`FilterField::ALL`] order, so equal states always produce equal URLs.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::notify::{Listeners, SubscriptionId};

/// Severity preselected on a fresh dashboard.
pub const DEFAULT_SEVERITY: &str = "sedang";
/// Service type preselected on a fresh dashboard (inpatient).
pub const DEFAULT_SERVICE_TYPE: &str = "RITL";
/// Query parameter carrying the selected claim id.
pub const SELECTED_PARAM: &str = "selected";

/// Allowed page sizes for the claims table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PageSize {
    #[default]
    Twenty,
    Fifty,
    Hundred,
}

impl PageSize {
    pub const ALL: [PageSize; 3] = [PageSize::Twenty, PageSize::Fifty, PageSize::Hundred];

    pub fn value(self) -> u32 {
        match self {
            PageSize::Twenty => 20,
            PageSize::Fifty => 50,
            PageSize::Hundred => 100,
        }
    }

    pub fn from_value(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.value() == value)
    }
}

impl TryFrom<u32> for PageSize {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        PageSize::from_value(value).ok_or_else(|| format!("unsupported page size {}", value))
    }
}

impl From<PageSize> for u32 {
    fn from(size: PageSize) -> Self {
        size.value()
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Every filter the claims list understands, in serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterField {
    Page,
    PageSize,
    Severity,
    ServiceType,
    FacilityClass,
    Province,
    Dx,
    MinRiskScore,
    MaxRiskScore,
    MinMlScore,
    StartDate,
    EndDate,
    DischargeStart,
    DischargeEnd,
    RefreshCache,
}

/// How a field's raw text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Page,
    PageSize,
    Text,
    UpperText,
    Number,
    Flag,
}

impl FilterField {
    pub const ALL: [FilterField; 15] = [
        FilterField::Page,
        FilterField::PageSize,
        FilterField::Severity,
        FilterField::ServiceType,
        FilterField::FacilityClass,
        FilterField::Province,
        FilterField::Dx,
        FilterField::MinRiskScore,
        FilterField::MaxRiskScore,
        FilterField::MinMlScore,
        FilterField::StartDate,
        FilterField::EndDate,
        FilterField::DischargeStart,
        FilterField::DischargeEnd,
        FilterField::RefreshCache,
    ];

    /// Query parameter / API parameter name.
    pub fn name(self) -> &'static str {
        match self {
            FilterField::Page => "page",
            FilterField::PageSize => "page_size",
            FilterField::Severity => "severity",
            FilterField::ServiceType => "service_type",
            FilterField::FacilityClass => "facility_class",
            FilterField::Province => "province",
            FilterField::Dx => "dx",
            FilterField::MinRiskScore => "min_risk_score",
            FilterField::MaxRiskScore => "max_risk_score",
            FilterField::MinMlScore => "min_ml_score",
            FilterField::StartDate => "start_date",
            FilterField::EndDate => "end_date",
            FilterField::DischargeStart => "discharge_start",
            FilterField::DischargeEnd => "discharge_end",
            FilterField::RefreshCache => "refresh_cache",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    fn kind(self) -> FieldKind {
        match self {
            FilterField::Page => FieldKind::Page,
            FilterField::PageSize => FieldKind::PageSize,
            FilterField::Province | FilterField::Dx => FieldKind::UpperText,
            FilterField::MinRiskScore | FilterField::MaxRiskScore | FilterField::MinMlScore => {
                FieldKind::Number
            }
            FilterField::RefreshCache => FieldKind::Flag,
            _ => FieldKind::Text,
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterField::from_name(s).ok_or_else(|| format!("unknown filter '{}'", s))
    }
}

/// Filters and pagination for `GET /claims/high-risk`.
///
/// Invariants: `page >= 1`; `page_size` is one of [`PageSize::ALL`]; text
/// fields are never `Some("")`; numeric thresholds are always finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub page: u32,
    pub page_size: PageSize,
    pub severity: Option<String>,
    pub service_type: Option<String>,
    pub facility_class: Option<String>,
    pub province: Option<String>,
    pub dx: Option<String>,
    pub min_risk_score: Option<f64>,
    pub max_risk_score: Option<f64>,
    pub min_ml_score: Option<f64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub discharge_start: Option<String>,
    pub discharge_end: Option<String>,
    pub refresh_cache: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PageSize::default(),
            severity: Some(DEFAULT_SEVERITY.to_string()),
            service_type: Some(DEFAULT_SERVICE_TYPE.to_string()),
            facility_class: None,
            province: None,
            dx: None,
            min_risk_score: None,
            max_risk_score: None,
            min_ml_score: None,
            start_date: None,
            end_date: None,
            discharge_start: None,
            discharge_end: None,
            refresh_cache: false,
        }
    }
}

/// Comparable form of a [`FilterState`]: one string per field, in field
/// order, with unset values coerced to `""`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedFilters(Vec<(FilterField, String)>);

impl NormalizedFilters {
    pub fn get(&self, field: FilterField) -> &str {
        self.0
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterField, &str)> {
        self.0.iter().map(|(f, v)| (*f, v.as_str()))
    }
}

fn clean_text(raw: &str, upper: bool) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else if upper {
        Some(trimmed.to_uppercase())
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse a threshold. Anything that is not a finite number is unset.
fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_page(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|p| *p >= 1)
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "on" | "yes")
}

fn format_number(value: f64) -> String {
    format!("{}", value)
}

impl FilterState {
    /// Initialize from a URL query string (with or without the leading `?`).
    ///
    /// Recognized parameters are parsed into their typed form; anything absent
    /// or unparsable keeps the default for that field.
    pub fn from_query(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let mut state = Self::default();
        let mut seen: Vec<FilterField> = Vec::new();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let Some(field) = FilterField::from_name(&key) else {
                continue;
            };
            // First occurrence wins, like URLSearchParams::get.
            if seen.contains(&field) {
                continue;
            }
            seen.push(field);
            state.apply_url_value(field, &value);
        }

        state
    }

    fn apply_url_value(&mut self, field: FilterField, raw: &str) {
        match field.kind() {
            FieldKind::Page => {
                if let Some(page) = parse_page(raw) {
                    self.page = page;
                }
            }
            FieldKind::PageSize => {
                if let Some(size) = raw.trim().parse::<u32>().ok().and_then(PageSize::from_value) {
                    self.page_size = size;
                }
            }
            // An empty `severity=` or `service_type=` keeps the default.
            FieldKind::Text | FieldKind::UpperText => {
                if let Some(value) = clean_text(raw, field.kind() == FieldKind::UpperText) {
                    self.assign_text(field, Some(value));
                }
            }
            FieldKind::Number => self.assign_number(field, parse_number(raw)),
            FieldKind::Flag => self.refresh_cache = raw.trim() == "true",
        }
    }

    fn assign_text(&mut self, field: FilterField, value: Option<String>) {
        let slot = match field {
            FilterField::Severity => &mut self.severity,
            FilterField::ServiceType => &mut self.service_type,
            FilterField::FacilityClass => &mut self.facility_class,
            FilterField::Province => &mut self.province,
            FilterField::Dx => &mut self.dx,
            FilterField::StartDate => &mut self.start_date,
            FilterField::EndDate => &mut self.end_date,
            FilterField::DischargeStart => &mut self.discharge_start,
            FilterField::DischargeEnd => &mut self.discharge_end,
            _ => return,
        };
        *slot = value;
    }

    fn assign_number(&mut self, field: FilterField, value: Option<f64>) {
        let slot = match field {
            FilterField::MinRiskScore => &mut self.min_risk_score,
            FilterField::MaxRiskScore => &mut self.max_risk_score,
            FilterField::MinMlScore => &mut self.min_ml_score,
            _ => return,
        };
        *slot = value;
    }

    /// Replace one field from user input.
    ///
    /// Blank input clears the field. Changing anything other than `page`
    /// returns to page 1, since the result set shifts.
    pub fn set_field(&self, field: FilterField, value: &str) -> Self {
        if field == FilterField::Page {
            let page = value.trim().parse::<i64>().unwrap_or(1);
            return self.set_page(page);
        }

        let mut next = self.clone();
        match field.kind() {
            FieldKind::PageSize => {
                next.page_size = value
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .and_then(PageSize::from_value)
                    .unwrap_or_default();
            }
            FieldKind::Text | FieldKind::UpperText => {
                next.assign_text(field, clean_text(value, field.kind() == FieldKind::UpperText));
            }
            FieldKind::Number => next.assign_number(field, parse_number(value)),
            FieldKind::Flag => next.refresh_cache = parse_flag(value),
            FieldKind::Page => {}
        }
        next.page = 1;
        next
    }

    /// Replace only the page, clamped to be at least 1.
    pub fn set_page(&self, page: i64) -> Self {
        let mut next = self.clone();
        next.page = u32::try_from(page.max(1)).unwrap_or(u32::MAX);
        next
    }

    /// The default filter set.
    pub fn reset(&self) -> Self {
        Self::default()
    }

    /// Current value of a field as shown in an input, `""` when unset.
    pub fn value_of(&self, field: FilterField) -> String {
        match field {
            FilterField::Page => self.page.to_string(),
            FilterField::PageSize => self.page_size.value().to_string(),
            FilterField::Severity => self.severity.clone().unwrap_or_default(),
            FilterField::ServiceType => self.service_type.clone().unwrap_or_default(),
            FilterField::FacilityClass => self.facility_class.clone().unwrap_or_default(),
            FilterField::Province => self.province.clone().unwrap_or_default(),
            FilterField::Dx => self.dx.clone().unwrap_or_default(),
            FilterField::MinRiskScore => self.min_risk_score.map(format_number).unwrap_or_default(),
            FilterField::MaxRiskScore => self.max_risk_score.map(format_number).unwrap_or_default(),
            FilterField::MinMlScore => self.min_ml_score.map(format_number).unwrap_or_default(),
            FilterField::StartDate => self.start_date.clone().unwrap_or_default(),
            FilterField::EndDate => self.end_date.clone().unwrap_or_default(),
            FilterField::DischargeStart => self.discharge_start.clone().unwrap_or_default(),
            FilterField::DischargeEnd => self.discharge_end.clone().unwrap_or_default(),
            FilterField::RefreshCache => self.refresh_cache.to_string(),
        }
    }

    /// Comparable form used for every "is default" decision.
    pub fn normalized(&self) -> NormalizedFilters {
        NormalizedFilters(
            FilterField::ALL
                .into_iter()
                .map(|field| (field, self.value_of(field)))
                .collect(),
        )
    }

    pub fn is_default(&self) -> bool {
        self.normalized() == Self::default().normalized()
    }

    /// Fields that are set and differ from the defaults, in field order.
    pub fn non_default_pairs(&self) -> Vec<(FilterField, String)> {
        let defaults = Self::default().normalized();
        self.normalized()
            .iter()
            .filter(|(field, value)| !value.is_empty() && *value != defaults.get(*field))
            .map(|(field, value)| (field, value.to_string()))
            .collect()
    }

    /// Minimal, stable query string for a shareable URL (no leading `?`).
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (field, value) in self.non_default_pairs() {
            serializer.append_pair(field.name(), &value);
        }
        serializer.finish()
    }

    /// Every defined field, defaults included, as sent to the API.
    pub fn to_request_params(&self) -> Vec<(String, String)> {
        self.normalized()
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(field, value)| (field.name().to_string(), value.to_string()))
            .collect()
    }
}

/// Read the selected claim id from a URL query string.
pub fn selected_from_query(query: &str) -> Option<String> {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .find(|(key, _)| key == SELECTED_PARAM)
        .and_then(|(_, value)| clean_text(&value, false))
}

/// Location seam for URL synchronization.
pub trait UrlHistory: Send + Sync {
    /// Replace the current location with `url` (path plus optional query).
    ///
    /// Implementations must not add a navigation entry and must not scroll.
    fn replace(&self, url: &str);
}

/// In-memory history, used by terminal front-ends and tests.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    entries: Mutex<Vec<String>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The URL most recently written.
    pub fn current(&self) -> Option<String> {
        self.entries.lock().last().cloned()
    }

    /// Number of replacements performed so far.
    pub fn replace_count(&self) -> usize {
        self.entries.lock().len()
    }
}

impl UrlHistory for MemoryHistory {
    fn replace(&self, url: &str) {
        self.entries.lock().push(url.to_string());
    }
}

/// Filters plus the claim currently open in the detail view.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSnapshot {
    pub filters: FilterState,
    pub selected: Option<String>,
}

/// Owns the claims-list filter state and keeps the URL in lockstep with it.
pub struct FilterController {
    path: String,
    state: RwLock<FilterSnapshot>,
    history: Arc<dyn UrlHistory>,
    listeners: Listeners<FilterSnapshot>,
}

impl FilterController {
    /// Initialize from the current URL and write back its normalized form.
    pub fn from_url(path: impl Into<String>, query: &str, history: Arc<dyn UrlHistory>) -> Self {
        let controller = Self {
            path: path.into(),
            state: RwLock::new(FilterSnapshot {
                filters: FilterState::from_query(query),
                selected: selected_from_query(query),
            }),
            history,
            listeners: Listeners::new(),
        };
        controller.synchronize();
        controller
    }

    pub fn snapshot(&self) -> FilterSnapshot {
        self.state.read().clone()
    }

    pub fn filters(&self) -> FilterState {
        self.state.read().filters.clone()
    }

    pub fn selected(&self) -> Option<String> {
        self.state.read().selected.clone()
    }

    pub fn is_default(&self) -> bool {
        self.state.read().filters.is_default()
    }

    pub fn set_field(&self, field: FilterField, value: &str) {
        self.commit(|snapshot| snapshot.filters = snapshot.filters.set_field(field, value));
    }

    pub fn set_page(&self, page: i64) {
        self.commit(|snapshot| snapshot.filters = snapshot.filters.set_page(page));
    }

    /// Back to the default filters, with no claim selected.
    pub fn reset(&self) {
        self.commit(|snapshot| {
            snapshot.filters = snapshot.filters.reset();
            snapshot.selected = None;
        });
    }

    pub fn select_claim(&self, claim_id: impl Into<String>) {
        let claim_id = clean_text(&claim_id.into(), false);
        self.commit(|snapshot| snapshot.selected = claim_id);
    }

    pub fn clear_selection(&self) {
        self.commit(|snapshot| snapshot.selected = None);
    }

    /// Query string for the current state, `selected` included.
    pub fn query_string(&self) -> String {
        let snapshot = self.state.read();
        let mut query = snapshot.filters.to_query_string();
        if let Some(selected) = snapshot.selected.as_deref() {
            let mut serializer = form_urlencoded::Serializer::new(String::new());
            serializer.append_pair(SELECTED_PARAM, selected);
            if !query.is_empty() {
                query.push('&');
            }
            query.push_str(&serializer.finish());
        }
        query
    }

    /// Path plus query string, without a trailing `?` when there is no query.
    pub fn shareable_url(&self) -> String {
        let query = self.query_string();
        if query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, query)
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&FilterSnapshot) + Send + Sync + 'static,
    {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn commit(&self, update: impl FnOnce(&mut FilterSnapshot)) {
        let changed = {
            let mut guard = self.state.write();
            let before = guard.clone();
            update(&mut guard);
            (*guard != before).then(|| guard.clone())
        };

        if let Some(snapshot) = changed {
            self.synchronize();
            self.listeners.emit(&snapshot);
        }
    }

    fn synchronize(&self) {
        let url = self.shareable_url();
        debug!(url = %url, "Synchronizing filter state to URL");
        self.history.replace(&url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_default_state_serializes_to_empty_query() {
        assert_eq!(FilterState::default().to_query_string(), "");
        assert!(FilterState::default().is_default());
    }

    #[test]
    fn test_from_empty_query_is_default() {
        assert_eq!(FilterState::from_query(""), FilterState::default());
        assert_eq!(FilterState::from_query("?"), FilterState::default());
    }

    #[test]
    fn test_severity_change_yields_minimal_query() {
        let state = FilterState::default()
            .set_page(4)
            .set_field(FilterField::Severity, "berat");
        assert_eq!(state.page, 1);
        assert_eq!(state.to_query_string(), "severity=berat");
    }

    #[test]
    fn test_set_field_resets_page_for_every_non_page_field() {
        let base = FilterState::default().set_page(7);
        for field in FilterField::ALL.into_iter().filter(|f| *f != FilterField::Page) {
            let next = base.set_field(field, "0.5");
            assert_eq!(next.page, 1, "{field} should reset the page");
        }
    }

    #[test]
    fn test_set_page_keeps_other_fields() {
        let state = FilterState::default()
            .set_field(FilterField::Province, "jawa tengah")
            .set_page(3);
        assert_eq!(state.page, 3);
        assert_eq!(state.province.as_deref(), Some("JAWA TENGAH"));
    }

    #[rstest]
    #[case(0, 1)]
    #[case(-5, 1)]
    #[case(1, 1)]
    #[case(12, 12)]
    fn test_set_page_clamps(#[case] input: i64, #[case] expected: u32) {
        assert_eq!(FilterState::default().set_page(input).page, expected);
    }

    #[test]
    fn test_blank_value_clears_field() {
        let state = FilterState::default().set_field(FilterField::Severity, "   ");
        assert_eq!(state.severity, None);
        assert_eq!(state.value_of(FilterField::Severity), "");
    }

    #[rstest]
    #[case("abc")]
    #[case("NaN")]
    #[case("inf")]
    #[case("")]
    fn test_non_finite_threshold_is_unset(#[case] raw: &str) {
        let state = FilterState::default().set_field(FilterField::MinRiskScore, raw);
        assert_eq!(state.min_risk_score, None);
        let parsed = FilterState::from_query(&format!("min_risk_score={}", raw));
        assert_eq!(parsed.min_risk_score, None);
    }

    #[rstest]
    #[case("page=0", 1)]
    #[case("page=-3", 1)]
    #[case("page=abc", 1)]
    #[case("page=5", 5)]
    fn test_page_parsing(#[case] query: &str, #[case] expected: u32) {
        assert_eq!(FilterState::from_query(query).page, expected);
    }

    #[rstest]
    #[case("page_size=50", PageSize::Fifty)]
    #[case("page_size=100", PageSize::Hundred)]
    #[case("page_size=37", PageSize::Twenty)]
    #[case("page_size=x", PageSize::Twenty)]
    fn test_page_size_parsing(#[case] query: &str, #[case] expected: PageSize) {
        assert_eq!(FilterState::from_query(query).page_size, expected);
    }

    #[test]
    fn test_from_query_parses_typed_fields() {
        let state = FilterState::from_query(
            "?page=2&page_size=50&severity=berat&service_type=RJTL&facility_class=RS+Kelas+A\
             &province=jawa%20barat&dx=a09&min_risk_score=0.75&max_risk_score=1\
             &min_ml_score=-0.2&start_date=2024-01-01&end_date=2024-02-01\
             &discharge_start=2024-01-05&discharge_end=2024-02-05&refresh_cache=true&selected=C-9",
        );
        assert_eq!(state.page, 2);
        assert_eq!(state.page_size, PageSize::Fifty);
        assert_eq!(state.severity.as_deref(), Some("berat"));
        assert_eq!(state.service_type.as_deref(), Some("RJTL"));
        assert_eq!(state.facility_class.as_deref(), Some("RS Kelas A"));
        assert_eq!(state.province.as_deref(), Some("JAWA BARAT"));
        assert_eq!(state.dx.as_deref(), Some("A09"));
        assert_eq!(state.min_risk_score, Some(0.75));
        assert_eq!(state.max_risk_score, Some(1.0));
        assert_eq!(state.min_ml_score, Some(-0.2));
        assert_eq!(state.start_date.as_deref(), Some("2024-01-01"));
        assert_eq!(state.discharge_end.as_deref(), Some("2024-02-05"));
        assert!(state.refresh_cache);
    }

    #[test]
    fn test_round_trip_preserves_normalized_form() {
        let state = FilterState::default()
            .set_field(FilterField::FacilityClass, "RS Kelas B")
            .set_field(FilterField::Dx, "J18")
            .set_field(FilterField::MaxRiskScore, "0.9")
            .set_field(FilterField::PageSize, "100")
            .set_field(FilterField::RefreshCache, "true")
            .set_field(FilterField::EndDate, "2024-03-31")
            .set_page(6);

        let query = state.to_query_string();
        assert_eq!(
            query,
            "page=6&page_size=100&facility_class=RS+Kelas+B&dx=J18&max_risk_score=0.9\
             &end_date=2024-03-31&refresh_cache=true"
        );
        assert_eq!(FilterState::from_query(&query).normalized(), state.normalized());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let state = FilterState::default()
            .set_field(FilterField::Province, "ACEH")
            .set_page(3);
        let once = state.reset();
        assert_eq!(once.reset(), once);
        assert!(once.is_default());
    }

    #[test]
    fn test_request_params_include_defaults_and_skip_unset() {
        let params = FilterState::default()
            .set_field(FilterField::Dx, "a09")
            .to_request_params();
        let names: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            vec!["page", "page_size", "severity", "service_type", "dx", "refresh_cache"]
        );
        assert!(params.iter().all(|(_, v)| !v.is_empty()));
    }

    #[test]
    fn test_selected_from_query() {
        assert_eq!(selected_from_query("severity=berat&selected=C-1"), Some("C-1".to_string()));
        assert_eq!(selected_from_query("selected="), None);
        assert_eq!(selected_from_query(""), None);
    }

    #[test]
    fn test_controller_synchronizes_url() {
        let history = Arc::new(MemoryHistory::new());
        let controller = FilterController::from_url("/", "?severity=berat&page=3", history.clone());
        assert_eq!(history.current().as_deref(), Some("/?page=3&severity=berat"));

        controller.set_field(FilterField::ServiceType, "RJTL");
        assert_eq!(
            history.current().as_deref(),
            Some("/?severity=berat&service_type=RJTL")
        );

        controller.select_claim("C-42");
        assert_eq!(
            history.current().as_deref(),
            Some("/?severity=berat&service_type=RJTL&selected=C-42")
        );

        controller.reset();
        assert_eq!(history.current().as_deref(), Some("/"));
        assert_eq!(controller.selected(), None);
        assert!(controller.is_default());
    }

    #[test]
    fn test_controller_notifies_only_on_change() {
        let history = Arc::new(MemoryHistory::new());
        let controller = FilterController::from_url("/", "", history.clone());
        let hits = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&hits);
        controller.subscribe(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        });

        controller.set_page(1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(history.replace_count(), 1);

        controller.set_page(2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(history.current().as_deref(), Some("/?page=2"));
    }
}
