//! Cache-aware resources for every screen.
//!
//! Each constructor returns a [`Query`] bound to its key and staleness policy.
//! Reads that need a claim or a scope are disabled until they have one.
//! Writes go through [`QueryCache::mutate`] and invalidate what they change.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::FutureExt;

use crate::error::{ApiError, Result};
use crate::filters::FilterState;
use crate::gateway::ApiGateway;
use crate::query::{Query, QueryCache, QueryKey, StalePolicy};
use crate::services;
use crate::types::{
    ChatExchange, ClaimChatMessage, ClaimSummary, DuplicateClaimRow, FeedbackRecord,
    HighRiskResponse, SeverityMismatchRow, TariffInsightParams, TariffInsightRow,
};
use crate::validation::{FeedbackForm, FieldErrors};

pub use crate::services::DEFAULT_REPORT_LIMIT;

/// Cache keys, one constructor per resource.
pub mod keys {
    use super::*;

    pub const HIGH_RISK_CLAIMS: &str = "high-risk-claims";
    pub const CLAIM_SUMMARY: &str = "claim-summary";
    pub const CLAIM_CHAT: &str = "claim-chat";
    pub const REPORTS: &str = "reports";
    pub const TARIFF_INSIGHT: &str = "tariff-insight";

    pub fn high_risk_claims(filters: &FilterState) -> QueryKey {
        QueryKey::new(HIGH_RISK_CLAIMS).with_params(&filters.to_request_params())
    }

    pub fn claim_summary(claim_id: &str) -> QueryKey {
        QueryKey::new(CLAIM_SUMMARY).with(claim_id)
    }

    pub fn claim_chat(claim_id: &str) -> QueryKey {
        QueryKey::new(CLAIM_CHAT).with(claim_id)
    }

    pub fn severity_mismatch(limit: u32) -> QueryKey {
        QueryKey::new(REPORTS)
            .with("severity-mismatch")
            .with(limit.to_string())
    }

    pub fn duplicate_claims(limit: u32) -> QueryKey {
        QueryKey::new(REPORTS)
            .with("duplicate-claims")
            .with(limit.to_string())
    }

    pub fn tariff_insight(params: &TariffInsightParams) -> QueryKey {
        QueryKey::new(TARIFF_INSIGHT).with_params(&params.to_pairs())
    }
}

/// Staleness per resource.
pub mod stale {
    use super::StalePolicy;

    pub fn high_risk_claims() -> StalePolicy {
        StalePolicy::Manual
    }

    pub fn claim_chat() -> StalePolicy {
        StalePolicy::seconds(5)
    }

    pub fn claim_summary() -> StalePolicy {
        StalePolicy::seconds(30)
    }

    pub fn reports() -> StalePolicy {
        StalePolicy::seconds(60)
    }

    pub fn tariff_insight() -> StalePolicy {
        StalePolicy::seconds(30)
    }
}

fn selected_claim(claim_id: Option<&str>) -> Option<String> {
    claim_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn no_claim_selected() -> ApiError {
    ApiError::Internal("No claim selected".to_string())
}

/// Clears a pending flag when the write finishes, however it finishes.
struct PendingGuard<'a>(&'a AtomicBool);

impl<'a> PendingGuard<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Entry point for views: the gateway plus the shared cache.
#[derive(Clone, Debug)]
pub struct Hooks {
    gateway: ApiGateway,
    cache: QueryCache,
}

impl Hooks {
    pub fn new(gateway: ApiGateway, cache: QueryCache) -> Self {
        Self { gateway, cache }
    }

    pub fn gateway(&self) -> &ApiGateway {
        &self.gateway
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Claims list for one filter set. Only refetched on demand.
    pub fn high_risk_claims(&self, filters: &FilterState) -> Query<HighRiskResponse> {
        let gateway = self.gateway.clone();
        let filters = filters.clone();
        Query::new(
            self.cache.clone(),
            keys::high_risk_claims(&filters),
            stale::high_risk_claims(),
            move || {
                let gateway = gateway.clone();
                let filters = filters.clone();
                async move { services::fetch_high_risk_claims(&gateway, &filters).await }
                    .boxed_local()
            },
        )
    }

    pub fn claim_summary(&self, claim_id: Option<&str>) -> Query<ClaimSummary> {
        let Some(claim_id) = selected_claim(claim_id) else {
            return Query::disabled(self.cache.clone(), stale::claim_summary());
        };
        let gateway = self.gateway.clone();
        Query::new(
            self.cache.clone(),
            keys::claim_summary(&claim_id),
            stale::claim_summary(),
            move || {
                let gateway = gateway.clone();
                let claim_id = claim_id.clone();
                async move { services::fetch_claim_summary(&gateway, &claim_id).await }
                    .boxed_local()
            },
        )
    }

    pub fn claim_chat(&self, claim_id: Option<&str>) -> ClaimChat {
        let claim_id = selected_claim(claim_id);
        let query = match claim_id.clone() {
            Some(id) => {
                let gateway = self.gateway.clone();
                Query::new(
                    self.cache.clone(),
                    keys::claim_chat(&id),
                    stale::claim_chat(),
                    move || {
                        let gateway = gateway.clone();
                        let id = id.clone();
                        async move { services::fetch_claim_chat(&gateway, &id).await }
                            .boxed_local()
                    },
                )
            }
            None => Query::disabled(self.cache.clone(), stale::claim_chat()),
        };

        ClaimChat {
            hooks: self.clone(),
            claim_id,
            query,
            sending: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn claim_feedback(&self, claim_id: Option<&str>) -> ClaimFeedback {
        ClaimFeedback {
            hooks: self.clone(),
            claim_id: selected_claim(claim_id),
            submitting: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn severity_mismatch(&self, limit: u32) -> Query<Vec<SeverityMismatchRow>> {
        let gateway = self.gateway.clone();
        Query::new(
            self.cache.clone(),
            keys::severity_mismatch(limit),
            stale::reports(),
            move || {
                let gateway = gateway.clone();
                async move { services::fetch_severity_mismatch(&gateway, limit).await }
                    .boxed_local()
            },
        )
    }

    pub fn duplicate_claims(&self, limit: u32) -> Query<Vec<DuplicateClaimRow>> {
        let gateway = self.gateway.clone();
        Query::new(
            self.cache.clone(),
            keys::duplicate_claims(limit),
            stale::reports(),
            move || {
                let gateway = gateway.clone();
                async move { services::fetch_duplicate_claims(&gateway, limit).await }
                    .boxed_local()
            },
        )
    }

    /// Enabled only when the parameters name a facility or a province.
    pub fn tariff_insight(
        &self,
        params: Option<&TariffInsightParams>,
    ) -> Query<Vec<TariffInsightRow>> {
        let Some(params) = params.filter(|p| p.is_scoped()).cloned() else {
            return Query::disabled(self.cache.clone(), stale::tariff_insight());
        };
        let gateway = self.gateway.clone();
        Query::new(
            self.cache.clone(),
            keys::tariff_insight(&params),
            stale::tariff_insight(),
            move || {
                let gateway = gateway.clone();
                let params = params.clone();
                async move { services::fetch_tariff_insight(&gateway, &params).await }
                    .boxed_local()
            },
        )
    }
}

/// Chat transcript for one claim plus the send action.
#[derive(Clone)]
pub struct ClaimChat {
    hooks: Hooks,
    claim_id: Option<String>,
    pub query: Query<Vec<ClaimChatMessage>>,
    sending: Arc<AtomicBool>,
}

impl ClaimChat {
    pub fn claim_id(&self) -> Option<&str> {
        self.claim_id.as_deref()
    }

    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::SeqCst)
    }

    /// Post a message and invalidate the transcript so the next read
    /// shows the server's copy of both sides of the exchange.
    pub async fn send_message(&self, message: &str) -> Result<ChatExchange> {
        let claim_id = self.claim_id.as_deref().ok_or_else(no_claim_selected)?;
        let message = message.trim();
        if message.is_empty() {
            let mut errors = FieldErrors::new();
            errors.add("message", "Pesan tidak boleh kosong");
            return Err(ApiError::Validation(errors));
        }

        let _pending = PendingGuard::start(&self.sending);
        self.hooks
            .cache
            .mutate(
                &[keys::claim_chat(claim_id)],
                services::post_claim_chat_message(&self.hooks.gateway, claim_id, message),
            )
            .await
    }
}

/// Feedback submission for one claim.
#[derive(Clone)]
pub struct ClaimFeedback {
    hooks: Hooks,
    claim_id: Option<String>,
    submitting: Arc<AtomicBool>,
}

impl ClaimFeedback {
    pub fn claim_id(&self) -> Option<&str> {
        self.claim_id.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Validate, submit, then invalidate this claim's summary.
    ///
    /// A rejected form fails with [`ApiError::Validation`] and sends nothing.
    pub async fn submit(&self, form: &FeedbackForm) -> Result<FeedbackRecord> {
        let payload = form.validate().map_err(ApiError::Validation)?;
        let claim_id = self.claim_id.as_deref().ok_or_else(no_claim_selected)?;

        let _pending = PendingGuard::start(&self.submitting);
        self.hooks
            .cache
            .mutate(
                &[keys::claim_summary(claim_id)],
                services::submit_claim_feedback(&self.hooks.gateway, claim_id, &payload),
            )
            .await
    }
}
