//! API request/response types for the Casemind claims API.
//!
//! Everything here is a read-only projection of server-computed state. Fields
//! the server may omit or null out are `Option` or `#[serde(default)]`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `{ "data": ... }` envelope used by every claims/reports endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

// ============= Authentication Types =============

/// Authenticated user attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl AuthUser {
    /// Name to greet the user with.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    pub expires_at: String,
    pub user: AuthUser,
}

// ============= High-Risk Claims =============

/// Peer cost statistics attached to a list row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeerStats {
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub p90: Option<f64>,
}

/// Most recent auditor decision as echoed back by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSnapshot {
    #[serde(default)]
    pub decision: Option<String>,
    #[serde(default)]
    pub correction_ratio: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighRiskClaim {
    pub claim_id: String,
    #[serde(default)]
    pub facility_id: Option<String>,
    #[serde(default)]
    pub facility_name: Option<String>,
    #[serde(default)]
    pub facility_class: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub severity_group: Option<String>,
    #[serde(default)]
    pub province_name: Option<String>,
    #[serde(default)]
    pub dx_primary_code: Option<String>,
    #[serde(default)]
    pub dx_primary_label: Option<String>,
    #[serde(default)]
    pub dx_primary_group: Option<String>,
    #[serde(default)]
    pub amount_claimed: f64,
    #[serde(default)]
    pub amount_paid: f64,
    #[serde(default)]
    pub amount_gap: f64,
    #[serde(default)]
    pub los: Option<f64>,
    #[serde(default)]
    pub risk_score: f64,
    #[serde(default)]
    pub rule_score: f64,
    #[serde(default)]
    pub ml_score: f64,
    #[serde(default)]
    pub ml_score_normalized: f64,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub duplicate_pattern: bool,
    #[serde(default)]
    pub peer: Option<PeerStats>,
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub ruleset_version: Option<String>,
    #[serde(default)]
    pub admit_dt: Option<String>,
    #[serde(default)]
    pub discharge_dt: Option<String>,
    #[serde(default)]
    pub latest_feedback: Option<FeedbackSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighRiskMeta {
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    #[serde(default)]
    pub model_version: String,
    #[serde(default)]
    pub ruleset_version: String,
    #[serde(default)]
    pub filters: Option<serde_json::Value>,
}

impl HighRiskMeta {
    /// Number of pages, never less than one.
    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 1;
        }
        let pages = self.total.div_ceil(u64::from(self.page_size));
        u32::try_from(pages.max(1)).unwrap_or(u32::MAX)
    }

    /// 1-based row number of the first row on this page.
    pub fn first_row(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.page_size) + 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighRiskResponse {
    pub data: Vec<HighRiskClaim>,
    pub meta: HighRiskMeta,
}

// ============= Claim Summary =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimSummarySection {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeerComparison {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub p90: Option<f64>,
    #[serde(default)]
    pub cost_zscore: Option<f64>,
}

/// Claim attributes repeated inside the summary payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimSnapshot {
    #[serde(default)]
    pub dx_primary_code: Option<String>,
    #[serde(default)]
    pub dx_primary_label: Option<String>,
    #[serde(default)]
    pub severity_group: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub facility_class: Option<String>,
    #[serde(default)]
    pub province_name: Option<String>,
    #[serde(default)]
    pub los: Option<f64>,
    #[serde(default)]
    pub amount_claimed: Option<f64>,
    #[serde(default)]
    pub amount_paid: Option<f64>,
    #[serde(default)]
    pub amount_gap: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimSummary {
    pub claim_id: String,
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub model_version: String,
    #[serde(default)]
    pub ruleset_version: String,
    #[serde(default)]
    pub risk_score: f64,
    #[serde(default)]
    pub rule_score: Option<f64>,
    #[serde(default)]
    pub ml_score: Option<f64>,
    #[serde(default)]
    pub ml_score_normalized: Option<f64>,
    #[serde(default)]
    pub bpjs_payment_ratio: Option<f64>,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub sections: Vec<ClaimSummarySection>,
    #[serde(default)]
    pub narrative: String,
    #[serde(default)]
    pub generative_summary: Option<String>,
    #[serde(default)]
    pub follow_up_questions: Vec<String>,
    #[serde(default)]
    pub llm: serde_json::Value,
    #[serde(default)]
    pub peer: PeerComparison,
    #[serde(default)]
    pub claim: ClaimSnapshot,
    #[serde(default)]
    pub latest_feedback: Option<FeedbackSnapshot>,
}

// ============= Chat =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimChatMessage {
    pub id: String,
    pub claim_id: String,
    #[serde(default)]
    pub sender: String,
    /// `user`, `assistant`, or whatever the server labels a participant.
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ClaimChatMessage {
    pub fn is_assistant(&self) -> bool {
        self.role == "assistant"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageRequest {
    pub message: String,
}

/// Result of posting a chat message: the stored user echo and, when the
/// copilot answered synchronously, its reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatExchange {
    pub user_message: ClaimChatMessage,
    #[serde(default)]
    pub bot_message: Option<ClaimChatMessage>,
}

// ============= Feedback =============

/// Auditor decision on a flagged claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackDecision {
    Approved,
    Partial,
    Rejected,
}

impl FeedbackDecision {
    pub const ALL: [FeedbackDecision; 3] = [
        FeedbackDecision::Approved,
        FeedbackDecision::Partial,
        FeedbackDecision::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackDecision::Approved => "approved",
            FeedbackDecision::Partial => "partial",
            FeedbackDecision::Rejected => "rejected",
        }
    }

    /// Button label used by the dashboards.
    pub fn label(&self) -> &'static str {
        match self {
            FeedbackDecision::Approved => "Approve",
            FeedbackDecision::Partial => "Partial",
            FeedbackDecision::Rejected => "Reject",
        }
    }
}

impl fmt::Display for FeedbackDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackDecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "approved" => Ok(FeedbackDecision::Approved),
            "partial" => Ok(FeedbackDecision::Partial),
            "rejected" => Ok(FeedbackDecision::Rejected),
            other => Err(format!("unknown decision '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimFeedbackPayload {
    pub decision: FeedbackDecision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: String,
    pub claim_id: String,
    pub decision: String,
    #[serde(default)]
    pub correction_ratio: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub reviewer_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

// ============= Reports =============

/// Low-severity claim whose cost exceeds its peer group's P90.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityMismatchRow {
    pub claim_id: String,
    #[serde(default)]
    pub dx_primary: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub facility_class: Option<String>,
    #[serde(default)]
    pub los: Option<f64>,
    #[serde(default)]
    pub claimed: Option<f64>,
    #[serde(default)]
    pub peer_p90: Option<f64>,
    #[serde(default)]
    pub delta_pct: Option<f64>,
}

/// Pair of claims for the same patient episode a few days apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateClaimRow {
    pub claim_id: String,
    #[serde(default)]
    pub matched_claim_id: Option<String>,
    #[serde(default)]
    pub dx_primary: Option<String>,
    #[serde(default)]
    pub procedure_code: Option<String>,
    #[serde(default)]
    pub episode_gap_days: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffInsightRow {
    #[serde(default)]
    pub facility_id: Option<String>,
    #[serde(default)]
    pub facility_name: String,
    #[serde(default)]
    pub facility_match_quality: String,
    #[serde(default)]
    pub province_name: String,
    #[serde(default)]
    pub district_name: String,
    #[serde(default)]
    pub dx_primary_group: Option<String>,
    #[serde(default)]
    pub claim_count: u64,
    #[serde(default)]
    pub total_claimed: f64,
    #[serde(default)]
    pub total_paid: f64,
    #[serde(default)]
    pub total_gap: f64,
    #[serde(default)]
    pub avg_gap: f64,
    #[serde(default)]
    pub avg_cost_zscore: Option<f64>,
    #[serde(default)]
    pub avg_payment_ratio: Option<f64>,
}

/// Query parameters for the tariff insight report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TariffInsightParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dx_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl TariffInsightParams {
    /// The report needs a facility or a province to scope it.
    pub fn is_scoped(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        set(&self.facility_id) || set(&self.province)
    }

    /// Defined parameters as ordered `(name, value)` pairs; blanks are dropped.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let mut push = |name: &str, value: &Option<String>| {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                pairs.push((name.to_string(), v.to_string()));
            }
        };
        push("province", &self.province);
        push("facility_id", &self.facility_id);
        push("severity", &self.severity);
        push("service_type", &self.service_type);
        push("dx_group", &self.dx_group);
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

/// Error body returned by the API on failures.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(default)]
    pub details: Option<String>,
}
