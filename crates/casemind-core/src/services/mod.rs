//! Typed wrappers around each API resource.
//!
//! Every function takes the shared [`ApiGateway`](crate::gateway::ApiGateway)
//! and returns the unwrapped payload; envelopes never leak to callers.

pub mod auth;
pub mod claims;
pub mod reports;

pub use auth::{login, sign_in, sign_in_failure, LOGIN_FAILED_MESSAGE};
pub use claims::{
    fetch_claim_chat, fetch_claim_summary, fetch_high_risk_claims, post_claim_chat_message,
    submit_claim_feedback,
};
pub use reports::{
    fetch_duplicate_claims, fetch_severity_mismatch, fetch_tariff_insight, DEFAULT_REPORT_LIMIT,
};
