use crate::error::Result;
use crate::filters::FilterState;
use crate::gateway::{encode_segment, ApiGateway};
use crate::types::{
    ChatExchange, ChatMessageRequest, ClaimChatMessage, ClaimFeedbackPayload, ClaimSummary,
    Envelope, FeedbackRecord, HighRiskResponse,
};

fn claim_path(claim_id: &str, resource: &str) -> String {
    format!("/claims/{}/{}", encode_segment(claim_id), resource)
}

/// `GET /claims/high-risk` with every defined filter field.
pub async fn fetch_high_risk_claims(
    gateway: &ApiGateway,
    filters: &FilterState,
) -> Result<HighRiskResponse> {
    gateway
        .get("/claims/high-risk", &filters.to_request_params())
        .await
}

pub async fn fetch_claim_summary(gateway: &ApiGateway, claim_id: &str) -> Result<ClaimSummary> {
    let envelope: Envelope<ClaimSummary> =
        gateway.get(&claim_path(claim_id, "summary"), &[]).await?;
    Ok(envelope.data)
}

/// The claim's chat transcript, oldest first as returned by the server.
pub async fn fetch_claim_chat(
    gateway: &ApiGateway,
    claim_id: &str,
) -> Result<Vec<ClaimChatMessage>> {
    let envelope: Envelope<Vec<ClaimChatMessage>> =
        gateway.get(&claim_path(claim_id, "chat"), &[]).await?;
    Ok(envelope.data)
}

/// Post a message; returns the stored user echo and the copilot reply if any.
pub async fn post_claim_chat_message(
    gateway: &ApiGateway,
    claim_id: &str,
    message: &str,
) -> Result<ChatExchange> {
    let request = ChatMessageRequest {
        message: message.to_string(),
    };
    let envelope: Envelope<ChatExchange> = gateway
        .post(&claim_path(claim_id, "chat"), &request)
        .await?;
    Ok(envelope.data)
}

pub async fn submit_claim_feedback(
    gateway: &ApiGateway,
    claim_id: &str,
    payload: &ClaimFeedbackPayload,
) -> Result<FeedbackRecord> {
    let envelope: Envelope<FeedbackRecord> = gateway
        .post(&claim_path(claim_id, "feedback"), payload)
        .await?;
    Ok(envelope.data)
}
