use crate::error::Result;
use crate::gateway::ApiGateway;
use crate::types::{
    DuplicateClaimRow, Envelope, SeverityMismatchRow, TariffInsightParams, TariffInsightRow,
};

/// Row limit used by the reports page when none is given.
pub const DEFAULT_REPORT_LIMIT: u32 = 20;

fn limit_param(limit: u32) -> [(String, String); 1] {
    [("limit".to_string(), limit.to_string())]
}

pub async fn fetch_severity_mismatch(
    gateway: &ApiGateway,
    limit: u32,
) -> Result<Vec<SeverityMismatchRow>> {
    let envelope: Envelope<Vec<SeverityMismatchRow>> = gateway
        .get("/reports/severity-mismatch", &limit_param(limit))
        .await?;
    Ok(envelope.data)
}

pub async fn fetch_duplicate_claims(
    gateway: &ApiGateway,
    limit: u32,
) -> Result<Vec<DuplicateClaimRow>> {
    let envelope: Envelope<Vec<DuplicateClaimRow>> = gateway
        .get("/reports/duplicates", &limit_param(limit))
        .await?;
    Ok(envelope.data)
}

pub async fn fetch_tariff_insight(
    gateway: &ApiGateway,
    params: &TariffInsightParams,
) -> Result<Vec<TariffInsightRow>> {
    let envelope: Envelope<Vec<TariffInsightRow>> = gateway
        .get("/reports/tariff-insight", &params.to_pairs())
        .await?;
    Ok(envelope.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::ScriptedTransport;
    use crate::session::SessionStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_report_endpoints() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .respond(
                200,
                r#"{"data":[{"claim_id":"C1","dx_primary":"A09","province":"ACEH","facility_class":"C",
                    "los":1,"claimed":9000000,"peer_p90":4000000,"delta_pct":125.0}]}"#,
            )
            .respond(
                200,
                r#"{"data":[{"claim_id":"C2","matched_claim_id":"C3","dx_primary":"J18",
                    "procedure_code":"96.04","episode_gap_days":2}]}"#,
            )
            .respond(200, r#"{"data":[]}"#);
        let gateway = ApiGateway::new("http://api.test", transport.clone(), SessionStore::in_memory());

        let severity = fetch_severity_mismatch(&gateway, DEFAULT_REPORT_LIMIT).await.unwrap();
        assert_eq!(severity[0].delta_pct, Some(125.0));
        assert_eq!(
            transport.last_request().unwrap().url,
            "http://api.test/reports/severity-mismatch?limit=20"
        );

        let duplicates = fetch_duplicate_claims(&gateway, 50).await.unwrap();
        assert_eq!(duplicates[0].matched_claim_id.as_deref(), Some("C3"));
        assert_eq!(
            transport.last_request().unwrap().url,
            "http://api.test/reports/duplicates?limit=50"
        );

        let params = TariffInsightParams {
            facility_id: Some("F-9".to_string()),
            ..Default::default()
        };
        assert!(fetch_tariff_insight(&gateway, &params).await.unwrap().is_empty());
        assert_eq!(
            transport.last_request().unwrap().url,
            "http://api.test/reports/tariff-insight?facility_id=F-9"
        );
    }
}
