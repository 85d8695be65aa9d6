//! Shared fixtures for integration tests.
//!
//! Each test gets its own mock API (wiremock) and its own session directory
//! (tempfile), wired together through [`casemind::App`].

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use casemind::casemind_core::types::AuthUser;
use casemind::casemind_core::{SessionRecord, SESSION_STORAGE_KEY};
use casemind::{App, CasemindConfig, ReqwestTransport};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";

pub struct TestApp {
    pub app: App,
    pub server: MockServer,
    pub session_dir: TempDir,
}

pub fn auditor() -> AuthUser {
    AuthUser {
        id: "u-1".to_string(),
        email: "auditor@casemind.ai".to_string(),
        role: "auditor".to_string(),
        full_name: Some("Dewi Auditor".to_string()),
    }
}

pub fn session_json() -> String {
    serde_json::to_string(&SessionRecord::new(
        TOKEN,
        "2099-01-01T00:00:00Z",
        auditor(),
    ))
    .unwrap()
}

/// Config pointing at `base_url` with sessions under `session_dir`.
pub fn config_for(base_url: &str, session_dir: &TempDir) -> CasemindConfig {
    let mut config = CasemindConfig::default();
    config.api.base_url = base_url.to_string();
    config.api.timeout_secs = 5;
    config.session.dir = Some(session_dir.path().to_path_buf());
    config
}

/// App wired to a fresh mock server, with no stored session.
pub async fn signed_out() -> TestApp {
    let server = MockServer::start().await;
    let session_dir = TempDir::new().unwrap();
    let config = config_for(&server.uri(), &session_dir);
    let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
    let app = App::with_transport(config, Arc::new(transport)).unwrap();
    TestApp {
        app,
        server,
        session_dir,
    }
}

/// App wired to a fresh mock server with a stored, valid session.
pub async fn signed_in() -> TestApp {
    let test = signed_out().await;
    std::fs::write(
        test.session_dir
            .path()
            .join(format!("{}.json", SESSION_STORAGE_KEY)),
        session_json(),
    )
    .unwrap();
    test
}

pub fn claim_json(id: &str) -> Value {
    json!({
        "claim_id": id,
        "facility_name": "RSUD Banda Aceh",
        "province_name": "ACEH",
        "dx_primary_code": "A09",
        "severity_group": "sedang",
        "service_type": "RITL",
        "amount_claimed": 1500000.0,
        "amount_paid": 1000000.0,
        "amount_gap": 500000.0,
        "risk_score": 0.91,
        "rule_score": 0.8,
        "ml_score": 0.4,
        "ml_score_normalized": 0.7,
        "flags": ["short_stay_high_cost"]
    })
}

pub fn summary_json(id: &str) -> Value {
    json!({
        "data": {
            "claim_id": id,
            "generated_at": "2024-01-12T08:00:00Z",
            "model_version": "m1",
            "ruleset_version": "r2",
            "risk_score": 0.91,
            "flags": ["short_stay_high_cost"],
            "sections": [{"title": "Ringkasan", "content": "Biaya di atas P90."}],
            "narrative": "Klaim berisiko tinggi.",
            "follow_up_questions": ["Apakah LOS wajar?"],
            "llm": {},
            "peer": {"key": "A09|sedang", "p90": 1200000.0, "cost_zscore": 2.1},
            "claim": {"dx_primary_code": "A09"}
        }
    })
}
