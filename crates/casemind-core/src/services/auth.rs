use tracing::info;

use crate::error::{ApiError, Result};
use crate::gateway::{fallback_message, ApiGateway};
use crate::session::SessionRecord;
use crate::types::{LoginPayload, LoginResponse};
use crate::validation::LoginForm;

/// Shown when the API rejects credentials without saying why.
pub const LOGIN_FAILED_MESSAGE: &str = "Invalid email or password.";

/// `POST /auth/login`. The response is not enveloped.
pub async fn login(gateway: &ApiGateway, payload: &LoginPayload) -> Result<LoginResponse> {
    gateway.post("/auth/login", payload).await
}

/// Validate the form, log in and start a session with the result.
///
/// Invalid input fails with [`ApiError::Validation`] before any request.
pub async fn sign_in(gateway: &ApiGateway, form: &LoginForm) -> Result<SessionRecord> {
    let payload = form.validate().map_err(ApiError::Validation)?;
    let response = login(gateway, &payload).await?;
    info!(user = %response.user.email, "Logged in");

    gateway
        .session()
        .set_session(
            response.access_token.clone(),
            response.expires_at.clone(),
            response.user.clone(),
        )
        .await?;

    Ok(SessionRecord::new(
        response.access_token,
        response.expires_at,
        response.user,
    ))
}

/// What to tell the user about a rejected sign-in.
///
/// `None` when the failure is not about the credentials (network, server
/// errors, decoding); callers report those like any other error.
pub fn sign_in_failure(err: &ApiError) -> Option<String> {
    let (status, message) = match err {
        ApiError::Unauthorized(message) => (401, message),
        ApiError::Status { status, message } if *status < 500 => (*status, message),
        _ => return None,
    };
    let message = message.trim();
    if message.is_empty() || message == fallback_message(status) {
        Some(LOGIN_FAILED_MESSAGE.to_string())
    } else {
        Some(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::ScriptedTransport;
    use crate::session::SessionStore;
    use rstest::rstest;
    use std::sync::Arc;

    #[rstest]
    #[case(ApiError::Unauthorized("Akun dinonaktifkan".to_string()), Some("Akun dinonaktifkan"))]
    #[case(ApiError::Unauthorized(fallback_message(401).to_string()), Some(LOGIN_FAILED_MESSAGE))]
    #[case(ApiError::Unauthorized(" ".to_string()), Some(LOGIN_FAILED_MESSAGE))]
    #[case(ApiError::Status { status: 429, message: "Terlalu banyak percobaan".to_string() }, Some("Terlalu banyak percobaan"))]
    #[case(ApiError::Status { status: 400, message: fallback_message(400).to_string() }, Some(LOGIN_FAILED_MESSAGE))]
    #[case(ApiError::Status { status: 503, message: "down".to_string() }, None)]
    #[case(ApiError::Network("connection refused".to_string()), None)]
    fn test_sign_in_failure_message(#[case] err: ApiError, #[case] expected: Option<&str>) {
        assert_eq!(sign_in_failure(&err).as_deref(), expected);
    }

    #[tokio::test]
    async fn test_rejected_credentials_keep_server_message() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .respond(401, r#"{"error":"Akun dinonaktifkan"}"#)
            .respond(401, "");
        let gateway = ApiGateway::new("http://api.test", transport, SessionStore::in_memory());
        let form = LoginForm::new("auditor@casemind.ai", "secret1");

        let err = sign_in(&gateway, &form).await.unwrap_err();
        assert_eq!(sign_in_failure(&err).as_deref(), Some("Akun dinonaktifkan"));
        let err = sign_in(&gateway, &form).await.unwrap_err();
        assert_eq!(sign_in_failure(&err).as_deref(), Some(LOGIN_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_sign_in_starts_session() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            200,
            r#"{"access_token":"tok","token_type":"bearer","expires_in":3600,
                "expires_at":"2030-01-01T00:00:00Z",
                "user":{"id":"u-1","email":"auditor@casemind.ai","role":"auditor","full_name":null}}"#,
        );
        let gateway = ApiGateway::new("http://api.test", transport.clone(), SessionStore::in_memory());

        let record = sign_in(&gateway, &LoginForm::new("auditor@casemind.ai", "secret1"))
            .await
            .unwrap();
        assert_eq!(record.token, "tok");
        assert_eq!(gateway.session().record(), Some(record));
        assert_eq!(
            transport.last_request().unwrap().url,
            "http://api.test/auth/login"
        );
    }

    #[tokio::test]
    async fn test_invalid_form_sends_nothing() {
        let transport = Arc::new(ScriptedTransport::new());
        let gateway = ApiGateway::new("http://api.test", transport.clone(), SessionStore::in_memory());

        let err = sign_in(&gateway, &LoginForm::new("nope", "1")).await.unwrap_err();
        match err {
            ApiError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(transport.request_count(), 0);
    }
}
