//! API gateway: one configured HTTP client for the whole app.
//!
//! The gateway attaches the session token, decodes JSON bodies and turns
//! failures into [`ApiError`]. A 401 clears the session before the error is
//! returned to the caller. The actual I/O goes through an [`HttpTransport`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ApiError, Result};
use crate::session::SessionStore;
use crate::types::ApiErrorBody;

/// Base URL used when nothing is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// A fully built request, ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and raw body of a response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a request and returns whatever the server answered.
///
/// Implementations return `Err(ApiError::Network)` only when no response was
/// received; every HTTP status, 4xx and 5xx included, is an `Ok`.
#[async_trait(?Send)]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Percent-encode one path segment.
pub fn encode_segment(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Shared API client.
#[derive(Clone)]
pub struct ApiGateway {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    session: SessionStore,
}

impl std::fmt::Debug for ApiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiGateway")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish()
    }
}

impl ApiGateway {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        session: SessionStore,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Absolute URL for `path` with an encoded query string.
    pub fn url(&self, path: &str, query: &[(String, String)]) -> String {
        let mut url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        if !query.is_empty() {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .finish();
            url.push('?');
            url.push_str(&encoded);
        }
        url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(String, String)]) -> Result<T> {
        self.execute(HttpMethod::Get, self.url(path, query), None)
            .await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_string(body)
            .map_err(|e| ApiError::Internal(format!("Failed to serialize request: {}", e)))?;
        self.execute(HttpMethod::Post, self.url(path, &[]), Some(body))
            .await
    }

    fn build_request(&self, method: HttpMethod, url: String, body: Option<String>) -> ApiRequest {
        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ];
        if let Some(token) = self.session.token() {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }
        ApiRequest {
            method,
            url,
            headers,
            body,
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        url: String,
        body: Option<String>,
    ) -> Result<T> {
        let request = self.build_request(method, url, body);
        debug!(method = method.as_str(), url = %request.url, "Sending API request");

        let response = self.transport.send(request).await.map_err(|err| {
            warn!("API request failed: {}", err);
            err
        })?;
        debug!(status = response.status, "Received API response");

        if response.is_success() {
            return serde_json::from_str(&response.body).map_err(|e| {
                warn!("Failed to decode API response: {}", e);
                ApiError::Decode(e.to_string())
            });
        }

        let message = error_message(&response);
        if response.status == 401 {
            warn!("API rejected the session token, logging out");
            if let Err(err) = self.session.logout().await {
                warn!("Failed to remove stored session: {}", err);
            }
            return Err(ApiError::Unauthorized(message));
        }

        Err(ApiError::Status {
            status: response.status,
            message,
        })
    }
}

/// The server's `error` field, or [`fallback_message`] for the status.
fn error_message(response: &ApiResponse) -> String {
    serde_json::from_str::<ApiErrorBody>(&response.body)
        .ok()
        .map(|body| body.error)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| fallback_message(response.status).to_string())
}

/// Message used when an error response carries no `error` field.
pub fn fallback_message(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Session is no longer valid",
        403 => "Forbidden",
        404 => "Not Found",
        408 => "Request Timeout",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unexpected response",
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport for unit tests.

    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    #[derive(Default)]
    pub struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<ApiResponse>>>,
        pub requests: Mutex<Vec<ApiRequest>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(&self, status: u16, body: &str) -> &Self {
            self.responses
                .lock()
                .push_back(Ok(ApiResponse::new(status, body)));
            self
        }

        pub fn fail(&self, message: &str) -> &Self {
            self.responses
                .lock()
                .push_back(Err(ApiError::Network(message.to_string())));
            self
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().len()
        }

        pub fn last_request(&self) -> Option<ApiRequest> {
            self.requests.lock().last().cloned()
        }
    }

    #[async_trait(?Send)]
    impl HttpTransport for ScriptedTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
            self.requests.lock().push(request);
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Network("no scripted response".to_string())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedTransport;
    use super::*;
    use crate::types::AuthUser;
    use serde_json::Value;

    fn gateway(transport: Arc<ScriptedTransport>) -> ApiGateway {
        ApiGateway::new("http://api.test/", transport, SessionStore::in_memory())
    }

    async fn signed_in(gateway: &ApiGateway) {
        gateway
            .session()
            .set_session(
                "tok-1",
                "2030-01-01T00:00:00Z",
                AuthUser {
                    id: "u-1".to_string(),
                    email: "auditor@casemind.ai".to_string(),
                    role: "auditor".to_string(),
                    full_name: None,
                },
            )
            .await
            .unwrap();
    }

    #[test]
    fn test_url_building() {
        let gw = gateway(Arc::new(ScriptedTransport::new()));
        assert_eq!(gw.base_url(), "http://api.test");
        assert_eq!(
            gw.url("/reports/duplicates", &[("limit".to_string(), "20".to_string())]),
            "http://api.test/reports/duplicates?limit=20"
        );
        assert_eq!(encode_segment("C 1/2"), "C%201%2F2");
    }

    #[tokio::test]
    async fn test_unauthenticated_request_has_no_bearer() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(200, "{}");
        let gw = gateway(transport.clone());

        let _: Value = gw.get("/claims/high-risk", &[]).await.unwrap();
        let request = transport.last_request().unwrap();
        assert_eq!(request.header("authorization"), None);
        assert_eq!(request.header("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_bearer_token_attached() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(200, "{}");
        let gw = gateway(transport.clone());
        signed_in(&gw).await;

        let _: Value = gw.post("/claims/C1/chat", &serde_json::json!({"message": "hi"})).await.unwrap();
        let request = transport.last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.header("Authorization"), Some("Bearer tok-1"));
        assert_eq!(request.body.as_deref(), Some(r#"{"message":"hi"}"#));
    }

    #[tokio::test]
    async fn test_unauthorized_clears_session_first() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(401, r#"{"error":"token expired"}"#);
        let gw = gateway(transport);
        signed_in(&gw).await;

        let err = gw.get::<Value>("/claims/C1/summary", &[]).await.unwrap_err();
        assert_eq!(err, ApiError::Unauthorized("token expired".to_string()));
        assert!(gw.session().record().is_none());
        assert!(gw.session().token().is_none());
    }

    #[tokio::test]
    async fn test_bare_unauthorized_reads_once() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(401, "");
        let gw = gateway(transport);

        let err = gw.get::<Value>("/claims/C1/summary", &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized: Session is no longer valid");
    }

    #[tokio::test]
    async fn test_status_error_uses_server_message() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .respond(404, r#"{"error":"claim not found"}"#)
            .respond(502, "<html>bad gateway</html>");
        let gw = gateway(transport);

        let err = gw.get::<Value>("/claims/X/summary", &[]).await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Status {
                status: 404,
                message: "claim not found".to_string()
            }
        );

        let err = gw.get::<Value>("/claims/X/summary", &[]).await.unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.to_string(), "Request failed with status 502: Bad Gateway");
    }

    #[tokio::test]
    async fn test_decode_and_network_errors() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(200, "not json").fail("connection refused");
        let gw = gateway(transport);

        let err = gw.get::<Value>("/x", &[]).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));

        let err = gw.get::<Value>("/x", &[]).await.unwrap_err();
        assert_eq!(err, ApiError::Network("connection refused".to_string()));
    }
}
