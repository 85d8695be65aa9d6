//! Browser adapters for the casemind-core seams: fetch, localStorage and
//! the History API.

use async_trait::async_trait;
use casemind_core::{
    ApiError, ApiRequest, ApiResponse, HttpMethod, HttpTransport, SessionStorage, UrlHistory,
};
use gloo_net::http::Request;
use gloo_storage::{LocalStorage, Storage};
use wasm_bindgen::JsValue;

/// `fetch`-backed transport.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlooTransport;

#[async_trait(?Send)]
impl HttpTransport for GlooTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut builder = match request.method {
            HttpMethod::Get => Request::get(&request.url),
            HttpMethod::Post => Request::post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let prepared = match request.body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(|e| ApiError::Internal(format!("Failed to build request: {}", e)))?;

        let resp = prepared
            .send()
            .await
            .map_err(|e| ApiError::Network(format!("Network error: {}", e)))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("Failed to read response: {}", e)))?;
        Ok(ApiResponse::new(status, body))
    }
}

/// Session storage in `window.localStorage`, raw strings keyed as given.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserStorage;

fn storage_error(err: JsValue) -> ApiError {
    ApiError::Storage(format!("localStorage error: {:?}", err))
}

#[async_trait(?Send)]
impl SessionStorage for BrowserStorage {
    async fn load(&self, key: &str) -> Result<Option<String>, ApiError> {
        LocalStorage::raw().get_item(key).map_err(storage_error)
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), ApiError> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(storage_error)
    }

    async fn remove(&self, key: &str) -> Result<(), ApiError> {
        LocalStorage::raw().remove_item(key).map_err(storage_error)
    }
}

/// `history.replaceState`: no new entry, no scroll.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserHistory;

impl UrlHistory for BrowserHistory {
    fn replace(&self, url: &str) {
        let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
            return;
        };
        if let Err(err) = history.replace_state_with_url(&JsValue::NULL, "", Some(url)) {
            tracing::warn!("Failed to replace URL: {:?}", err);
        }
    }
}

/// Current `location.pathname` and `location.search`.
pub fn current_location() -> (String, String) {
    let location = web_sys::window().map(|w| w.location());
    let path = location
        .as_ref()
        .and_then(|l| l.pathname().ok())
        .unwrap_or_else(|| "/".to_string());
    let search = location
        .as_ref()
        .and_then(|l| l.search().ok())
        .unwrap_or_default();
    (path, search)
}
