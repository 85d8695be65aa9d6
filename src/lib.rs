//! # Casemind
//!
//! Terminal client for the Casemind AI claims review API. Auditors sign in,
//! browse high-risk health-insurance claims with the same filters the
//! dashboard uses, read generated claim summaries, talk to the claim copilot
//! and record decisions.
//!
//! The filter model, session lifecycle, API gateway and query cache live in
//! [`casemind_core`]; this crate adds the native pieces:
//!
//! - a `reqwest` transport ([`api::ReqwestTransport`])
//! - file-backed session storage ([`auth::FileStorage`])
//! - TOML/env configuration ([`utils::config::CasemindConfig`])
//! - the `casemind` command line ([`cli`])
//!
//! ## Library usage
//!
//! ```rust,ignore
//! use casemind::{App, CasemindConfig};
//!
//! let app = App::from_config(CasemindConfig::load(None)?)?;
//! let session = app.require_session().await?;
//! let claims = app.hooks.high_risk_claims(&Default::default()).load().await;
//! ```

#![warn(missing_docs)]

/// Native HTTP transport.
pub mod api;
/// File-backed session storage.
pub mod auth;
/// Command-line interface.
pub mod cli;
/// Error types for the terminal client.
pub mod types;
/// Configuration loading.
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use casemind_core::{
    ApiGateway, AuthGuard, GuardDecision, Hooks, HttpTransport, QueryCache, SessionRecord,
    SessionStore,
};

pub use api::ReqwestTransport;
pub use auth::FileStorage;
pub use casemind_core;
pub use types::{AppError, Result};
pub use utils::config::{CasemindConfig, ConfigError};

/// Services shared by every command: config, session, gateway and cache.
#[derive(Clone)]
pub struct App {
    /// Effective configuration
    pub config: CasemindConfig,
    /// Session store backed by the session directory
    pub session: SessionStore,
    /// Cached reads and mutations against the API
    pub hooks: Hooks,
}

impl App {
    /// Wire the app with the `reqwest` transport and file session storage.
    pub fn from_config(config: CasemindConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.api.timeout_secs))?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Wire the app around a caller-provided transport.
    pub fn with_transport(
        config: CasemindConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let storage = FileStorage::new(config.session_dir()?);
        let session = SessionStore::new(Arc::new(storage));
        let gateway = ApiGateway::new(config.api.base_url.clone(), transport, session.clone());
        let hooks = Hooks::new(gateway, QueryCache::new());

        Ok(Self {
            config,
            session,
            hooks,
        })
    }

    /// Hydrate the session and require a signed-in user.
    pub async fn require_session(&self) -> Result<SessionRecord> {
        match AuthGuard::resolve(&self.session).await {
            GuardDecision::Allow(record) => Ok(record),
            GuardDecision::Pending | GuardDecision::RedirectToLogin => {
                Err(AppError::NotAuthenticated)
            }
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("session", &self.session)
            .finish()
    }
}
