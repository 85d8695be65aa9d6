//! # casemind-core
//!
//! Client core for the Casemind high-risk claims review dashboard.
//!
//! The crate has no async runtime dependency and builds for native targets and
//! `wasm32-unknown-unknown`. Front-ends plug in their own I/O through three
//! seams:
//!
//! - [`gateway::HttpTransport`] sends HTTP requests.
//! - [`session::SessionStorage`] persists the session record.
//! - [`filters::UrlHistory`] replaces the current URL.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use casemind_core::{ApiGateway, FilterState, Hooks, QueryCache, SessionStore, MemoryStorage};
//!
//! let session = SessionStore::new(Arc::new(MemoryStorage::new()));
//! session.hydrate().await;
//! let gateway = ApiGateway::new("http://localhost:8080", transport, session);
//! let hooks = Hooks::new(gateway, QueryCache::new());
//!
//! let state = hooks.high_risk_claims(&FilterState::default()).load().await;
//! ```

pub mod error;
pub mod filters;
pub mod format;
pub mod gateway;
pub mod guard;
pub mod hooks;
pub mod notify;
pub mod query;
pub mod services;
pub mod session;
pub mod types;
pub mod validation;

pub use error::{ApiError, Result};
pub use filters::{
    FilterController, FilterField, FilterSnapshot, FilterState, MemoryHistory, PageSize,
    UrlHistory,
};
pub use gateway::{
    ApiGateway, ApiRequest, ApiResponse, HttpMethod, HttpTransport, DEFAULT_API_BASE_URL,
    fallback_message,
};
pub use guard::{AuthGuard, GuardDecision};
pub use hooks::{ClaimChat, ClaimFeedback, Hooks};
pub use notify::SubscriptionId;
pub use query::{
    Clock, ManualClock, Query, QueryCache, QueryKey, QueryState, StalePolicy, DEFAULT_IDLE_TIMEOUT,
};
pub use session::{
    Hydration, MemoryStorage, SessionRecord, SessionSnapshot, SessionStorage, SessionStore,
    SESSION_STORAGE_KEY,
};
pub use validation::{FeedbackForm, FieldErrors, LoginForm};
