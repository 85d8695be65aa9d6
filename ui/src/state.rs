//! Global application state

use std::sync::Arc;

use casemind_core::{
    ApiError, ApiGateway, AuthGuard, GuardDecision, Hooks, Query, QueryCache, QueryState, SessionSnapshot,
    SessionStore, DEFAULT_API_BASE_URL,
};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{BrowserStorage, GlooTransport};

/// API base URL baked in at build time (`CASEMIND_API_BASE_URL=... trunk build`).
pub fn api_base_url() -> &'static str {
    resolve_base_url(option_env!("CASEMIND_API_BASE_URL"))
}

fn resolve_base_url(configured: Option<&'static str>) -> &'static str {
    configured
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or(DEFAULT_API_BASE_URL)
}

/// Services shared by every page, plus signals mirroring their state.
#[derive(Clone)]
pub struct AppState {
    pub session: SessionStore,
    pub hooks: Hooks,
    /// Latest session snapshot; drives the auth guard and the header.
    pub auth: RwSignal<SessionSnapshot>,
    /// Bumped whenever any cache entry changes.
    pub cache_tick: RwSignal<u64>,
}

impl AppState {
    pub fn new() -> Self {
        let session = SessionStore::new(Arc::new(BrowserStorage));
        let gateway = ApiGateway::new(
            api_base_url(),
            Arc::new(GlooTransport),
            session.clone(),
        );
        let hooks = Hooks::new(gateway, QueryCache::new());

        let auth = RwSignal::new(session.snapshot());
        session.subscribe(move |snapshot| auth.set(snapshot.clone()));

        let cache_tick = RwSignal::new(0u64);
        hooks
            .cache()
            .subscribe(move |_| cache_tick.update(|tick| *tick += 1));

        Self {
            session,
            hooks,
            auth,
            cache_tick,
        }
    }

    /// Restore the stored session in the background.
    pub fn hydrate(&self) {
        let session = self.session.clone();
        spawn_local(async move {
            let snapshot = session.hydrate().await;
            tracing::debug!(authenticated = snapshot.is_authenticated(), "Session hydrated");
        });
    }

    /// Current guard decision, re-evaluated whenever the session changes.
    pub fn guard(&self) -> Signal<GuardDecision> {
        let session = self.session.clone();
        let auth = self.auth;
        Signal::derive(move || {
            auth.track();
            AuthGuard::check(&session)
        })
    }

    /// Clear the session and every cached response.
    pub fn sign_out(&self) {
        let session = self.session.clone();
        let cache = self.hooks.cache().clone();
        let tick = self.cache_tick;
        spawn_local(async move {
            if let Err(err) = session.logout().await {
                tracing::warn!("Failed to clear stored session: {}", err);
            }
            cache.clear();
            tick.update(|t| *t += 1);
        });
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Text shown for a failed request.
pub fn error_message(err: &ApiError) -> String {
    match err {
        ApiError::Status { message, .. }
        | ApiError::Unauthorized(message)
        | ApiError::Network(message) => message.clone(),
        ApiError::Validation(errors) => errors
            .iter()
            .next()
            .map(|(_, message)| message.to_string())
            .unwrap_or_else(|| err.to_string()),
        other => other.to_string(),
    }
}

fn should_load<T>(state: &QueryState<T>) -> bool {
    !state.is_fetching && !state.is_error && (state.data.is_none() || state.is_stale)
}

/// Bind a query to the view.
///
/// `make` is re-run whenever the signals it reads change, so a new key means
/// a new fetch. Missing or stale entries are loaded; failed ones wait for an
/// explicit [`refetch`].
pub fn use_query<T, F>(make: F) -> Signal<QueryState<T>>
where
    T: Send + Sync + 'static,
    F: Fn() -> Query<T> + Send + Sync + 'static,
{
    let tick = expect_context::<AppState>().cache_tick;
    let make = Arc::new(make);

    let loader = Arc::clone(&make);
    Effect::new(move |_| {
        tick.track();
        let query = loader();
        if query.is_enabled() && should_load(&query.state()) {
            spawn_local(async move {
                query.load().await;
            });
        }
    });

    Signal::derive(move || {
        tick.track();
        make().state()
    })
}

/// Fetch a query again regardless of freshness.
pub fn refetch<T: Send + Sync + 'static>(query: Query<T>) {
    spawn_local(async move {
        query.refetch().await;
    });
}
