//! Session store: the authenticated user and bearer token, persisted across
//! restarts through a [`SessionStorage`] backend.
//!
//! The store starts [`Hydration::Uninitialized`]. [`SessionStore::hydrate`]
//! reads the durable record once and moves it to [`Hydration::Ready`]; gated
//! views wait for that transition before deciding anything.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::channel::oneshot;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ApiError, Result};
use crate::notify::{Listeners, SubscriptionId};
use crate::types::AuthUser;

/// Fixed key the durable session record lives under.
pub const SESSION_STORAGE_KEY: &str = "casemind-auth";

/// Token, expiry and user, always present together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub token: String,
    pub expires_at: String,
    pub user: AuthUser,
}

impl SessionRecord {
    pub fn new(token: impl Into<String>, expires_at: impl Into<String>, user: AuthUser) -> Self {
        Self {
            token: token.into(),
            expires_at: expires_at.into(),
            user,
        }
    }

    /// Parse a persisted record. Anything unparsable or partial is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str::<SessionRecord>(raw)
            .ok()
            .filter(|record| {
                !record.token.trim().is_empty()
                    && !record.expires_at.trim().is_empty()
                    && !record.user.id.trim().is_empty()
            })
    }
}

/// Durable key/value storage for the session record.
#[async_trait(?Send)]
pub trait SessionStorage: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>>;
    async fn save(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local storage, used when no durable backend is available.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one entry.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .entries
            .lock()
            .insert(key.to_string(), value.to_string());
        storage
    }

    /// Synchronous peek, for assertions.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }
}

#[async_trait(?Send)]
impl SessionStorage for MemoryStorage {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hydration {
    Uninitialized,
    Ready,
}

/// What subscribers see after every session change.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub hydration: Hydration,
    pub record: Option<SessionRecord>,
}

impl SessionSnapshot {
    pub fn is_ready(&self) -> bool {
        self.hydration == Hydration::Ready
    }

    pub fn is_authenticated(&self) -> bool {
        self.record.is_some()
    }
}

struct SessionState {
    hydration: Hydration,
    hydrating: bool,
    record: Option<SessionRecord>,
    waiters: Vec<oneshot::Sender<()>>,
}

struct SessionInner {
    storage: Arc<dyn SessionStorage>,
    key: String,
    state: RwLock<SessionState>,
    listeners: Listeners<SessionSnapshot>,
}

/// Shared handle to the session. Clones point at the same session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("SessionStore")
            .field("key", &self.inner.key)
            .field("hydration", &snapshot.hydration)
            .field("authenticated", &snapshot.is_authenticated())
            .finish()
    }
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self::with_key(storage, SESSION_STORAGE_KEY)
    }

    pub fn with_key(storage: Arc<dyn SessionStorage>, key: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                storage,
                key: key.into(),
                state: RwLock::new(SessionState {
                    hydration: Hydration::Uninitialized,
                    hydrating: false,
                    record: None,
                    waiters: Vec::new(),
                }),
                listeners: Listeners::new(),
            }),
        }
    }

    /// An in-memory store that is already hydrated.
    pub fn in_memory() -> Self {
        let store = Self::new(Arc::new(MemoryStorage::new()));
        store.inner.state.write().hydration = Hydration::Ready;
        store
    }

    /// Load the durable record and mark the store ready.
    ///
    /// Idempotent: once ready this returns immediately, and a concurrent caller
    /// waits for the hydration already under way.
    pub async fn hydrate(&self) -> SessionSnapshot {
        let already_started = {
            let mut state = self.inner.state.write();
            let started = state.hydration == Hydration::Ready || state.hydrating;
            state.hydrating = true;
            started
        };
        if already_started {
            self.wait_hydrated().await;
            return self.snapshot();
        }

        let record = self.load_record().await;

        let (snapshot, waiters) = {
            let mut state = self.inner.state.write();
            // A login that finished while we were reading wins over the stored record.
            if state.record.is_none() {
                state.record = record;
            }
            state.hydration = Hydration::Ready;
            state.hydrating = false;
            let waiters = std::mem::take(&mut state.waiters);
            (
                SessionSnapshot {
                    hydration: state.hydration,
                    record: state.record.clone(),
                },
                waiters,
            )
        };

        info!(
            authenticated = snapshot.is_authenticated(),
            "Session hydrated"
        );
        for waiter in waiters {
            let _ = waiter.send(());
        }
        self.inner.listeners.emit(&snapshot);
        snapshot
    }

    async fn load_record(&self) -> Option<SessionRecord> {
        let raw = match self.inner.storage.load(&self.inner.key).await {
            Ok(raw) => raw?,
            Err(err) => {
                warn!("Failed to read stored session: {}", err);
                return None;
            }
        };

        match SessionRecord::parse(&raw) {
            Some(record) => Some(record),
            None => {
                warn!("Discarding unreadable session record");
                if let Err(err) = self.inner.storage.remove(&self.inner.key).await {
                    warn!("Failed to remove unreadable session record: {}", err);
                }
                None
            }
        }
    }

    /// Resolve once hydration has completed.
    pub async fn wait_hydrated(&self) {
        let receiver = {
            let mut state = self.inner.state.write();
            if state.hydration == Hydration::Ready {
                return;
            }
            let (sender, receiver) = oneshot::channel();
            state.waiters.push(sender);
            receiver
        };
        let _ = receiver.await;
    }

    /// Replace token, expiry and user together and persist them.
    ///
    /// The in-memory session is updated even when persisting fails.
    pub async fn set_session(
        &self,
        token: impl Into<String>,
        expires_at: impl Into<String>,
        user: AuthUser,
    ) -> Result<()> {
        let record = SessionRecord::new(token, expires_at, user);
        let serialized = serde_json::to_string(&record)
            .map_err(|e| ApiError::Internal(format!("Failed to serialize session: {}", e)))?;
        let email = record.user.email.clone();

        let snapshot = {
            let mut state = self.inner.state.write();
            state.record = Some(record);
            SessionSnapshot {
                hydration: state.hydration,
                record: state.record.clone(),
            }
        };
        info!(user = %email, "Session started");
        self.inner.listeners.emit(&snapshot);

        self.inner
            .storage
            .save(&self.inner.key, &serialized)
            .await
    }

    /// Clear token, expiry and user together and remove the durable record.
    ///
    /// The in-memory session is cleared before the storage call suspends.
    pub async fn logout(&self) -> Result<()> {
        let snapshot = {
            let mut state = self.inner.state.write();
            let had_session = state.record.take().is_some();
            if had_session {
                Some(SessionSnapshot {
                    hydration: state.hydration,
                    record: None,
                })
            } else {
                None
            }
        };

        if let Some(snapshot) = snapshot {
            info!("Session cleared");
            self.inner.listeners.emit(&snapshot);
        } else {
            debug!("Logout requested without an active session");
        }

        self.inner.storage.remove(&self.inner.key).await
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.inner.state.read();
        SessionSnapshot {
            hydration: state.hydration,
            record: state.record.clone(),
        }
    }

    pub fn record(&self) -> Option<SessionRecord> {
        self.inner.state.read().record.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner
            .state
            .read()
            .record
            .as_ref()
            .map(|r| r.token.clone())
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.inner
            .state
            .read()
            .record
            .as_ref()
            .map(|r| r.user.clone())
    }

    pub fn is_hydrated(&self) -> bool {
        self.inner.state.read().hydration == Hydration::Ready
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.read().record.is_some()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SessionSnapshot) + Send + Sync + 'static,
    {
        self.inner.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.listeners.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthUser {
        AuthUser {
            id: "u-1".to_string(),
            email: "auditor@casemind.ai".to_string(),
            role: "auditor".to_string(),
            full_name: Some("Dewi Auditor".to_string()),
        }
    }

    #[test]
    fn test_record_uses_camel_case_keys() {
        let record = SessionRecord::new("tok", "2030-01-01T00:00:00Z", user());
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["expiresAt"], "2030-01-01T00:00:00Z");
        assert_eq!(value["token"], "tok");
        assert_eq!(value["user"]["id"], "u-1");
    }

    #[test]
    fn test_parse_rejects_partial_records() {
        assert!(SessionRecord::parse("not json").is_none());
        assert!(SessionRecord::parse(r#"{"token":"t","user":null}"#).is_none());
        assert!(SessionRecord::parse(
            r#"{"token":"","expiresAt":"x","user":{"id":"u","email":"e","role":"r"}}"#
        )
        .is_none());
    }

    #[tokio::test]
    async fn test_hydrate_loads_stored_record() {
        let record = SessionRecord::new("tok", "2030-01-01T00:00:00Z", user());
        let storage = Arc::new(MemoryStorage::with_entry(
            SESSION_STORAGE_KEY,
            &serde_json::to_string(&record).unwrap(),
        ));
        let store = SessionStore::new(storage);
        assert!(!store.is_hydrated());

        let snapshot = store.hydrate().await;
        assert!(snapshot.is_ready());
        assert_eq!(snapshot.record, Some(record));
        assert_eq!(store.token().as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn test_hydrate_discards_garbage() {
        let storage = Arc::new(MemoryStorage::with_entry(SESSION_STORAGE_KEY, "{broken"));
        let store = SessionStore::new(storage.clone());

        let snapshot = store.hydrate().await;
        assert!(snapshot.is_ready());
        assert!(!snapshot.is_authenticated());
        assert!(storage.get(SESSION_STORAGE_KEY).is_none());
    }

    #[tokio::test]
    async fn test_hydrate_is_idempotent() {
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        store.hydrate().await;
        store
            .set_session("tok", "2030-01-01T00:00:00Z", user())
            .await
            .unwrap();
        let snapshot = store.hydrate().await;
        assert!(snapshot.is_authenticated());
    }

    #[tokio::test]
    async fn test_wait_hydrated_resolves_after_hydrate() {
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        let waiter = store.clone();
        let (_, snapshot) = futures::join!(waiter.wait_hydrated(), store.hydrate());
        assert!(snapshot.is_ready());
        assert!(store.is_hydrated());
    }

    #[tokio::test]
    async fn test_set_session_and_logout_persist() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone());
        store.hydrate().await;

        store
            .set_session("tok", "2030-01-01T00:00:00Z", user())
            .await
            .unwrap();
        let stored = storage.get(SESSION_STORAGE_KEY).unwrap();
        assert_eq!(SessionRecord::parse(&stored).unwrap().token, "tok");

        store.logout().await.unwrap();
        assert!(store.record().is_none());
        assert!(store.user().is_none());
        assert!(storage.get(SESSION_STORAGE_KEY).is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let store = SessionStore::in_memory();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.subscribe(move |snapshot| sink.lock().push(snapshot.is_authenticated()));

        store
            .set_session("tok", "2030-01-01T00:00:00Z", user())
            .await
            .unwrap();
        store.logout().await.unwrap();
        store.logout().await.unwrap();

        assert_eq!(*seen.lock(), vec![true, false]);
    }
}
