//! Gate for views that require a signed-in user.

use crate::session::{SessionRecord, SessionStore};

/// Route of the login view.
pub const LOGIN_PATH: &str = "/login";
/// Where a signed-in user lands.
pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    /// Hydration has not finished; render a loading state.
    Pending,
    Allow(SessionRecord),
    RedirectToLogin,
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow(_))
    }
}

pub struct AuthGuard;

impl AuthGuard {
    /// Decide from the current session without waiting.
    pub fn check(store: &SessionStore) -> GuardDecision {
        let snapshot = store.snapshot();
        if !snapshot.is_ready() {
            return GuardDecision::Pending;
        }
        match snapshot.record {
            Some(record) => GuardDecision::Allow(record),
            None => GuardDecision::RedirectToLogin,
        }
    }

    /// Hydrate if needed, then decide. Never returns `Pending`.
    pub async fn resolve(store: &SessionStore) -> GuardDecision {
        store.hydrate().await;
        Self::check(store)
    }

    /// Where the login view should send an already signed-in user.
    pub fn login_redirect(store: &SessionStore) -> Option<&'static str> {
        let snapshot = store.snapshot();
        (snapshot.is_ready() && snapshot.is_authenticated()).then_some(HOME_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemoryStorage, SESSION_STORAGE_KEY};
    use crate::types::AuthUser;
    use std::sync::Arc;

    fn stored_session() -> Arc<MemoryStorage> {
        let record = SessionRecord::new(
            "tok",
            "2030-01-01T00:00:00Z",
            AuthUser {
                id: "u-1".to_string(),
                email: "auditor@casemind.ai".to_string(),
                role: "auditor".to_string(),
                full_name: None,
            },
        );
        Arc::new(MemoryStorage::with_entry(
            SESSION_STORAGE_KEY,
            &serde_json::to_string(&record).unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_pending_until_hydrated() {
        let store = SessionStore::new(stored_session());
        assert_eq!(AuthGuard::check(&store), GuardDecision::Pending);
        assert_eq!(AuthGuard::login_redirect(&store), None);

        let decision = AuthGuard::resolve(&store).await;
        assert!(decision.is_allowed());
        assert_eq!(AuthGuard::login_redirect(&store), Some(HOME_PATH));
    }

    #[tokio::test]
    async fn test_redirects_without_session() {
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        assert_eq!(AuthGuard::resolve(&store).await, GuardDecision::RedirectToLogin);
    }

    #[tokio::test]
    async fn test_logout_revokes_access() {
        let store = SessionStore::new(stored_session());
        store.hydrate().await;
        store.logout().await.unwrap();
        assert_eq!(AuthGuard::check(&store), GuardDecision::RedirectToLogin);
    }
}
