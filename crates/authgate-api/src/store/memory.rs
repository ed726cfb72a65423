//! In-memory identity and session storage for tests
//!
//! Mirrors the Postgres contract, including case-sensitive lookups over
//! already-normalized emails, the duplicate-email signal, and read-time
//! expiry filtering.

use async_trait::async_trait;
use authgate_core::{
    IdentityResolver, Session, SessionStore, StoreError, StoreResult, User,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    users: HashMap<String, User>,
    sessions: HashMap<String, Session>,
}

/// HashMap-backed store for integration tests
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityResolver for InMemoryStore {
    async fn find_user_by_id(&self, id: &str) -> StoreResult<User> {
        let inner = self.inner.lock().map_err(|e| StoreError::Database(e.to_string()))?;
        inner.users.get(id).cloned().ok_or(StoreError::NotFound)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<User> {
        let inner = self.inner.lock().map_err(|e| StoreError::Database(e.to_string()))?;
        inner
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create_user(&self, user: &mut User) -> StoreResult<()> {
        let mut inner = self.inner.lock().map_err(|e| StoreError::Database(e.to_string()))?;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let now = Utc::now();
        user.created_at = now;
        user.updated_at = now;
        inner.users.insert(user.id.clone(), user.clone());
        Ok(())
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn create_session(&self, session: &mut Session) -> StoreResult<()> {
        let mut inner = self.inner.lock().map_err(|e| StoreError::Database(e.to_string()))?;
        session.created_at = Utc::now();
        inner.sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn find_session_by_id(&self, id: &str) -> StoreResult<Session> {
        let inner = self.inner.lock().map_err(|e| StoreError::Database(e.to_string()))?;
        inner.sessions.get(id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list_active_sessions(&self, user_id: &str) -> StoreResult<Vec<Session>> {
        let inner = self.inner.lock().map_err(|e| StoreError::Database(e.to_string()))?;
        let now = Utc::now();
        let mut sessions: Vec<Session> = inner
            .sessions
            .values()
            .filter(|s| s.user_id == user_id && s.expires_at > now)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn delete_session(&self, id: &str) -> StoreResult<()> {
        let mut inner = self.inner.lock().map_err(|e| StoreError::Database(e.to_string()))?;
        inner
            .sessions
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn delete_user_sessions(&self, user_id: &str) -> StoreResult<u64> {
        let mut inner = self.inner.lock().map_err(|e| StoreError::Database(e.to_string()))?;
        let before = inner.sessions.len();
        inner.sessions.retain(|_, s| s.user_id != user_id);
        Ok((before - inner.sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authgate_core::UserRole;
    use chrono::Duration;

    fn test_user(email: &str) -> User {
        User::new(
            email.to_string(),
            Some("hash".to_string()),
            "Test".to_string(),
            UserRole::User,
        )
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let store = InMemoryStore::new();
        let mut user = test_user("a@example.com");
        store.create_user(&mut user).await.unwrap();

        let by_id = store.find_user_by_id(&user.id).await.unwrap();
        assert_eq!(by_id.email, "a@example.com");

        let by_email = store.find_user_by_email("a@example.com").await.unwrap();
        assert_eq!(by_email.id, user.id);

        assert!(matches!(
            store.find_user_by_email("missing@example.com").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryStore::new();
        let mut first = test_user("dup@example.com");
        store.create_user(&mut first).await.unwrap();

        let mut second = test_user("dup@example.com");
        assert!(matches!(
            store.create_user(&mut second).await,
            Err(StoreError::DuplicateEmail)
        ));
    }

    #[tokio::test]
    async fn test_expired_sessions_filtered_and_order() {
        let store = InMemoryStore::new();

        let mut expired = Session::new("user_1".to_string(), Utc::now() - Duration::hours(1));
        store.create_session(&mut expired).await.unwrap();

        let mut older = Session::new("user_1".to_string(), Utc::now() + Duration::days(7));
        store.create_session(&mut older).await.unwrap();
        older.created_at = Utc::now() - Duration::minutes(10);
        store.inner.lock().unwrap().sessions.insert(older.id.clone(), older.clone());

        let mut newer = Session::new("user_1".to_string(), Utc::now() + Duration::days(7));
        store.create_session(&mut newer).await.unwrap();

        let active = store.list_active_sessions("user_1").await.unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].id, newer.id);
        assert_eq!(active[1].id, older.id);
    }

    #[tokio::test]
    async fn test_delete_sessions() {
        let store = InMemoryStore::new();
        let mut a = Session::new("user_1".to_string(), Utc::now() + Duration::days(1));
        let mut b = Session::new("user_1".to_string(), Utc::now() + Duration::days(1));
        store.create_session(&mut a).await.unwrap();
        store.create_session(&mut b).await.unwrap();

        store.delete_session(&a.id).await.unwrap();
        assert!(matches!(
            store.delete_session(&a.id).await,
            Err(StoreError::NotFound)
        ));

        assert_eq!(store.delete_user_sessions("user_1").await.unwrap(), 1);
        assert_eq!(store.delete_user_sessions("user_1").await.unwrap(), 0);
    }
}
