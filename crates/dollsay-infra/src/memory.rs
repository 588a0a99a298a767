//! In-memory guest session store.
//!
//! Backed by a `DashMap`. Each mutation runs under the shard lock of its
//! key, which makes `try_admit` a real compare-and-increment. Records are
//! lost on restart, so this is for tests and `serve --memory`.

use chrono::Utc;
use dashmap::DashMap;
use dollsay_core::repository::session::SessionStore;
use dollsay_types::error::RepositoryError;
use dollsay_types::session::{Admission, GuestSession};

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, GuestSession>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str) -> Result<Option<GuestSession>, RepositoryError> {
        Ok(self.sessions.get(session_id).map(|s| s.value().clone()))
    }

    async fn get_or_create(&self, session_id: &str) -> Result<GuestSession, RepositoryError> {
        let entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| GuestSession::new(session_id));
        Ok(entry.value().clone())
    }

    async fn increment(&self, session_id: &str) -> Result<GuestSession, RepositoryError> {
        let mut session = self
            .sessions
            .get_mut(session_id)
            .ok_or(RepositoryError::NotFound)?;
        session.messages_count += 1;
        session.updated_at = Utc::now();
        Ok(session.value().clone())
    }

    async fn try_admit(&self, session_id: &str, limit: u32) -> Result<Admission, RepositoryError> {
        let mut session = self
            .sessions
            .get_mut(session_id)
            .ok_or(RepositoryError::NotFound)?;
        if session.messages_count >= limit {
            return Ok(Admission::Refused(session.value().clone()));
        }
        session.messages_count += 1;
        session.updated_at = Utc::now();
        Ok(Admission::Admitted(session.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let store = InMemorySessionStore::new();
        let first = store.get_or_create("guest-1").await.unwrap();
        let second = store.get_or_create("guest-1").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.messages_count, 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_increment_requires_record() {
        let store = InMemorySessionStore::new();
        assert!(matches!(
            store.increment("ghost").await,
            Err(RepositoryError::NotFound)
        ));

        store.get_or_create("guest-1").await.unwrap();
        let updated = store.increment("guest-1").await.unwrap();
        assert_eq!(updated.messages_count, 1);
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn test_try_admit_refuses_at_limit() {
        let store = InMemorySessionStore::new();
        store.get_or_create("s1").await.unwrap();

        assert!(store.try_admit("s1", 1).await.unwrap().is_admitted());
        let refused = store.try_admit("s1", 1).await.unwrap();
        assert!(!refused.is_admitted());
        assert_eq!(refused.session().messages_count, 1);
    }

    #[tokio::test]
    async fn test_concurrent_admission_respects_limit() {
        let store = Arc::new(InMemorySessionStore::new());
        store.get_or_create("shared").await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.try_admit("shared", 7).await }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().is_admitted() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 7);
        assert_eq!(
            store.get("shared").await.unwrap().unwrap().messages_count,
            7
        );
    }
}
