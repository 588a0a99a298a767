//! SQLite guest session store implementation.
//!
//! Implements `SessionStore` from `dollsay-core` using sqlx with split
//! read/write pools. Admission is a single conditional `UPDATE ... RETURNING`
//! on the one-connection writer pool, so the compare and the increment can
//! never interleave with another request's.

use chrono::{DateTime, Utc};
use dollsay_core::repository::session::SessionStore;
use dollsay_types::error::RepositoryError;
use dollsay_types::session::{Admission, GuestSession};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `SessionStore`.
pub struct SqliteSessionStore {
    pool: DatabasePool,
}

impl SqliteSessionStore {
    /// Create a new session store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Read a record through the writer connection, so it observes writes
    /// this store just made.
    async fn fetch_from_writer(
        &self,
        session_id: &str,
    ) -> Result<Option<GuestSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM guest_sessions WHERE id = ?")
            .bind(session_id)
            .fetch_optional(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.map(|r| SessionRow::from_row(&r)?.into_session())
            .transpose()
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct SessionRow {
    id: String,
    messages_count: i64,
    created_at: String,
    updated_at: String,
}

impl SessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, RepositoryError> {
        let get = |e: sqlx::Error| RepositoryError::Query(e.to_string());
        Ok(Self {
            id: row.try_get("id").map_err(get)?,
            messages_count: row.try_get("messages_count").map_err(get)?,
            created_at: row.try_get("created_at").map_err(get)?,
            updated_at: row.try_get("updated_at").map_err(get)?,
        })
    }

    fn into_session(self) -> Result<GuestSession, RepositoryError> {
        let messages_count = u32::try_from(self.messages_count).map_err(|_| {
            RepositoryError::Query(format!("invalid messages_count: {}", self.messages_count))
        })?;

        Ok(GuestSession {
            session_id: self.id,
            messages_count,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

// ---------------------------------------------------------------------------
// SessionStore implementation
// ---------------------------------------------------------------------------

impl SessionStore for SqliteSessionStore {
    async fn get(&self, session_id: &str) -> Result<Option<GuestSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM guest_sessions WHERE id = ?")
            .bind(session_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.map(|r| SessionRow::from_row(&r)?.into_session())
            .transpose()
    }

    async fn get_or_create(&self, session_id: &str) -> Result<GuestSession, RepositoryError> {
        let now = format_datetime(&Utc::now());

        sqlx::query(
            r#"INSERT INTO guest_sessions (id, messages_count, created_at, updated_at)
               VALUES (?, 0, ?, ?)
               ON CONFLICT (id) DO NOTHING"#,
        )
        .bind(session_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        self.fetch_from_writer(session_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn increment(&self, session_id: &str) -> Result<GuestSession, RepositoryError> {
        let now = format_datetime(&Utc::now());

        let row = sqlx::query(
            r#"UPDATE guest_sessions
               SET messages_count = messages_count + 1, updated_at = ?
               WHERE id = ?
               RETURNING *"#,
        )
        .bind(&now)
        .bind(session_id)
        .fetch_optional(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => SessionRow::from_row(&row)?.into_session(),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn try_admit(&self, session_id: &str, limit: u32) -> Result<Admission, RepositoryError> {
        let now = format_datetime(&Utc::now());

        let row = sqlx::query(
            r#"UPDATE guest_sessions
               SET messages_count = messages_count + 1, updated_at = ?
               WHERE id = ? AND messages_count < ?
               RETURNING *"#,
        )
        .bind(&now)
        .bind(session_id)
        .bind(i64::from(limit))
        .fetch_optional(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if let Some(row) = row {
            return Ok(Admission::Admitted(SessionRow::from_row(&row)?.into_session()?));
        }

        // Nothing updated: either the record is at its limit or it is missing.
        // Counts only grow, so a refusal observed here stays valid.
        match self.fetch_from_writer(session_id).await? {
            Some(session) => Ok(Admission::Refused(session)),
            None => Err(RepositoryError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::database_url;
    use std::sync::Arc;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let url = database_url(dir.path());
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = SqliteSessionStore::new(test_pool().await);
        assert!(store.get("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let store = SqliteSessionStore::new(test_pool().await);

        let first = store.get_or_create("guest-1").await.unwrap();
        let second = store.get_or_create("guest-1").await.unwrap();

        assert_eq!(first.messages_count, 0);
        assert_eq!(first, second);

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM guest_sessions")
            .fetch_one(&store.pool.reader)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_increment_persists() {
        let store = SqliteSessionStore::new(test_pool().await);
        let created = store.get_or_create("guest-1").await.unwrap();

        let updated = store.increment("guest-1").await.unwrap();
        assert_eq!(updated.messages_count, 1);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        let read = store.get("guest-1").await.unwrap().unwrap();
        assert_eq!(read.messages_count, 1);
    }

    #[tokio::test]
    async fn test_increment_missing_is_not_found() {
        let store = SqliteSessionStore::new(test_pool().await);
        let err = store.increment("ghost").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_try_admit_until_limit() {
        let store = SqliteSessionStore::new(test_pool().await);
        store.get_or_create("s1").await.unwrap();

        let first = store.try_admit("s1", 2).await.unwrap();
        assert!(first.is_admitted());
        assert_eq!(first.session().messages_count, 1);

        let second = store.try_admit("s1", 2).await.unwrap();
        assert!(second.is_admitted());
        assert_eq!(second.session().messages_count, 2);

        let third = store.try_admit("s1", 2).await.unwrap();
        assert!(!third.is_admitted());
        assert_eq!(third.session().messages_count, 2);

        let read = store.get("s1").await.unwrap().unwrap();
        assert_eq!(read.messages_count, 2);
    }

    #[tokio::test]
    async fn test_try_admit_missing_is_not_found() {
        let store = SqliteSessionStore::new(test_pool().await);
        let err = store.try_admit("ghost", 5).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_concurrent_admission_respects_limit() {
        let store = Arc::new(SqliteSessionStore::new(test_pool().await));
        store.get_or_create("shared").await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..25 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.try_admit("shared", 5).await }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().is_admitted() {
                admitted += 1;
            }
        }

        assert_eq!(admitted, 5);
        let read = store.get("shared").await.unwrap().unwrap();
        assert_eq!(read.messages_count, 5);
    }

    #[tokio::test]
    async fn test_concurrent_get_or_create_single_record() {
        let store = Arc::new(SqliteSessionStore::new(test_pool().await));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.get_or_create("race").await }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().messages_count, 0);
        }

        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM guest_sessions WHERE id = 'race'")
                .fetch_one(&store.pool.reader)
                .await
                .unwrap();
        assert_eq!(count.0, 1);
    }
}
