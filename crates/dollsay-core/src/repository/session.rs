//! Guest session store trait.
//!
//! Maps a caller-supplied session id to its quota record.
//! Implementations live in dollsay-infra.

use dollsay_types::error::RepositoryError;
use dollsay_types::session::{Admission, GuestSession};

/// Durable mapping from session id to guest quota state.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// There is no delete or list: records live until an operator removes them.
pub trait SessionStore: Send + Sync {
    /// Get a record by id. Returns None if no turn was ever recorded for it.
    fn get(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<GuestSession>, RepositoryError>> + Send;

    /// Return the existing record or create one with a zero count.
    ///
    /// Concurrent calls for the same id must converge on a single record.
    fn get_or_create(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<GuestSession, RepositoryError>> + Send;

    /// Unconditionally add one to `messages_count`.
    ///
    /// Fails with `RepositoryError::NotFound` if the record does not exist.
    fn increment(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<GuestSession, RepositoryError>> + Send;

    /// Atomically add one to `messages_count` only if it is below `limit`.
    ///
    /// The comparison and the write happen as one step, so two concurrent
    /// callers can never both be admitted for the last free slot.
    /// Fails with `RepositoryError::NotFound` if the record does not exist.
    fn try_admit(
        &self,
        session_id: &str,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Admission, RepositoryError>> + Send;
}
