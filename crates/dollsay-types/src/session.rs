//! Guest session quota records.
//!
//! A guest session is an unauthenticated conversation identified only by a
//! client-supplied id. The backend tracks how many turns each one has used.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Quota state for one guest session id.
///
/// `messages_count` starts at zero and only ever grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestSession {
    pub session_id: String,
    pub messages_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GuestSession {
    /// A fresh record with a zero count, stamped with the current time.
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            messages_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Turns left before `limit` is reached. Never negative, even if the
    /// limit was lowered after the count grew past it.
    pub fn remaining(&self, limit: u32) -> u32 {
        limit.saturating_sub(self.messages_count)
    }
}

/// Outcome of an atomic conditional increment against a session record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The count was below the limit and has been incremented.
    /// Carries the post-increment record.
    Admitted(GuestSession),
    /// The count was already at or over the limit. Carries the unchanged record.
    Refused(GuestSession),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted(_))
    }

    pub fn session(&self) -> &GuestSession {
        match self {
            Admission::Admitted(s) | Admission::Refused(s) => s,
        }
    }
}
