//! Chat turn request/response types and the emotion label set.
//!
//! The wire shapes use camelCase field names because that is what the web
//! client sends and expects (`sessionId`, `isGuest`, `remainingMessages`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::error::ChatError;

/// Coarse emotional label derived from a reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    #[default]
    Neutral,
    Happy,
    Sad,
    Thinking,
    Surprised,
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emotion::Neutral => write!(f, "neutral"),
            Emotion::Happy => write!(f, "happy"),
            Emotion::Sad => write!(f, "sad"),
            Emotion::Thinking => write!(f, "thinking"),
            Emotion::Surprised => write!(f, "surprised"),
        }
    }
}

impl FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "neutral" => Ok(Emotion::Neutral),
            "happy" => Ok(Emotion::Happy),
            "sad" => Ok(Emotion::Sad),
            "thinking" => Ok(Emotion::Thinking),
            "surprised" => Ok(Emotion::Surprised),
            other => Err(format!("invalid emotion: '{other}'")),
        }
    }
}

/// Inbound chat request as posted by the client.
///
/// Fields are lenient at the serde level so that a missing or `null` field
/// surfaces as a validation message instead of a body-parsing failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub is_guest: Option<bool>,
}

/// A chat request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRequest {
    pub message: String,
    pub session_id: String,
    pub is_guest: bool,
}

impl ChatRequest {
    /// Validate the request, reporting the first failing field.
    pub fn validate(self) -> Result<TurnRequest, ChatError> {
        let message = non_blank(self.message)
            .ok_or_else(|| ChatError::Validation("消息内容不能为空".to_string()))?;
        let session_id = non_blank(self.session_id)
            .ok_or_else(|| ChatError::Validation("会话ID不能为空".to_string()))?;
        let is_guest = self
            .is_guest
            .ok_or_else(|| ChatError::Validation("isGuest不能为空".to_string()))?;

        Ok(TurnRequest {
            message,
            session_id,
            is_guest,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// The composed result of one chat turn. Not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub id: Uuid,
    pub reply: String,
    pub emotion: Emotion,
    /// Present only for guest turns.
    pub remaining_messages: Option<u32>,
    pub timestamp: DateTime<Utc>,
}
