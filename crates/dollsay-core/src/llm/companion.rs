//! Companion reply client.
//!
//! Wraps an LLM provider with the companion persona prompt and fixed
//! sampling parameters. `generate_reply` never fails: every provider error,
//! timeout, or empty completion collapses into [`ReplyOutcome::Fallback`],
//! whose text is a fixed apology. The cause is logged for operators.

use std::time::{Duration, Instant};

use dollsay_types::llm::{CompletionRequest, LlmError, Message};
use tracing::{debug, error};

use super::box_provider::BoxLlmProvider;

/// Reply text used whenever the provider cannot produce one.
pub const FALLBACK_REPLY: &str = "抱歉,我现在有点累了,稍后再聊好吗?";

/// Persona for the companion doll: warm, brief, empathetic, few questions.
pub const PERSONA_PROMPT: &str = "你是一个温暖的情感陪伴玩偶,名叫小月。\
你善于倾听和安慰,回复要温柔、简短(50字以内),多用共情语言。\
不要问太多问题,重点是陪伴和理解。";

/// Sampling temperature for companion replies.
pub const REPLY_TEMPERATURE: f64 = 0.7;

/// Hard cap on reply length in tokens.
pub const REPLY_MAX_TOKENS: u32 = 150;

/// Result of asking the companion for a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The provider produced a reply.
    Generated(String),
    /// The provider failed; `reason` is for logs only and never shown to users.
    Fallback { reason: String },
}

impl ReplyOutcome {
    /// Text to show the user.
    pub fn text(&self) -> &str {
        match self {
            ReplyOutcome::Generated(text) => text,
            ReplyOutcome::Fallback { .. } => FALLBACK_REPLY,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            ReplyOutcome::Generated(text) => text,
            ReplyOutcome::Fallback { .. } => FALLBACK_REPLY.to_string(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ReplyOutcome::Fallback { .. })
    }
}

/// Persona-prompted reply client over any boxed provider.
pub struct CompanionReplier {
    provider: BoxLlmProvider,
    timeout: Duration,
}

impl CompanionReplier {
    /// Create a replier. `timeout` bounds each provider call.
    pub fn new(provider: BoxLlmProvider, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Name of the underlying provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Build the two-turn persona request for a user message.
    ///
    /// The model is left empty so the provider uses its configured default.
    pub fn build_request(user_message: &str) -> CompletionRequest {
        CompletionRequest {
            model: String::new(),
            messages: vec![Message::user(user_message)],
            system: Some(PERSONA_PROMPT.to_string()),
            max_tokens: REPLY_MAX_TOKENS,
            temperature: Some(REPLY_TEMPERATURE),
        }
    }

    /// Ask the provider for a reply. Never fails.
    pub async fn generate_reply(&self, user_message: &str) -> ReplyOutcome {
        let request = Self::build_request(user_message);
        let start = Instant::now();

        let result = tokio::time::timeout(self.timeout, self.provider.complete(&request))
            .await
            .unwrap_or_else(|_| Err(LlmError::Timeout(self.timeout.as_millis() as u64)))
            .and_then(|response| {
                if response.content.trim().is_empty() {
                    Err(LlmError::EmptyResponse)
                } else {
                    Ok(response)
                }
            });

        match result {
            Ok(response) => {
                debug!(
                    provider = %self.provider.name(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    reply_chars = response.content.chars().count(),
                    "Companion reply generated"
                );
                ReplyOutcome::Generated(response.content)
            }
            Err(err) => {
                error!(
                    provider = %self.provider.name(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    error = %err,
                    "AI provider call failed, using fallback reply"
                );
                ReplyOutcome::Fallback {
                    reason: err.to_string(),
                }
            }
        }
    }
}
