//! OpenAI-compatible LLM provider implementation.
//!
//! A single [`OpenAiCompatibleProvider`] serves DeepSeek, OpenAI, and any
//! other endpoint that speaks the chat-completions protocol, selected by base
//! URL. Requests carry bearer-token authentication.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

pub mod types;

use std::time::Duration;

use dollsay_core::llm::provider::LlmProvider;
use dollsay_observe::genai_attrs::{
    GEN_AI_RESPONSE_FINISH_REASONS, GEN_AI_RESPONSE_ID, OP_CHAT,
};
use dollsay_types::llm::{CompletionRequest, CompletionResponse, LlmError, MessageRole};
use secrecy::{ExposeSecret, SecretString};
use tracing::Instrument;

use self::types::{ChatCompletionRequest, ChatCompletionResponse, WireMessage};

/// Unified provider for any OpenAI-compatible chat-completions API.
///
/// # API Key Security
///
/// Does NOT derive Debug to prevent accidental exposure of the API key.
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    provider_name: String,
    base_url: String,
    api_key: SecretString,
    model: String,
    timeout: Duration,
}

impl OpenAiCompatibleProvider {
    /// Create a new provider.
    ///
    /// `timeout` bounds the whole HTTP exchange at the transport level.
    pub fn new(
        provider_name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: SecretString,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            provider_name: provider_name.into(),
            base_url: base_url.into(),
            api_key,
            model: model.into(),
            timeout,
        })
    }

    /// The default model for this provider.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full endpoint URL.
    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Convert a generic [`CompletionRequest`] into the wire request.
    ///
    /// The system prompt, if any, goes first as a `system` message.
    fn to_wire_request(&self, request: &CompletionRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(ref system) = request.system {
            messages.push(WireMessage {
                role: MessageRole::System.to_string(),
                content: system.clone(),
            });
        }

        messages.extend(request.messages.iter().map(|m| WireMessage {
            role: m.role.to_string(),
            content: m.content.clone(),
        }));

        // Use the model from the request if set, otherwise fall back to config default
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        ChatCompletionRequest {
            model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    async fn send(&self, body: ChatCompletionRequest) -> Result<CompletionResponse, LlmError> {
        let response = self
            .client
            .post(self.url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.timeout.as_millis() as u64)
                } else {
                    LlmError::Provider {
                        message: format!("HTTP request failed: {e}"),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_ms = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs * 1000);
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimited { retry_after_ms },
                _ => LlmError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        let content = parsed
            .first_content()
            .ok_or(LlmError::EmptyResponse)?
            .to_string();

        let finish_reason = parsed.choices.first().and_then(|c| c.finish_reason.clone());

        let span = tracing::Span::current();
        if let Some(ref id) = parsed.id {
            span.record(GEN_AI_RESPONSE_ID, id.as_str());
        }
        if let Some(ref reason) = finish_reason {
            span.record(GEN_AI_RESPONSE_FINISH_REASONS, reason.as_str());
        }

        Ok(CompletionResponse {
            id: parsed.id,
            content,
            model: parsed.model,
            finish_reason,
        })
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.to_wire_request(request);

        let span = tracing::info_span!(
            "chat",
            gen_ai.operation.name = OP_CHAT,
            gen_ai.provider.name = %self.provider_name,
            gen_ai.request.model = %body.model,
            gen_ai.request.temperature = ?body.temperature,
            gen_ai.request.max_tokens = body.max_tokens,
            gen_ai.response.id = tracing::field::Empty,
            gen_ai.response.finish_reasons = tracing::field::Empty,
        );

        self.send(body).instrument(span).await
    }
}
