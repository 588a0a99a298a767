//! LLM provider implementations.
//!
//! Contains the OpenAI-compatible implementation of the [`LlmProvider`]
//! trait defined in `dollsay-core`, a factory ([`create_provider`]) that
//! builds it from [`ProviderSettings`], and a connectivity probe
//! ([`test_provider_connection`]) used by `dollsay provider test`.
//!
//! [`LlmProvider`]: dollsay_core::llm::provider::LlmProvider

pub mod openai_compat;

use std::time::Duration;

use secrecy::SecretString;

use dollsay_core::llm::box_provider::BoxLlmProvider;
use dollsay_types::config::ProviderSettings;
use dollsay_types::llm::{CompletionRequest, LlmError, Message};

use self::openai_compat::OpenAiCompatibleProvider;

/// Create a [`BoxLlmProvider`] from [`ProviderSettings`].
///
/// The transport timeout matches `timeout_secs`; the reply client applies
/// its own deadline on top, so whichever fires first ends the call.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub fn create_provider(
    settings: &ProviderSettings,
    api_key: SecretString,
) -> Result<BoxLlmProvider, LlmError> {
    let provider = OpenAiCompatibleProvider::new(
        settings.name.clone(),
        settings.base_url.clone(),
        api_key,
        settings.model.clone(),
        Duration::from_secs(settings.timeout_secs),
    )?;
    Ok(BoxLlmProvider::new(provider))
}

/// Test provider connectivity by sending a minimal completion request.
///
/// Sends a tiny "Hello" message with a minimal token budget.
///
/// # Errors
///
/// Returns the LLM error if the provider fails to respond.
pub async fn test_provider_connection(provider: &BoxLlmProvider) -> Result<(), LlmError> {
    let request = CompletionRequest {
        model: String::new(), // Provider uses its configured default
        messages: vec![Message::user("Hello")],
        system: None,
        max_tokens: 10,
        temperature: Some(0.0),
    };
    provider.complete(&request).await?;
    Ok(())
}
