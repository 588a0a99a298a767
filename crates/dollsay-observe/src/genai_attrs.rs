//! OpenTelemetry GenAI Semantic Convention attribute constants.
//!
//! Names of the response fields recorded after a chat-completion call
//! returns. Request fields are fixed when the span is created and are written
//! as literals in the `info_span!` call.

/// Reasons the model stopped generating (e.g., "stop", "length").
pub const GEN_AI_RESPONSE_FINISH_REASONS: &str = "gen_ai.response.finish_reasons";

/// Provider-assigned completion ID.
pub const GEN_AI_RESPONSE_ID: &str = "gen_ai.response.id";

// --- Operation names ---

/// A chat completion.
pub const OP_CHAT: &str = "chat";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_attributes_share_prefix() {
        for name in [GEN_AI_RESPONSE_FINISH_REASONS, GEN_AI_RESPONSE_ID] {
            assert!(name.starts_with("gen_ai.response."), "{name}");
        }
    }
}
