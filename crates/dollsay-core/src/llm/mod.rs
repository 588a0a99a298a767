//! LLM provider abstractions for Dollsay.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: Object-safe wrapper for dynamic dispatch
//! - `CompanionReplier`: persona-prompted reply client that never fails

pub mod box_provider;
pub mod companion;
pub mod provider;
