//! Business logic and repository trait definitions for Dollsay.
//!
//! This crate defines the "ports" (the session store and LLM provider traits)
//! that the infrastructure layer implements, plus the pieces with actual
//! decision logic: emotion classification, the never-failing companion reply
//! client, and the chat-turn orchestrator. It depends only on `dollsay-types`
//! -- never on `dollsay-infra` or any database/IO crate.

pub mod chat;
pub mod emotion;
pub mod llm;
pub mod repository;
