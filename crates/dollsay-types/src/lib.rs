//! Shared domain types for Dollsay.
//!
//! This crate contains the core domain types used across the Dollsay backend:
//! guest quota sessions, chat turns, emotion labels, LLM request shapes,
//! configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod session;
