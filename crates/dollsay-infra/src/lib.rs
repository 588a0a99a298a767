//! Infrastructure layer for Dollsay.
//!
//! Contains implementations of the traits defined in `dollsay-core`:
//! SQLite and in-memory guest session stores, the OpenAI-compatible
//! chat-completion client, and the `config.toml` loader.

pub mod config;
pub mod llm;
pub mod memory;
pub mod sqlite;
