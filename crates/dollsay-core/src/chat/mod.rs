//! Chat-turn orchestration.
//!
//! `ChatService` runs one turn end to end: quota admission, reply
//! generation, emotion classification, and response assembly.

pub mod service;
