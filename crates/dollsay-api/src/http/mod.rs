//! HTTP/REST API layer for Dollsay.
//!
//! Axum-based JSON API under `/api/` with CORS restricted to the configured
//! web origins.

pub mod error;
pub mod handlers;
pub mod router;
