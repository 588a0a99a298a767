//! Observability for Dollsay: subscriber initialization and the
//! OpenTelemetry GenAI attribute names used on provider spans.

pub mod genai_attrs;
pub mod tracing_setup;
