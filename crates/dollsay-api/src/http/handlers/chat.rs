//! Chat turn endpoint.
//!
//! POST /api/chat
//!
//! Body `{ "message", "sessionId", "isGuest" }`; responds with the composed
//! turn `{ "id", "reply", "emotion", "remainingMessages", "timestamp" }`.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use dollsay_types::chat::{ChatRequest, ChatTurn};

use crate::http::error::AppError;
use crate::state::AppState;

/// POST /api/chat - Run one companion turn.
///
/// Malformed JSON and failed field validation both surface as
/// `INVALID_REQUEST` without touching the store or the provider.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatTurn>, AppError> {
    let Json(request) = payload?;
    let turn_request = request.validate()?;

    tracing::debug!(
        session_id = %turn_request.session_id,
        guest = turn_request.is_guest,
        "Chat request received"
    );

    let turn = state.chat_service.process_turn(&turn_request).await?;
    Ok(Json(turn))
}
