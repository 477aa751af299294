use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use lifeline_model::{ChatMessage, NewMessage};

use crate::{api_types::ApiResponse, errors::AppResult, AppState};

/// POST /api/chat/send — append a message to a ticket's chat.
pub async fn send_message_handler(
    State(state): State<AppState>,
    Json(request): Json<NewMessage>,
) -> AppResult<(StatusCode, Json<ApiResponse<ChatMessage>>)> {
    let message = state.dispatch.send_message(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(message))))
}

/// GET /api/chat/:ticket_number — messages for a ticket, oldest first.
pub async fn list_messages_handler(
    State(state): State<AppState>,
    Path(ticket_number): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<ChatMessage>>>> {
    let messages = state.dispatch.messages(&ticket_number).await?;
    Ok(Json(ApiResponse::success(messages)))
}
