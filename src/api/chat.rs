use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::api::schemas::chat::{ConversationResponse, MessageResponse, SendMessage};
use crate::error::Result;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

pub async fn send_message(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<SendMessage>,
) -> Result<impl IntoResponse> {
    let message = state
        .chat_service
        .send_message(auth_user.user_id, payload.receiver_id, payload.item_id, payload.message)
        .await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(message))))
}

/// The transcript with `other_user_id` about an item. Listing is what marks
/// the counterpart's messages as read.
pub async fn list_messages(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((item_id, other_user_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    let messages = state.chat_service.list_messages(auth_user.user_id, other_user_id, item_id).await?;

    Ok(Json(messages.into_iter().map(MessageResponse::from).collect::<Vec<_>>()))
}

pub async fn list_conversations(auth_user: AuthUser, State(state): State<AppState>) -> Result<impl IntoResponse> {
    let summaries = state.chat_service.list_conversations(auth_user.user_id).await?;

    Ok(Json(summaries.into_iter().map(ConversationResponse::from).collect::<Vec<_>>()))
}
