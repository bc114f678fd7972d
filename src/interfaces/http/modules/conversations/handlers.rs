//! Conversation API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension,
};
use uuid::Uuid;

use super::dto::{ConversationDto, MessageDto};
use crate::application::ChatService;
use crate::interfaces::http::common::{api_error, ok, ApiResponse, ApiResult};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct ConversationHandlerState {
    pub chat_service: Arc<ChatService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/vehicles/{id}/conversations",
    tag = "Conversations",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Existing or new conversation with the owner", body = ApiResponse<ConversationDto>),
        (status = 400, description = "Caller owns the vehicle"),
        (status = 404, description = "Vehicle not found")
    )
)]
pub async fn start_conversation(
    State(state): State<ConversationHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(vehicle_id): Path<Uuid>,
) -> ApiResult<ConversationDto> {
    let conversation = state
        .chat_service
        .start_conversation(user.user_id, vehicle_id)
        .await
        .map_err(api_error)?;
    ok(conversation.into())
}

#[utoipa::path(
    get,
    path = "/api/v1/conversations",
    tag = "Conversations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's conversations, most recently active first", body = ApiResponse<Vec<ConversationDto>>)
    )
)]
pub async fn list_conversations(
    State(state): State<ConversationHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<ConversationDto>> {
    let conversations = state
        .chat_service
        .conversations_for_user(user.user_id)
        .await
        .map_err(api_error)?;
    ok(conversations.into_iter().map(ConversationDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/v1/conversations/{id}/messages",
    tag = "Conversations",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Conversation ID")),
    responses(
        (status = 200, description = "Messages, oldest first", body = ApiResponse<Vec<MessageDto>>),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Not found")
    )
)]
pub async fn conversation_messages(
    State(state): State<ConversationHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(conversation_id): Path<Uuid>,
) -> ApiResult<Vec<MessageDto>> {
    let messages = state
        .chat_service
        .messages_for_conversation(conversation_id, user.user_id)
        .await
        .map_err(api_error)?;
    ok(messages.into_iter().map(MessageDto::from).collect())
}
