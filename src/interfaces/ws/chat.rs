//! WebSocket chat endpoint
//!
//! Clients authenticate with a bearer token (header or `?token=`) and send
//! `{"conversation_id", "recipient_id", "content"}` frames. Each frame is
//! checked, stored, then relayed to the recipient's live sockets; offline
//! recipients read it later from the history endpoint.

use std::sync::Arc;

use axum::{
    extract::{
        ws::rejection::WebSocketUpgradeRejection,
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::select;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::{ChatHub, ChatService};
use crate::domain::DomainError;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::middleware::{
    auth_error_response, authenticate, bearer_token, AuthError, AuthenticatedUser,
};
use crate::shared::ShutdownSignal;

#[derive(Clone)]
pub struct ChatSocketState {
    pub jwt_config: JwtConfig,
    pub chat_service: Arc<ChatService>,
    pub hub: ChatHub,
    pub shutdown: ShutdownSignal,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// Inbound chat frame; the sender is always the authenticated user.
#[derive(Debug, Deserialize)]
pub struct OutgoingMessage {
    pub conversation_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
}

fn error_frame(message: &str) -> Message {
    Message::Text(
        serde_json::json!({ "type": "error", "error": message })
            .to_string()
            .into(),
    )
}

fn ack_frame(message_id: Uuid, delivered: bool) -> Message {
    Message::Text(
        serde_json::json!({ "type": "ack", "message_id": message_id, "delivered": delivered })
            .to_string()
            .into(),
    )
}

/// `GET /ws`: authenticate, then upgrade. The token is checked before the
/// upgrade headers so unauthenticated callers always get a 401.
pub async fn ws_chat_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<ChatSocketState>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
) -> Response {
    let token = bearer_token(&headers)
        .map(str::to_string)
        .or(query.token.filter(|t| !t.is_empty()));
    let Some(token) = token else {
        return auth_error_response(AuthError::MissingToken);
    };
    let user = match authenticate(&token, &state.jwt_config) {
        Ok(user) => user,
        Err(e) => return auth_error_response(e),
    };

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };

    info!(user_id = %user.user_id, "Chat WebSocket connection");
    ws.on_upgrade(move |socket| handle_chat_socket(socket, state, user))
        .into_response()
}

async fn handle_chat_socket(socket: WebSocket, state: ChatSocketState, user: AuthenticatedUser) {
    let (mut sender, mut receiver) = socket.split();
    let mut connection = state.hub.register(user.user_id);
    let connection_id = connection.connection_id;

    loop {
        select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_frame(&state, &user, text.as_str()).await;
                        if let Err(e) = sender.send(reply).await {
                            warn!(user_id = %user.user_id, "Failed to reply on chat socket: {}", e);
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = sender.send(Message::Pong(data)).await {
                            error!("Failed to send pong: {}", e);
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!(user_id = %user.user_id, "Chat WebSocket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }

            outbound = connection.receiver.recv() => {
                let Some(payload) = outbound else { break };
                if let Err(e) = sender.send(Message::Text(payload.into())).await {
                    warn!(user_id = %user.user_id, "Failed to relay chat message: {}", e);
                    break;
                }
            }

            _ = state.shutdown.wait() => {
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
        }
    }

    state.hub.unregister(user.user_id, connection_id);
    info!(user_id = %user.user_id, "Chat WebSocket disconnected");
}

/// Validate, store and relay one inbound frame. Returns the frame to send
/// back to the author.
async fn handle_frame(state: &ChatSocketState, user: &AuthenticatedUser, text: &str) -> Message {
    let outgoing: OutgoingMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            debug!(user_id = %user.user_id, "Malformed chat frame: {}", e);
            return error_frame("invalid message format");
        }
    };

    let stored = match state
        .chat_service
        .send_message(
            user.user_id,
            outgoing.conversation_id,
            outgoing.recipient_id,
            &outgoing.content,
        )
        .await
    {
        Ok(message) => message,
        Err(DomainError::Database(e)) | Err(DomainError::Fatal(e)) => {
            error!(user_id = %user.user_id, "Failed to store chat message: {}", e);
            return error_frame("message could not be stored");
        }
        Err(e) => return error_frame(&e.to_string()),
    };

    let delivered = state.hub.deliver(&stored).await;
    ack_frame(stored.id, delivered)
}
