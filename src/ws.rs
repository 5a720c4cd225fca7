use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use std::sync::Arc;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::session;
use crate::state::SessionState;
use crate::types::ChatUser;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub name: Option<String>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(state): State<Arc<SessionState>>,
) -> impl IntoResponse {
    tracing::info!("WebSocket connection request: name={:?}", params.name);

    ws.on_upgrade(move |socket| handle_socket(socket, params, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, params: WsQuery, state: Arc<SessionState>) {
    let (mut sender, mut receiver) = socket.split();

    let name = params
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| petname::petname(2, "-").unwrap_or_else(|| "guest".to_string()));
    let user = ChatUser {
        id: ulid::Ulid::new(),
        name,
    };

    tracing::info!(user = %user.name, id = %user.id, "Chat client connected");

    // Send welcome message
    let welcome = ServerMessage::Welcome {
        name: user.name.clone(),
        stream: state.config.stream_id.clone(),
        help: session::help_text(),
    };
    if let Ok(msg) = serde_json::to_string(&welcome) {
        if sender.send(Message::Text(msg.into())).await.is_err() {
            tracing::error!("Failed to send welcome message");
            return;
        }
    }

    // Every connection sees the whole room.
    let mut broadcast_rx = state.broadcast.subscribe();

    // Handle incoming messages and broadcasts
    loop {
        tokio::select! {
            broadcast_msg = broadcast_rx.recv() => {
                if let Ok(msg) = broadcast_msg {
                    if let Ok(json) = serde_json::to_string(&msg) {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                }
            }

            // Handle client messages
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Chat { text: line }) => {
                                let line = line.trim().to_string();
                                if line.is_empty() {
                                    continue;
                                }

                                // Everyone sees the line, commands included.
                                let _ = state.broadcast.send(ServerMessage::Chat {
                                    from: user.name.clone(),
                                    text: line.clone(),
                                });

                                // One task per command so an open round never
                                // stalls this read loop.
                                let state = Arc::clone(&state);
                                let user = user.clone();
                                tokio::spawn(async move {
                                    session::dispatch(&state, &user, &line).await;
                                });
                            }
                            Err(e) => {
                                tracing::error!("Failed to parse client message: {}", e);
                                let error = ServerMessage::Error {
                                    message: format!("Invalid message format: {}", e),
                                };
                                if let Ok(json) = serde_json::to_string(&error) {
                                    let _ = sender.send(Message::Text(json.into())).await;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    tracing::info!(user = %user.name, "Chat client disconnected");
}
