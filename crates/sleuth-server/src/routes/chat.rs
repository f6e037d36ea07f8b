use axum::{extract::State, routing::post, Json, Router};
use futures::StreamExt;
use sleuth::models::{build_chat_messages, ChatRequest};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::ApiError;
use crate::sse::SseResponse;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(handler))
        .with_state(state)
}

/// Plain event-stream transport: each upstream message passes through as
/// one SSE frame named by its kind, no protocol translation.
async fn handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<SseResponse, ApiError> {
    let messages = build_chat_messages(&request.ask, request.conversation_history.as_deref());
    let mut upstream = state.backend.call_stream(messages, request.model).await?;

    let (tx, rx) = mpsc::channel(100);
    tokio::spawn(async move {
        while let Some(item) = upstream.next().await {
            match item {
                Ok(message) => {
                    let payload = serde_json::to_string(&message.data)
                        .unwrap_or_else(|_| "{}".to_string());
                    let frame =
                        format!("event: {}\ndata: {}\n\n", message.event.as_str(), payload);
                    if tx.send(frame).await.is_err() {
                        // Client went away, stop pulling from upstream.
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Error streaming chat reply: {}", e);
                    break;
                }
            }
        }
    });

    Ok(SseResponse::new(ReceiverStream::new(rx)))
}
