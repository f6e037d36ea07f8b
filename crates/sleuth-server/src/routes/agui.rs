use std::time::Duration;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use futures::StreamExt;
use serde_json::json;
use sleuth::agui::EventEncoder;
use sleuth::models::{build_chat_messages, ChatRequest};
use sleuth::translate::translate;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::ApiError;
use crate::sse::SseResponse;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/agui/chat", post(chat_handler))
        .route("/agui/demo", get(demo_handler))
        .with_state(state)
}

/// AG-UI transport: chat replies translated into text-message event
/// triples, one SSE frame per protocol event.
async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<SseResponse, ApiError> {
    let messages = build_chat_messages(&request.ask, request.conversation_history.as_deref());
    let upstream = state.backend.call_stream(messages, request.model).await?;

    let encoder = EventEncoder::new();
    let (tx, rx) = mpsc::channel(100);
    tokio::spawn(async move {
        let events = translate(upstream);
        futures::pin_mut!(events);
        while let Some(item) = events.next().await {
            match item {
                Ok(event) => {
                    if tx.send(encoder.encode(&event)).await.is_err() {
                        // Client went away, stop pulling from upstream.
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Error streaming AG-UI reply: {}", e);
                    break;
                }
            }
        }
    });

    Ok(SseResponse::new(ReceiverStream::new(rx)))
}

/// Fixed demonstration sequence for integration testing front-ends
/// without a live backend.
async fn demo_handler() -> SseResponse {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        for frame in demo_frames() {
            if tx.send(frame).await.is_err() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    });
    SseResponse::new(ReceiverStream::new(rx))
}

fn demo_frames() -> Vec<String> {
    let events = [
        ("state_snapshot", json!({"state": "start"})),
        ("thinking", json!({"content": "pondering"})),
        ("text", json!({"content": "Hello from Sleuth"})),
        ("tool-call", json!({"tool": "dummy_tool", "input": {"foo": "bar"}})),
        ("state_snapshot", json!({"state": "end"})),
    ];
    events
        .iter()
        .map(|(name, data)| format!("event: {}\ndata: {}\n\n", name, data))
        .collect()
}
