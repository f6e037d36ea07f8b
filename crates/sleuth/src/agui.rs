use serde::{Deserialize, Serialize};

/// AG-UI protocol events for streaming text messages to agent front-ends.
///
/// Only the text message lifecycle is emitted today. The wire shape is a
/// JSON object tagged by `type` with camelCase fields, one event per SSE
/// frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgUiEvent {
    #[serde(rename_all = "camelCase")]
    TextMessageStart { message_id: String, role: String },
    #[serde(rename_all = "camelCase")]
    TextMessageContent { message_id: String, delta: String },
    #[serde(rename_all = "camelCase")]
    TextMessageEnd { message_id: String },
}

impl AgUiEvent {
    pub fn start<S: Into<String>>(message_id: S) -> Self {
        AgUiEvent::TextMessageStart {
            message_id: message_id.into(),
            role: "assistant".to_string(),
        }
    }

    pub fn content<S: Into<String>, T: Into<String>>(message_id: S, delta: T) -> Self {
        AgUiEvent::TextMessageContent {
            message_id: message_id.into(),
            delta: delta.into(),
        }
    }

    pub fn end<S: Into<String>>(message_id: S) -> Self {
        AgUiEvent::TextMessageEnd {
            message_id: message_id.into(),
        }
    }

    pub fn message_id(&self) -> &str {
        match self {
            AgUiEvent::TextMessageStart { message_id, .. }
            | AgUiEvent::TextMessageContent { message_id, .. }
            | AgUiEvent::TextMessageEnd { message_id } => message_id,
        }
    }
}

/// Serializes protocol events into server-sent-event frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventEncoder;

impl EventEncoder {
    pub fn new() -> Self {
        Self
    }

    pub fn encode(&self, event: &AgUiEvent) -> String {
        let payload = serde_json::to_string(event).unwrap_or_else(|_| String::new());
        format!("data: {}\n\n", payload)
    }

    pub fn content_type(&self) -> &'static str {
        "text/event-stream"
    }
}
