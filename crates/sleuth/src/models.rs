use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Semantic category of one element of the backend chat stream.
///
/// Backends may introduce new kinds over time; anything we do not
/// recognize deserializes to `Unknown` and is skipped downstream rather
/// than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamEventKind {
    StartToolCalling,
    ToolCallingResult,
    AiMessage,
    AnswerEnd,
    #[serde(other)]
    Unknown,
}

impl StreamEventKind {
    /// Kinds that carry user-facing answer text.
    pub fn is_answer(self) -> bool {
        matches!(self, StreamEventKind::AiMessage | StreamEventKind::AnswerEnd)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StreamEventKind::StartToolCalling => "start_tool_calling",
            StreamEventKind::ToolCallingResult => "tool_calling_result",
            StreamEventKind::AiMessage => "ai_message",
            StreamEventKind::AnswerEnd => "answer_end",
            StreamEventKind::Unknown => "unknown",
        }
    }
}

/// One element of the upstream chat stream: a kind tag plus a payload bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamMessage {
    pub event: StreamEventKind,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl UpstreamMessage {
    pub fn new(event: StreamEventKind) -> Self {
        Self {
            event,
            data: Map::new(),
        }
    }

    pub fn with_content<S: Into<String>>(event: StreamEventKind, content: S) -> Self {
        let mut data = Map::new();
        data.insert("content".to_string(), Value::String(content.into()));
        Self { event, data }
    }

    /// The answer text fragment, if this message carries one.
    pub fn content(&self) -> Option<&str> {
        self.data.get("content").and_then(Value::as_str)
    }
}

/// One turn of conversation history as submitted by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Body of the chat endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub ask: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub conversation_history: Option<Vec<ChatMessage>>,
}

/// Append the new question to any prior history, oldest first.
pub fn build_chat_messages(ask: &str, history: Option<&[ChatMessage]>) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = history.map(<[_]>::to_vec).unwrap_or_default();
    messages.push(ChatMessage::user(ask));
    messages
}
