use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{header, StatusCode};
use serde_json::{json, Map, Value};

use crate::errors::BackendError;
use crate::models::{ChatMessage, StreamEventKind, UpstreamMessage};

use super::{ChatBackend, MessageStream};

/// Client for the model-runner service that streams chat events over SSE.
///
/// The service takes `{model, messages}` and answers with a
/// `text/event-stream` body of `event:`/`data:` frames, one per upstream
/// message.
pub struct HttpChatBackend {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model: String,
}

impl HttpChatBackend {
    pub fn new<S: Into<String>>(url: S, api_key: Option<String>, model: S) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            api_key,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn call_stream(
        &self,
        messages: Vec<ChatMessage>,
        model: Option<String>,
    ) -> Result<MessageStream, BackendError> {
        let model = model.unwrap_or_else(|| self.model.clone());
        let payload = json!({
            "model": model,
            "messages": messages,
        });

        let mut request = self
            .client
            .post(&self.url)
            .header(header::ACCEPT, "text/event-stream")
            .json(&payload);
        if let Some(api_key) = &self.api_key {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", api_key));
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let detail = response.text().await.unwrap_or_default();
            return Err(BackendError::RateLimited(detail));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let stream = try_stream! {
            let mut body = response.bytes_stream();
            let mut frames = FrameBuffer::default();
            while let Some(chunk) = body.next().await {
                let chunk = chunk?;
                for message in frames.push(&chunk) {
                    yield message;
                }
            }
            if let Some(message) = frames.finish() {
                yield message;
            }
        };
        Ok(stream.boxed())
    }
}

/// Incremental SSE frame decoder. Network chunks are buffered as raw
/// bytes and split on the `\n\n` terminator before any UTF-8 decoding,
/// so a multi-byte character falling across a chunk boundary stays
/// intact.
#[derive(Default)]
struct FrameBuffer {
    buf: Vec<u8>,
}

impl FrameBuffer {
    /// Absorb one network chunk and decode every frame it completes.
    fn push(&mut self, chunk: &[u8]) -> Vec<UpstreamMessage> {
        self.buf.extend_from_slice(chunk);
        let mut messages = Vec::new();
        while let Some(pos) = self.buf.windows(2).position(|w| w == b"\n\n") {
            let frame: Vec<u8> = self.buf.drain(..pos + 2).collect();
            if let Some(message) = parse_frame(&String::from_utf8_lossy(&frame)) {
                messages.push(message);
            }
        }
        messages
    }

    /// A final frame may arrive without the blank-line terminator.
    fn finish(self) -> Option<UpstreamMessage> {
        parse_frame(&String::from_utf8_lossy(&self.buf))
    }
}

fn parse_kind(name: &str) -> StreamEventKind {
    serde_json::from_value(Value::String(name.to_string())).unwrap_or(StreamEventKind::Unknown)
}

/// Decode one SSE frame into an upstream message. Frames without an
/// `event:` field (comments, keep-alives) are dropped.
fn parse_frame(frame: &str) -> Option<UpstreamMessage> {
    let mut event_name: Option<&str> = None;
    let mut data = String::new();
    for line in frame.lines() {
        if let Some(rest) = line.strip_prefix("event:") {
            event_name = Some(rest.trim());
        } else if let Some(rest) = line.strip_prefix("data:") {
            if !data.is_empty() {
                data.push('\n');
            }
            // SSE removes at most one leading space after the colon.
            data.push_str(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }

    let event = parse_kind(event_name?);
    let data = if data.is_empty() {
        Map::new()
    } else {
        match serde_json::from_str::<Value>(&data) {
            Ok(Value::Object(map)) => map,
            _ => {
                tracing::debug!("Dropping non-object frame payload: {}", data);
                Map::new()
            }
        }
    };
    Some(UpstreamMessage { event, data })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_frame_reads_event_and_data() {
        let message =
            parse_frame("event: answer_end\ndata: {\"content\": \"Hello\"}\n\n").unwrap();
        assert_eq!(message.event, StreamEventKind::AnswerEnd);
        assert_eq!(message.content(), Some("Hello"));
    }

    #[test]
    fn test_parse_frame_drops_frames_without_event() {
        assert!(parse_frame(": keep-alive\n\n").is_none());
        assert!(parse_frame("data: {\"content\": \"orphan\"}\n\n").is_none());
        assert!(parse_frame("").is_none());
    }

    #[test]
    fn test_parse_frame_strips_at_most_one_leading_space() {
        // `data:` with no space after the colon is valid SSE.
        let message = parse_frame("event: ai_message\ndata:{\"content\":\"hi\"}\n\n").unwrap();
        assert_eq!(message.content(), Some("hi"));

        let message = parse_frame("event: ai_message\ndata: {\"content\":\"hi\"}\n\n").unwrap();
        assert_eq!(message.content(), Some("hi"));
    }

    #[test]
    fn test_frame_buffer_keeps_multibyte_chars_split_across_chunks() {
        // "€" is 0xE2 0x82 0xAC; cut the body between its bytes.
        let body = "event: answer_end\ndata: {\"content\": \"price: €5\"}\n\n".as_bytes();
        let cut = body
            .iter()
            .position(|&b| b == 0xE2)
            .map(|pos| pos + 1)
            .unwrap();

        let mut frames = FrameBuffer::default();
        assert!(frames.push(&body[..cut]).is_empty());
        let messages = frames.push(&body[cut..]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content(), Some("price: €5"));
    }

    #[test]
    fn test_frame_buffer_splits_frames_and_flushes_tail() {
        let mut frames = FrameBuffer::default();
        let messages = frames.push(
            "event: ai_message\ndata: {\"content\": \"a\"}\n\n\
             event: ai_message\ndata: {\"content\": \"b\"}\n\nevent: answer"
                .as_bytes(),
        );
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content(), Some("a"));
        assert_eq!(messages[1].content(), Some("b"));

        let mut frames = FrameBuffer::default();
        assert!(frames
            .push("event: answer_end\ndata: {\"content\": \"tail\"}".as_bytes())
            .is_empty());
        let tail = frames.finish().unwrap();
        assert_eq!(tail.content(), Some("tail"));
    }

    #[test]
    fn test_parse_frame_tolerates_unknown_kind_and_bad_payload() {
        let message = parse_frame("event: shiny_new_thing\ndata: not json\n\n").unwrap();
        assert_eq!(message.event, StreamEventKind::Unknown);
        assert!(message.data.is_empty());
    }

    #[tokio::test]
    async fn test_call_stream_decodes_sse_body() {
        let server = MockServer::start().await;
        let body = "event: start_tool_calling\ndata: {}\n\n\
                    event: ai_message\ndata: {\"content\": \"Hello\"}\n\n\
                    event: answer_end\ndata: {\"content\": \"Bye\"}\n\n";
        Mock::given(method("POST"))
            .and(path("/v1/chat"))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(json!({"model": "sleuth-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let backend = HttpChatBackend::new(
            format!("{}/v1/chat", server.uri()),
            Some("secret".to_string()),
            "sleuth-1".to_string(),
        );
        let stream = backend
            .call_stream(vec![ChatMessage::user("hi")], None)
            .await
            .unwrap();
        let messages: Vec<UpstreamMessage> = stream
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].event, StreamEventKind::StartToolCalling);
        assert_eq!(messages[1].content(), Some("Hello"));
        assert_eq!(messages[2].content(), Some("Bye"));
    }

    #[tokio::test]
    async fn test_call_stream_maps_429_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("try later"))
            .mount(&server)
            .await;

        let backend = HttpChatBackend::new(server.uri(), None, "sleuth-1".to_string());
        let err = match backend
            .call_stream(vec![ChatMessage::user("hi")], None)
            .await
        {
            Ok(_) => panic!("expected error"),
            Err(err) => err,
        };
        assert!(matches!(err, BackendError::RateLimited(detail) if detail == "try later"));
    }

    #[tokio::test]
    async fn test_call_stream_maps_other_statuses_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let backend = HttpChatBackend::new(server.uri(), None, "sleuth-1".to_string());
        let err = match backend
            .call_stream(vec![ChatMessage::user("hi")], None)
            .await
        {
            Ok(_) => panic!("expected error"),
            Err(err) => err,
        };
        assert!(matches!(err, BackendError::Api { status: 503, detail } if detail == "down"));
    }
}
