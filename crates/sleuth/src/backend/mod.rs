use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::errors::BackendError;
use crate::models::{ChatMessage, UpstreamMessage};

pub mod http;
pub mod mock;

pub use http::HttpChatBackend;
pub use mock::MockBackend;

/// The upstream chat stream: ordered, pull-based, finite or unbounded.
pub type MessageStream = BoxStream<'static, Result<UpstreamMessage, BackendError>>;

/// The model-calling component that produces the upstream chat stream.
///
/// Implementations own all retry and timeout policy; consumers see only
/// the stream and its terminal errors.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn call_stream(
        &self,
        messages: Vec<ChatMessage>,
        model: Option<String>,
    ) -> Result<MessageStream, BackendError>;
}
