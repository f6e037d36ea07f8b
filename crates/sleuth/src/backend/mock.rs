use async_trait::async_trait;
use futures::stream;
use futures::StreamExt;
use std::sync::Mutex;

use crate::errors::BackendError;
use crate::models::{ChatMessage, UpstreamMessage};

use super::{ChatBackend, MessageStream};

enum Script {
    Stream(Vec<Result<UpstreamMessage, BackendError>>),
    Fail(BackendError),
}

/// A mock backend that plays back a pre-configured script for testing.
pub struct MockBackend {
    script: Mutex<Option<Script>>,
}

impl MockBackend {
    /// Stream the given messages, then end cleanly.
    pub fn with_messages(messages: Vec<UpstreamMessage>) -> Self {
        Self::with_results(messages.into_iter().map(Ok).collect())
    }

    /// Stream the given items verbatim, errors included.
    pub fn with_results(items: Vec<Result<UpstreamMessage, BackendError>>) -> Self {
        Self {
            script: Mutex::new(Some(Script::Stream(items))),
        }
    }

    /// Fail the call before any streaming begins.
    pub fn failing(error: BackendError) -> Self {
        Self {
            script: Mutex::new(Some(Script::Fail(error))),
        }
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn call_stream(
        &self,
        _messages: Vec<ChatMessage>,
        _model: Option<String>,
    ) -> Result<MessageStream, BackendError> {
        let script = self.script.lock().unwrap().take();
        match script {
            Some(Script::Fail(error)) => Err(error),
            Some(Script::Stream(items)) => Ok(stream::iter(items).boxed()),
            // Script already consumed; behave like an empty reply.
            None => Ok(stream::empty().boxed()),
        }
    }
}
