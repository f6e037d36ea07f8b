use async_stream::stream;
use futures::{Stream, StreamExt};
use uuid::Uuid;

use crate::agui::AgUiEvent;
use crate::models::UpstreamMessage;

/// Translate an upstream chat stream into AG-UI protocol events.
///
/// Each qualifying upstream message (an answer kind with non-empty
/// `content`) becomes one self-contained start/content/end triple sharing
/// a freshly generated message id. Non-answer kinds and empty content are
/// skipped. Upstream errors pass through unmodified and terminate the
/// translation; the transport layer decides what to do with them.
///
/// The returned stream is lazy: exactly one upstream message is consumed
/// per triple, and dropping the stream stops upstream consumption.
pub fn translate<S, E>(upstream: S) -> impl Stream<Item = Result<AgUiEvent, E>>
where
    S: Stream<Item = Result<UpstreamMessage, E>>,
{
    translate_with_ids(upstream, || Uuid::new_v4().to_string())
}

/// Same as [`translate`] with an injectable message id source.
pub fn translate_with_ids<S, E, F>(
    upstream: S,
    mut next_id: F,
) -> impl Stream<Item = Result<AgUiEvent, E>>
where
    S: Stream<Item = Result<UpstreamMessage, E>>,
    F: FnMut() -> String,
{
    stream! {
        futures::pin_mut!(upstream);
        while let Some(item) = upstream.next().await {
            let message = match item {
                Ok(message) => message,
                Err(e) => {
                    yield Err(e);
                    break;
                }
            };
            if !message.event.is_answer() {
                continue;
            }
            let text = match message.content() {
                Some(text) if !text.is_empty() => text.to_owned(),
                _ => continue,
            };
            let message_id = next_id();
            yield Ok(AgUiEvent::start(message_id.clone()));
            yield Ok(AgUiEvent::content(message_id.clone(), text));
            yield Ok(AgUiEvent::end(message_id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BackendError;
    use crate::models::StreamEventKind;
    use futures::stream;
    use std::collections::HashSet;

    fn ok(message: UpstreamMessage) -> Result<UpstreamMessage, BackendError> {
        Ok(message)
    }

    async fn collect_events(
        items: Vec<Result<UpstreamMessage, BackendError>>,
    ) -> Vec<Result<AgUiEvent, BackendError>> {
        translate(stream::iter(items)).collect().await
    }

    #[tokio::test]
    async fn test_qualifying_message_emits_complete_triple() {
        let events = collect_events(vec![ok(UpstreamMessage::with_content(
            StreamEventKind::AnswerEnd,
            "Hello",
        ))])
        .await;

        let events: Vec<AgUiEvent> = events.into_iter().map(Result::unwrap).collect();
        assert_eq!(events.len(), 3);

        let id = events[0].message_id().to_owned();
        assert_eq!(events[0], AgUiEvent::start(id.clone()));
        assert_eq!(events[1], AgUiEvent::content(id.clone(), "Hello"));
        assert_eq!(events[2], AgUiEvent::end(id));
    }

    #[tokio::test]
    async fn test_filtering_skips_non_answer_and_empty_content() {
        // Only the "Hello" message survives filtering.
        let events = collect_events(vec![
            ok(UpstreamMessage::new(StreamEventKind::StartToolCalling)),
            ok(UpstreamMessage::with_content(
                StreamEventKind::AnswerEnd,
                "Hello",
            )),
            ok(UpstreamMessage::with_content(StreamEventKind::AnswerEnd, "")),
        ])
        .await;

        let events: Vec<AgUiEvent> = events.into_iter().map(Result::unwrap).collect();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[1],
            AgUiEvent::content(events[0].message_id(), "Hello")
        );
    }

    #[tokio::test]
    async fn test_missing_content_key_is_skipped() {
        let events =
            collect_events(vec![ok(UpstreamMessage::new(StreamEventKind::AiMessage))]).await;
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_kind_is_skipped() {
        let events = collect_events(vec![ok(UpstreamMessage::with_content(
            StreamEventKind::Unknown,
            "ignored",
        ))])
        .await;
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_ids_are_unique_and_order_preserved() {
        let items = (0..5)
            .map(|i| {
                ok(UpstreamMessage::with_content(
                    StreamEventKind::AiMessage,
                    format!("chunk {}", i),
                ))
            })
            .collect();
        let events: Vec<AgUiEvent> = collect_events(items)
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(events.len(), 15);

        let mut ids = HashSet::new();
        for (i, triple) in events.chunks(3).enumerate() {
            let id = triple[0].message_id().to_owned();
            assert_eq!(triple[0], AgUiEvent::start(id.clone()));
            assert_eq!(triple[1], AgUiEvent::content(id.clone(), format!("chunk {}", i)));
            assert_eq!(triple[2], AgUiEvent::end(id.clone()));
            assert!(ids.insert(id), "message ids must be pairwise distinct");
        }
    }

    #[tokio::test]
    async fn test_terminates_cleanly_with_upstream() {
        let events = collect_events(vec![ok(UpstreamMessage::with_content(
            StreamEventKind::AnswerEnd,
            "done",
        ))])
        .await;
        // Exactly one triple, nothing trailing after upstream exhaustion.
        assert_eq!(events.len(), 3);
    }

    #[tokio::test]
    async fn test_upstream_error_passes_through_and_ends_stream() {
        let events = collect_events(vec![
            ok(UpstreamMessage::with_content(
                StreamEventKind::AiMessage,
                "before",
            )),
            Err(BackendError::RateLimited("slow down".to_string())),
        ])
        .await;

        assert_eq!(events.len(), 4);
        assert!(events[..3].iter().all(Result::is_ok));
        assert!(matches!(
            events[3],
            Err(BackendError::RateLimited(ref detail)) if detail == "slow down"
        ));
    }

    #[tokio::test]
    async fn test_injected_id_source() {
        let mut counter = 0u32;
        let upstream = stream::iter(vec![ok(UpstreamMessage::with_content(
            StreamEventKind::AnswerEnd,
            "Hello",
        ))]);
        let events: Vec<AgUiEvent> = translate_with_ids(upstream, move || {
            counter += 1;
            format!("msg-{}", counter)
        })
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

        assert_eq!(events[0], AgUiEvent::start("msg-1"));
    }
}
