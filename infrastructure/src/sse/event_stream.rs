//! Byte stream to event stream adapter.

use super::decoder::SseDecoder;
use futures::{Stream, StreamExt};
use std::fmt::Display;
use streamchat_application::{EventStream, TransportError};
use tracing::{debug, warn};

/// Decode a raw response body into stream events.
///
/// Stops after the first terminal event. Malformed records are logged and
/// skipped. A body that ends without a terminal event yields
/// [`TransportError::UnexpectedEof`]; a read failure yields
/// [`TransportError::Connection`].
pub fn decode_event_stream<S, B, E>(bytes: S) -> EventStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut decoder = SseDecoder::new();
        let mut bytes = Box::pin(bytes);

        loop {
            let (decoded, ended) = match bytes.next().await {
                Some(Ok(chunk)) => (decoder.push(chunk.as_ref()), false),
                Some(Err(e)) => {
                    warn!("Stream read failed: {}", e);
                    yield Err(TransportError::Connection(e.to_string()));
                    return;
                }
                None => (decoder.finish().into_iter().collect::<Vec<_>>(), true),
            };

            for record in decoded {
                match record {
                    Ok(event) => {
                        let terminal = event.is_terminal();
                        debug!("Decoded event: {:?}", event);
                        yield Ok(event);
                        if terminal {
                            return;
                        }
                    }
                    Err(e) => warn!("Dropping malformed stream record: {}", e),
                }
            }
            if ended {
                break;
            }
        }
        yield Err(TransportError::UnexpectedEof);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sse::encoder::encode_frame;
    use futures::stream;
    use std::convert::Infallible;
    use streamchat_domain::StreamEvent;

    fn chunks(body: &str, size: usize) -> Vec<Result<Vec<u8>, Infallible>> {
        body.as_bytes().chunks(size).map(|c| Ok(c.to_vec())).collect()
    }

    async fn collect(events: EventStream) -> Vec<Result<StreamEvent, TransportError>> {
        events.collect().await
    }

    #[tokio::test]
    async fn test_stops_after_terminal_event() {
        let body = [
            encode_frame(&StreamEvent::fragment("a")),
            encode_frame(&StreamEvent::Done),
            encode_frame(&StreamEvent::fragment("after")),
        ]
        .concat();

        let events = collect(decode_event_stream(stream::iter(chunks(&body, 3)))).await;
        assert_eq!(
            events,
            vec![Ok(StreamEvent::fragment("a")), Ok(StreamEvent::Done)]
        );
    }

    #[tokio::test]
    async fn test_missing_terminal_is_unexpected_eof() {
        let body = encode_frame(&StreamEvent::fragment("a"));
        let events = collect(decode_event_stream(stream::iter(chunks(&body, 4)))).await;
        assert_eq!(
            events,
            vec![
                Ok(StreamEvent::fragment("a")),
                Err(TransportError::UnexpectedEof)
            ]
        );
    }

    #[tokio::test]
    async fn test_malformed_records_are_skipped() {
        let body = format!(
            "data: {{oops\n\n{}",
            encode_frame(&StreamEvent::error("engine unavailable"))
        );
        let events = collect(decode_event_stream(stream::iter(chunks(&body, 5)))).await;
        assert_eq!(events, vec![Ok(StreamEvent::error("engine unavailable"))]);
    }

    #[tokio::test]
    async fn test_read_error_is_connection_error() {
        let items: Vec<Result<Vec<u8>, String>> = vec![
            Ok(encode_frame(&StreamEvent::fragment("a")).into_bytes()),
            Err("connection reset".to_string()),
        ];
        let events = collect(decode_event_stream(stream::iter(items))).await;
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            Err(TransportError::Connection("connection reset".to_string()))
        );
    }

    #[tokio::test]
    async fn test_trailing_record_without_newline() {
        let body = "data: {\"text\":\"x\"}\n\ndata: [DONE]";
        let events = collect(decode_event_stream(stream::iter(chunks(body, 100)))).await;
        assert_eq!(
            events,
            vec![Ok(StreamEvent::fragment("x")), Ok(StreamEvent::Done)]
        );
    }
}
