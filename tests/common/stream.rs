//! Draining walk streams without pulling in a stream combinator crate.

use std::future::poll_fn;
use std::pin::Pin;

use futures_core::Stream;

/// Poll `stream` until it ends or `limit` items arrived.
///
/// The limit keeps a misbehaving walk from hanging the test.
pub async fn collect_stream<S, T, E>(mut stream: Pin<&mut S>, limit: usize) -> Vec<Result<T, E>>
where
    S: Stream<Item = Result<T, E>> + ?Sized,
{
    let mut items = Vec::new();
    while items.len() < limit {
        let Some(item) = poll_fn(|cx| stream.as_mut().poll_next(cx)).await else {
            break;
        };
        items.push(item);
    }
    items
}
