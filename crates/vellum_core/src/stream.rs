//! Chunked content streams.

use futures::{Stream, StreamExt, TryStreamExt};
use std::pin::Pin;
use vellum_error::StorageResult;

/// Chunk size used when slicing in-memory content into a stream.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Sequential, chunked byte stream.
///
/// Backends hand these out instead of whole buffers so that large content is never
/// materialised by the resolver.
pub type ContentStream = Pin<Box<dyn Stream<Item = StorageResult<Vec<u8>>> + Send>>;

/// Stream an owned buffer in [`CHUNK_SIZE`] pieces.
pub fn stream_from_bytes(data: Vec<u8>) -> ContentStream {
    let chunks: Vec<StorageResult<Vec<u8>>> =
        data.chunks(CHUNK_SIZE).map(|c| Ok(c.to_vec())).collect();
    futures::stream::iter(chunks).boxed()
}

/// Drain a stream into a single buffer.
///
/// # Errors
///
/// Returns the first error the stream yields.
pub async fn collect_stream(stream: ContentStream) -> StorageResult<Vec<u8>> {
    stream
        .try_fold(Vec::new(), |mut acc, chunk| async move {
            acc.extend_from_slice(&chunk);
            Ok(acc)
        })
        .await
}
