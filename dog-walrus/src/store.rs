use async_trait::async_trait;
use bytes::Bytes;

use crate::{BlobId, BlobResult, ByteStream};

/// Raw access to the blob store's publisher and aggregator.
///
/// Implementations only move bytes; interpreting status codes and bodies is
/// left to the caller. Transport failures are returned as `BlobError::Transfer`.
#[async_trait]
pub trait BlobStoreClient: Send + Sync {
    /// PUT a raw octet stream to the publisher's store endpoint
    async fn store(&self, body: ByteStream) -> BlobResult<StoreReply>;

    /// GET a blob from the aggregator
    async fn read(&self, id: &BlobId) -> BlobResult<ReadReply>;
}

/// Reply to a store request, fully buffered (it is a small JSON document)
#[derive(Debug, Clone)]
pub struct StoreReply {
    pub status: u16,
    pub body: Bytes,
}

impl StoreReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Reply to a read request. The body is left unread.
pub struct ReadReply {
    pub status: u16,
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

impl ReadReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl std::fmt::Debug for ReadReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadReply")
            .field("status", &self.status)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}
