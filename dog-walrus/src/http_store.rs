use async_trait::async_trait;
use futures_util::TryStreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Body, Client};

use crate::store::{BlobStoreClient, ReadReply, StoreReply};
use crate::{BlobId, BlobResult, ByteStream, StoreConfig};

/// [`BlobStoreClient`] speaking the publisher/aggregator HTTP API
#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    client: Client,
    config: StoreConfig,
}

impl HttpBlobStore {
    pub fn new(config: StoreConfig) -> BlobResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client, config })
    }

    /// Reuse an existing client (shared connection pool)
    pub fn with_client(client: Client, config: StoreConfig) -> Self {
        Self { client, config }
    }

    pub fn from_env() -> BlobResult<Self> {
        Self::new(StoreConfig::from_env()?)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

#[async_trait]
impl BlobStoreClient for HttpBlobStore {
    async fn store(&self, body: ByteStream) -> BlobResult<StoreReply> {
        let url = self.config.store_url();
        tracing::debug!(%url, "PUT blob");

        let response = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(Body::wrap_stream(body))
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(StoreReply { status, body })
    }

    async fn read(&self, id: &BlobId) -> BlobResult<ReadReply> {
        let url = self.config.blob_url(&id.canonical());
        tracing::debug!(%url, "GET blob");

        let response = self.client.get(&url).send().await?;
        let status = response.status().as_u16();
        let content_length = response.content_length();

        let body = response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));

        Ok(ReadReply {
            status,
            content_length,
            body: Box::pin(body),
        })
    }
}
