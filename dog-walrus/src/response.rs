//! Publisher responses to `PUT /v1/store`.
//!
//! The publisher answers with an object holding exactly one of
//! `newlyCreated` or `alreadyCertified`. Both are successful uploads.
//! Anything else, including both keys at once, is rejected.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{BlobError, BlobId, BlobResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StoreResponse {
    NewlyCreated(NewlyCreated),
    AlreadyCertified(AlreadyCertified),
}

/// First-time storage: a fresh blob object was registered and certified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewlyCreated {
    pub blob_object: BlobObject,
    #[serde(default)]
    pub encoded_size: Option<u64>,
    #[serde(default)]
    pub cost: u64,
}

impl NewlyCreated {
    /// Encoded size, falling back to the storage resource size
    pub fn encoded_size_bytes(&self) -> u64 {
        self.encoded_size
            .or_else(|| self.blob_object.storage.as_ref().map(|s| s.storage_size))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobObject {
    pub id: String,
    pub blob_id: BlobId,
    pub stored_epoch: u64,
    pub size: u64,
    #[serde(default)]
    pub certified_epoch: Option<u64>,
    #[serde(default)]
    pub storage: Option<StorageResource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageResource {
    pub id: String,
    pub start_epoch: u64,
    pub end_epoch: u64,
    pub storage_size: u64,
}

/// Content was already present and certified by an earlier transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlreadyCertified {
    pub blob_id: BlobId,
    pub event: CertifiedEvent,
    pub end_epoch: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertifiedEvent {
    pub tx_digest: String,
    #[serde(deserialize_with = "string_or_number")]
    pub event_seq: String,
}

/// Parse a publisher body into its outcome
pub fn parse_store_response(body: &[u8]) -> BlobResult<StoreResponse> {
    serde_json::from_slice(body).map_err(|e| BlobError::schema(e.to_string()))
}

// Sui renders u64 event sequence numbers as strings; older publishers send numbers.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seq {
        Text(String),
        Number(u64),
    }

    Ok(match Seq::deserialize(deserializer)? {
        Seq::Text(text) => text,
        Seq::Number(n) => n.to_string(),
    })
}
