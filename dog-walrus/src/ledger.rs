//! Sui lookups for blob objects.
//!
//! The core only needs one thing from the ledger: the decimal `blob_id`
//! stored in a blob object. [`LedgerClient`] keeps that behind a narrow
//! interface; [`SuiLedgerClient`] implements it over the full node JSON-RPC API.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::{BlobError, BlobId, BlobResult, LedgerConfig};

/// Upper bound on pages fetched when listing owned objects
const MAX_PAGES: usize = 64;

#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Decimal `blob_id` recorded in the blob object `object_id`
    async fn resolve_blob_id(&self, object_id: &str) -> BlobResult<String>;

    /// All blob objects owned by `owner`
    async fn list_blob_objects(&self, owner: &str) -> BlobResult<Vec<BlobObjectSummary>>;

    /// Resolve straight to a [`BlobId`]
    async fn resolve(&self, object_id: &str) -> BlobResult<BlobId> {
        let decimal = self.resolve_blob_id(object_id).await?;
        BlobId::from_decimal(&decimal)
    }
}

/// What the ledger knows about one blob object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobObjectSummary {
    pub object_id: String,
    pub blob_id: BlobId,
    pub size: u64,
    pub certified_epoch: Option<u64>,
    pub stored_epoch: u64,
    pub end_epoch: Option<u64>,
}

/// JSON-RPC client for a Sui full node
#[derive(Debug, Clone)]
pub struct SuiLedgerClient {
    client: Client,
    config: LedgerConfig,
}

impl SuiLedgerClient {
    pub fn new(config: LedgerConfig) -> BlobResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Fetch a single blob object with its content fields
    pub async fn get_blob_object(&self, object_id: &str) -> BlobResult<BlobObjectSummary> {
        let object_id = object_id.trim();
        if object_id.is_empty() {
            return Err(BlobError::invalid("object id is empty"));
        }

        let response: ObjectResponse = self
            .call("sui_getObject", json!([object_id, content_options()]))
            .await?;
        response.into_summary()
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> BlobResult<T> {
        tracing::debug!(method, url = %self.config.rpc_url, "ledger rpc");

        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self.client.post(&self.config.rpc_url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BlobError::ledger(format!("{method} returned HTTP {status}")));
        }

        let envelope: RpcEnvelope<T> = response
            .json()
            .await
            .map_err(|e| BlobError::ledger(format!("{method} returned unexpected JSON: {e}")))?;

        match (envelope.result, envelope.error) {
            (_, Some(error)) => Err(BlobError::ledger(format!(
                "{method} failed ({}): {}",
                error.code, error.message
            ))),
            (Some(result), None) => Ok(result),
            (None, None) => Err(BlobError::ledger(format!("{method} returned no result"))),
        }
    }
}

#[async_trait]
impl LedgerClient for SuiLedgerClient {
    async fn resolve_blob_id(&self, object_id: &str) -> BlobResult<String> {
        let summary = self.get_blob_object(object_id).await?;
        Ok(summary.blob_id.to_decimal())
    }

    async fn list_blob_objects(&self, owner: &str) -> BlobResult<Vec<BlobObjectSummary>> {
        let owner = owner.trim();
        if owner.is_empty() {
            return Err(BlobError::invalid("owner address is empty"));
        }

        let query = json!({
            "filter": { "MatchAll": [ { "StructType": self.config.blob_type } ] },
            "options": content_options(),
        });

        let mut objects = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let page: OwnedObjectsPage = self
                .call("suix_getOwnedObjects", json!([owner, query, cursor, Value::Null]))
                .await?;

            for entry in page.data {
                match entry.into_summary() {
                    Ok(summary) => objects.push(summary),
                    Err(e) => tracing::warn!("skipping unreadable blob object: {e}"),
                }
            }

            match (page.has_next_page, page.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => return Ok(objects),
            }
        }

        tracing::warn!(owner, pages = MAX_PAGES, "stopped listing blob objects at page limit");
        Ok(objects)
    }
}

fn content_options() -> Value {
    json!({
        "showType": false,
        "showOwner": false,
        "showPreviousTransaction": false,
        "showDisplay": false,
        "showContent": true,
        "showBcs": false,
        "showStorageRebate": false
    })
}

#[derive(Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnedObjectsPage {
    data: Vec<ObjectResponse>,
    next_cursor: Option<String>,
    #[serde(default)]
    has_next_page: bool,
}

#[derive(Deserialize)]
struct ObjectResponse {
    data: Option<ObjectData>,
    error: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectData {
    object_id: String,
    content: Option<MoveContent>,
}

#[derive(Deserialize)]
struct MoveContent {
    fields: BlobFields,
}

#[derive(Deserialize)]
struct BlobFields {
    blob_id: String,
    #[serde(deserialize_with = "u64_lenient")]
    size: u64,
    #[serde(default, deserialize_with = "opt_u64_lenient")]
    certified_epoch: Option<u64>,
    #[serde(deserialize_with = "u64_lenient")]
    stored_epoch: u64,
    storage: Option<StorageObject>,
}

#[derive(Deserialize)]
struct StorageObject {
    fields: StorageFields,
}

#[derive(Deserialize)]
struct StorageFields {
    #[serde(deserialize_with = "u64_lenient")]
    end_epoch: u64,
}

impl ObjectResponse {
    fn into_summary(self) -> BlobResult<BlobObjectSummary> {
        if let Some(error) = self.error {
            return Err(BlobError::ledger(format!("object lookup failed: {error}")));
        }
        let data = self
            .data
            .ok_or_else(|| BlobError::ledger("object response has no data"))?;
        let fields = data
            .content
            .ok_or_else(|| BlobError::ledger(format!("object {} has no content", data.object_id)))?
            .fields;

        Ok(BlobObjectSummary {
            blob_id: BlobId::from_decimal(&fields.blob_id)?,
            object_id: data.object_id,
            size: fields.size,
            certified_epoch: fields.certified_epoch,
            stored_epoch: fields.stored_epoch,
            end_epoch: fields.storage.map(|s| s.fields.end_epoch),
        })
    }
}

// Move u64 values arrive as strings, u32 values as numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient {
    Number(u64),
    Text(String),
}

impl Lenient {
    fn into_u64<E: serde::de::Error>(self) -> Result<u64, E> {
        match self {
            Lenient::Number(n) => Ok(n),
            Lenient::Text(text) => text
                .parse()
                .map_err(|_| E::custom(format!("expected an unsigned integer, got {text:?}"))),
        }
    }
}

fn u64_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Lenient::deserialize(deserializer)?.into_u64()
}

fn opt_u64_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Option::<Lenient>::deserialize(deserializer)?
        .map(Lenient::into_u64)
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object_json(blob_id: &str) -> Value {
        json!({
            "data": {
                "objectId": "0xabc",
                "version": "7",
                "digest": "d",
                "content": {
                    "dataType": "moveObject",
                    "type": DEFAULT_TYPE,
                    "hasPublicTransfer": true,
                    "fields": {
                        "blob_id": blob_id,
                        "certified_epoch": 12,
                        "erasure_code_type": 0,
                        "id": { "id": "0xabc" },
                        "size": "1024",
                        "storage": {
                            "type": "storage",
                            "fields": {
                                "end_epoch": 20,
                                "id": { "id": "0xdef" },
                                "start_epoch": 11,
                                "storage_size": "65023000"
                            }
                        },
                        "stored_epoch": 11
                    }
                }
            }
        })
    }

    const DEFAULT_TYPE: &str = crate::config::DEFAULT_BLOB_TYPE;

    #[test]
    fn object_fields_become_summary() {
        let response: ObjectResponse = serde_json::from_value(object_json("1")).unwrap();
        let summary = response.into_summary().unwrap();

        assert_eq!(summary.object_id, "0xabc");
        assert_eq!(summary.blob_id.to_decimal(), "1");
        assert_eq!(summary.size, 1024);
        assert_eq!(summary.certified_epoch, Some(12));
        assert_eq!(summary.stored_epoch, 11);
        assert_eq!(summary.end_epoch, Some(20));
    }

    #[test]
    fn uncertified_object_has_no_certified_epoch() {
        let mut value = object_json("1");
        value["data"]["content"]["fields"]["certified_epoch"] = Value::Null;
        let response: ObjectResponse = serde_json::from_value(value).unwrap();
        assert_eq!(response.into_summary().unwrap().certified_epoch, None);
    }

    #[test]
    fn missing_object_is_ledger_error() {
        let response: ObjectResponse =
            serde_json::from_value(json!({ "error": { "code": "notExists", "object_id": "0x1" } })).unwrap();
        let err = response.into_summary().unwrap_err();
        assert!(matches!(err, BlobError::Ledger { .. }));
    }

    #[test]
    fn oversized_blob_id_is_out_of_range() {
        let too_big =
            "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        let response: ObjectResponse = serde_json::from_value(object_json(too_big)).unwrap();
        let err = response.into_summary().unwrap_err();
        assert!(matches!(err, BlobError::OutOfRange { .. }));
    }
}
