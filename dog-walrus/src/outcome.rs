use serde::Serialize;
use std::path::PathBuf;

use crate::response::StoreResponse;
use crate::{BlobError, BlobId, FailureKind, FileType};

/// Final result of a transfer. Produced exactly once per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum TransferOutcome {
    #[serde(rename_all = "camelCase")]
    NewlyCreated {
        object_id: String,
        identifier: BlobId,
        stored_epoch: u64,
        size_bytes: u64,
        encoded_size_bytes: u64,
        cost: u64,
    },
    #[serde(rename_all = "camelCase")]
    AlreadyCertified {
        identifier: BlobId,
        transaction_digest: String,
        event_sequence: String,
        end_epoch: u64,
    },
    #[serde(rename_all = "camelCase")]
    DownloadCompleted {
        destination_path: PathBuf,
        detected_type: Option<FileType>,
    },
    Failed {
        kind: FailureKind,
        message: String,
    },
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, TransferOutcome::Failed { .. })
    }

    /// Blob id carried by an upload outcome
    pub fn identifier(&self) -> Option<&BlobId> {
        match self {
            TransferOutcome::NewlyCreated { identifier, .. }
            | TransferOutcome::AlreadyCertified { identifier, .. } => Some(identifier),
            _ => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            TransferOutcome::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Markdown summary for display
    pub fn to_markdown(&self) -> String {
        match self {
            TransferOutcome::NewlyCreated {
                object_id,
                identifier,
                stored_epoch,
                size_bytes,
                encoded_size_bytes,
                cost,
            } => format!(
                "## Blob Object\n\
                 - ID: {object_id}\n\
                 - Blob ID: {identifier}\n\
                 - Stored Epoch: {stored_epoch}\n\
                 - Size: {size_bytes} bytes\n\
                 - Encoded Size: {encoded_size_bytes} bytes\n\
                 - Cost: {cost}\n"
            ),
            TransferOutcome::AlreadyCertified {
                identifier,
                transaction_digest,
                event_sequence,
                end_epoch,
            } => format!(
                "## Already Certified\n\
                 - Blob ID: {identifier}\n\
                 - Transaction Digest: {transaction_digest}\n\
                 - Event Sequence: {event_sequence}\n\
                 - End Epoch: {end_epoch}\n"
            ),
            TransferOutcome::DownloadCompleted {
                destination_path,
                detected_type,
            } => {
                let detected = detected_type
                    .map(|t| t.label())
                    .unwrap_or("not checked");
                format!(
                    "## File Downloaded\n\
                     - Saved to: {}\n\
                     - File Type: {detected}\n",
                    destination_path.display()
                )
            }
            TransferOutcome::Failed { kind, message } => {
                format!("# Error\n- Kind: {kind}\n- Message: {message}\n")
            }
        }
    }
}

impl From<StoreResponse> for TransferOutcome {
    fn from(response: StoreResponse) -> Self {
        match response {
            StoreResponse::NewlyCreated(created) => {
                let encoded_size_bytes = created.encoded_size_bytes();
                TransferOutcome::NewlyCreated {
                    object_id: created.blob_object.id,
                    identifier: created.blob_object.blob_id,
                    stored_epoch: created.blob_object.stored_epoch,
                    size_bytes: created.blob_object.size,
                    encoded_size_bytes,
                    cost: created.cost,
                }
            }
            StoreResponse::AlreadyCertified(certified) => TransferOutcome::AlreadyCertified {
                identifier: certified.blob_id,
                transaction_digest: certified.event.tx_digest,
                event_sequence: certified.event.event_seq,
                end_epoch: certified.end_epoch,
            },
        }
    }
}

impl From<BlobError> for TransferOutcome {
    fn from(error: BlobError) -> Self {
        TransferOutcome::Failed {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethnum::U256;

    #[test]
    fn failure_keeps_kind_and_message() {
        let outcome = TransferOutcome::from(BlobError::StoreRejected {
            status: 413,
            body: "too large".to_string(),
        });

        assert!(!outcome.is_success());
        assert_eq!(outcome.failure_kind(), Some(FailureKind::StoreRejected));
        match &outcome {
            TransferOutcome::Failed { message, .. } => assert!(message.contains("too large")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn markdown_for_already_certified() {
        let outcome = TransferOutcome::AlreadyCertified {
            identifier: BlobId::new(U256::ZERO),
            transaction_digest: "digest".to_string(),
            event_sequence: "4".to_string(),
            end_epoch: 9,
        };

        let markdown = outcome.to_markdown();
        assert!(markdown.starts_with("## Already Certified"));
        assert!(markdown.contains(&"A".repeat(43)));
        assert!(markdown.contains("Transaction Digest: digest"));
        assert_eq!(outcome.identifier(), Some(&BlobId::new(U256::ZERO)));
    }

    #[test]
    fn json_is_tagged() {
        let outcome = TransferOutcome::DownloadCompleted {
            destination_path: PathBuf::from("/tmp/cat.png"),
            detected_type: Some(FileType::Png),
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "downloadCompleted");
        assert_eq!(json["destinationPath"], "/tmp/cat.png");
        assert_eq!(json["detectedType"], "Png");
    }
}
