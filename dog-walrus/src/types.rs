use bytes::Bytes;
use futures_core::Stream;
use std::path::PathBuf;
use std::pin::Pin;

use crate::BlobId;

/// Stream of bytes for blob content
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// A single user action against the store. Consumed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferRequest {
    Upload {
        source_path: PathBuf,
    },
    Download {
        identifier: String,
        destination_path: PathBuf,
    },
}

impl TransferRequest {
    pub fn upload<P: Into<PathBuf>>(source_path: P) -> Self {
        Self::Upload {
            source_path: source_path.into(),
        }
    }

    pub fn download<S: Into<String>, P: Into<PathBuf>>(identifier: S, destination_path: P) -> Self {
        Self::Download {
            identifier: identifier.into(),
            destination_path: destination_path.into(),
        }
    }

    /// Download addressed by an already parsed id
    pub fn download_id<P: Into<PathBuf>>(id: BlobId, destination_path: P) -> Self {
        Self::download(id.canonical(), destination_path)
    }
}

/// Lifecycle of one transfer. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TransferState {
    Idle,
    Validating,
    InFlight,
    Completed,
    Failed,
}

impl TransferState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Completed | TransferState::Failed)
    }
}
