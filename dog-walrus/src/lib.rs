//! # dog-walrus: streaming client for the Walrus blob store
//!
//! `dog-walrus` uploads files to a Walrus publisher and downloads blobs from
//! an aggregator without buffering whole payloads in memory.
//!
//! ## Key Features
//!
//! - **Canonical blob ids**: lossless conversion between the 256-bit integer
//!   the ledger records and the 43 character URL-safe id users see
//! - **Content sniffing**: file type detection from magic numbers, table driven
//! - **Safe downloads**: content lands in a unique temp file and is renamed
//!   into place only when complete
//! - **Typed outcomes**: `newlyCreated` and `alreadyCertified` uploads are
//!   distinct variants, failures carry a machine-checkable kind
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dog_walrus::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> BlobResult<()> {
//! let transfers = TransferOrchestrator::from_config(StoreConfig::from_env()?)?;
//!
//! match transfers.upload("photo.png").await {
//!     TransferOutcome::NewlyCreated { identifier, .. } => println!("stored as {identifier}"),
//!     TransferOutcome::AlreadyCertified { identifier, .. } => println!("already stored as {identifier}"),
//!     other => println!("{}", other.to_markdown()),
//! }
//!
//! let outcome = transfers
//!     .download("M4hsZGQ1oCktdzegB6HnI6Mi28S2nqOPHxK-W7_4BUk", "downloads/photo.png")
//!     .await;
//! println!("{}", outcome.to_markdown());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │ TransferOrchestrator │  ← validation, state machine, outcomes
//! ├──────────────────────┤
//! │   BlobStoreClient    │  ← raw PUT / GET (HttpBlobStore)
//! └──────────────────────┘
//!   BlobId, classify()     ← pure helpers used by both layers
//! ```

pub mod blob_id;
mod config;
mod error;
mod http_store;
pub mod ledger;
mod outcome;
pub mod response;
pub mod sniff;
pub mod store;
mod transfer;
mod types;

// Re-export main types for clean API
pub use blob_id::{decode, encode, BlobId};
pub use config::{LedgerConfig, StoreConfig};
pub use error::{BlobError, BlobResult, FailureKind};
pub use http_store::HttpBlobStore;
pub use ledger::{BlobObjectSummary, LedgerClient, SuiLedgerClient};
pub use outcome::TransferOutcome;
pub use sniff::{classify, FileType, Sniffer};
pub use store::{BlobStoreClient, ReadReply, StoreReply};
pub use transfer::TransferOrchestrator;
pub use types::{ByteStream, TransferRequest, TransferState};

pub use ethnum::U256;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BlobError, BlobId, BlobResult, BlobStoreClient, FileType, StoreConfig,
        TransferOrchestrator, TransferOutcome, TransferRequest,
    };
}
