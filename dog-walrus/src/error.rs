use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for blob operations
pub type BlobResult<T> = Result<T, BlobError>;

/// Errors that can occur during blob operations
#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Value does not fit in 256 bits: {value}")]
    OutOfRange { value: String },

    #[error("Malformed blob id {text:?}: {reason}")]
    MalformedIdentifier { text: String, reason: String },

    #[error("Store rejected the request with status {status}: {body}")]
    StoreRejected { status: u16, body: String },

    #[error("Unexpected store response: {message}")]
    ResponseSchema { message: String },

    #[error("Transfer failed: {source}")]
    Transfer {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Ledger lookup failed: {message}")]
    Ledger { message: String },
}

/// Machine-checkable failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    InvalidInput,
    OutOfRange,
    MalformedIdentifier,
    StoreRejected,
    ResponseSchemaError,
    TransferError,
    LedgerError,
}

impl BlobError {
    /// Wrap any transport or filesystem error
    pub fn transfer<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transfer {
            source: Box::new(error),
        }
    }

    /// Create an invalid input error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn malformed<T: Into<String>, R: Into<String>>(text: T, reason: R) -> Self {
        Self::MalformedIdentifier {
            text: text.into(),
            reason: reason.into(),
        }
    }

    pub fn schema<S: Into<String>>(message: S) -> Self {
        Self::ResponseSchema {
            message: message.into(),
        }
    }

    pub fn ledger<S: Into<String>>(message: S) -> Self {
        Self::Ledger {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            BlobError::InvalidInput { .. } => FailureKind::InvalidInput,
            BlobError::OutOfRange { .. } => FailureKind::OutOfRange,
            BlobError::MalformedIdentifier { .. } => FailureKind::MalformedIdentifier,
            BlobError::StoreRejected { .. } => FailureKind::StoreRejected,
            BlobError::ResponseSchema { .. } => FailureKind::ResponseSchemaError,
            BlobError::Transfer { .. } => FailureKind::TransferError,
            BlobError::Ledger { .. } => FailureKind::LedgerError,
        }
    }
}

impl From<std::io::Error> for BlobError {
    fn from(error: std::io::Error) -> Self {
        Self::transfer(error)
    }
}

impl From<reqwest::Error> for BlobError {
    fn from(error: reqwest::Error) -> Self {
        Self::transfer(error)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureKind::InvalidInput => "InvalidInput",
            FailureKind::OutOfRange => "OutOfRange",
            FailureKind::MalformedIdentifier => "MalformedIdentifier",
            FailureKind::StoreRejected => "StoreRejected",
            FailureKind::ResponseSchemaError => "ResponseSchemaError",
            FailureKind::TransferError => "TransferError",
            FailureKind::LedgerError => "LedgerError",
        };
        f.write_str(name)
    }
}
