//! Blob identifiers.
//!
//! The ledger records a blob id as a 256-bit unsigned integer, printed in
//! decimal. Users and the aggregator work with a 43 character URL-safe
//! base64 string of the same value in little-endian byte order. [`encode`]
//! and [`decode`] convert between the two; [`BlobId`] carries both.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ethnum::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{BlobError, BlobResult};

/// Width of a blob id in bytes
pub const BLOB_ID_BYTES: usize = 32;

/// Length of the canonical textual form
pub const BLOB_ID_TEXT_LEN: usize = 43;

/// Encode a 256-bit value as its canonical identifier.
///
/// The value is always rendered over the full 32 bytes, so every value has
/// exactly one 43 character form.
pub fn encode(value: U256) -> String {
    URL_SAFE_NO_PAD.encode(value.to_le_bytes())
}

/// Decode a canonical identifier back into its 256-bit value.
pub fn decode(text: &str) -> BlobResult<U256> {
    // Restore padding so both padded and unpadded input is accepted.
    let mut padded = String::with_capacity(text.len() + 3);
    padded.push_str(text);
    while padded.len() % 4 != 0 {
        padded.push('=');
    }

    let bytes = base64::engine::general_purpose::URL_SAFE
        .decode(padded.as_bytes())
        .map_err(|e| BlobError::malformed(text, e.to_string()))?;

    let bytes: [u8; BLOB_ID_BYTES] = bytes.as_slice().try_into().map_err(|_| {
        BlobError::malformed(
            text,
            format!("decoded to {} bytes, expected {}", bytes.len(), BLOB_ID_BYTES),
        )
    })?;

    Ok(U256::from_le_bytes(bytes))
}

/// A blob identifier: the integer recorded on the ledger and its canonical text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlobId(U256);

impl BlobId {
    /// Wrap a raw 256-bit value
    pub const fn new(value: U256) -> Self {
        Self(value)
    }

    /// Parse the decimal form the ledger reports in `blob_id` fields
    pub fn from_decimal(text: &str) -> BlobResult<Self> {
        let digits = text.trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BlobError::malformed(text, "not a decimal integer"));
        }

        U256::from_str_radix(digits, 10)
            .map(Self)
            .map_err(|_| BlobError::OutOfRange {
                value: digits.to_string(),
            })
    }

    /// Parse a canonical (base64) identifier
    pub fn from_canonical(text: &str) -> BlobResult<Self> {
        decode(text).map(Self)
    }

    /// The integer value
    pub fn value(&self) -> U256 {
        self.0
    }

    /// The canonical 43 character form
    pub fn canonical(&self) -> String {
        encode(self.0)
    }

    /// Decimal form, as the ledger stores it
    pub fn to_decimal(&self) -> String {
        self.0.to_string()
    }
}

impl From<U256> for BlobId {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl FromStr for BlobId {
    type Err = BlobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_canonical(s)
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl Serialize for BlobId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical())
    }
}

impl<'de> Deserialize<'de> for BlobId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_canonical(&text).map_err(serde::de::Error::custom)
    }
}
