use std::env;
use std::time::Duration;

use crate::{BlobError, BlobResult};

pub const DEFAULT_AGGREGATOR: &str = "https://aggregator.walrus-testnet.walrus.space";
pub const DEFAULT_PUBLISHER: &str = "https://publisher.walrus-testnet.walrus.space";
pub const DEFAULT_SUI_RPC: &str = "https://fullnode.testnet.sui.io:443";
pub const DEFAULT_BLOB_TYPE: &str =
    "0x7e12d67a52106ddd5f26c6ff4fe740ba5dea7cfc138d5b1d33863ba9098aa6fe::blob::Blob";

/// Configuration for talking to the blob store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Read endpoint base (GET `/v1/{blob_id}`)
    pub aggregator_url: String,

    /// Write endpoint base (PUT `/v1/store`)
    pub publisher_url: String,

    /// Per-request timeout handed to the HTTP transport. `None` leaves it unbounded.
    pub timeout: Option<Duration>,

    /// Classify downloaded content from its first bytes
    pub sniff_downloads: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            aggregator_url: DEFAULT_AGGREGATOR.to_string(),
            publisher_url: DEFAULT_PUBLISHER.to_string(),
            timeout: None,
            sniff_downloads: true,
        }
    }
}

impl StoreConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `WALRUS_AGGREGATOR`, `WALRUS_PUBLISHER`,
    /// `WALRUS_TIMEOUT_SECS` and `WALRUS_SNIFF`
    pub fn from_env() -> BlobResult<Self> {
        let mut config = Self::default();

        if let Ok(url) = env::var("WALRUS_AGGREGATOR") {
            config = config.with_aggregator(url);
        }
        if let Ok(url) = env::var("WALRUS_PUBLISHER") {
            config = config.with_publisher(url);
        }
        if let Ok(secs) = env::var("WALRUS_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| BlobError::invalid(format!("WALRUS_TIMEOUT_SECS is not a number: {secs}")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Ok(flag) = env::var("WALRUS_SNIFF") {
            config.sniff_downloads = parse_flag(&flag)
                .ok_or_else(|| BlobError::invalid(format!("WALRUS_SNIFF is not a boolean: {flag}")))?;
        }

        Ok(config)
    }

    /// Set the aggregator base URL
    pub fn with_aggregator<S: Into<String>>(mut self, url: S) -> Self {
        self.aggregator_url = trim_base(url.into());
        self
    }

    /// Set the publisher base URL
    pub fn with_publisher<S: Into<String>>(mut self, url: S) -> Self {
        self.publisher_url = trim_base(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Skip content sniffing on download
    pub fn without_sniffing(mut self) -> Self {
        self.sniff_downloads = false;
        self
    }

    pub fn store_url(&self) -> String {
        format!("{}/v1/store", self.publisher_url)
    }

    pub fn blob_url(&self, canonical_id: &str) -> String {
        format!("{}/v1/{}", self.aggregator_url, canonical_id)
    }
}

/// Configuration for the Sui full node used to look up blob objects
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub rpc_url: String,

    /// Address whose blob objects are listed
    pub owner: Option<String>,

    /// Move struct type of blob objects
    pub blob_type: String,

    pub timeout: Option<Duration>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_SUI_RPC.to_string(),
            owner: None,
            blob_type: DEFAULT_BLOB_TYPE.to_string(),
            timeout: None,
        }
    }
}

impl LedgerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `SUI_RPC_URL`, `SUI_OWNER` and `WALRUS_BLOB_TYPE`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var("SUI_RPC_URL") {
            config = config.with_rpc_url(url);
        }
        if let Ok(owner) = env::var("SUI_OWNER") {
            config = config.with_owner(owner);
        }
        if let Ok(blob_type) = env::var("WALRUS_BLOB_TYPE") {
            config.blob_type = blob_type;
        }
        config
    }

    pub fn with_rpc_url<S: Into<String>>(mut self, url: S) -> Self {
        self.rpc_url = trim_base(url.into());
        self
    }

    pub fn with_owner<S: Into<String>>(mut self, owner: S) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_blob_type<S: Into<String>>(mut self, blob_type: S) -> Self {
        self.blob_type = blob_type.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

fn trim_base(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
