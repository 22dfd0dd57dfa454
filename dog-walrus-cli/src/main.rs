//! Command line front end for the Walrus blob store.
//!
//! ```sh
//! dog-walrus list --owner 0xf134...
//! dog-walrus inspect 0x5a7c...
//! dog-walrus upload ./photo.png
//! dog-walrus download <blob-id> --folder ./downloads --filename photo.png
//! ```
//!
//! Endpoints come from `.env` / the environment (`WALRUS_AGGREGATOR`,
//! `WALRUS_PUBLISHER`, `SUI_RPC_URL`, `SUI_OWNER`, ...) and can be overridden
//! with flags.

mod commands;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dog_walrus::{LedgerConfig, StoreConfig};

#[derive(Parser, Debug)]
#[command(name = "dog-walrus")]
#[command(about = "Store and fetch blobs on Walrus")]
struct Args {
    /// Aggregator base URL (reads)
    #[arg(long, global = true, env = "WALRUS_AGGREGATOR")]
    aggregator: Option<String>,

    /// Publisher base URL (writes)
    #[arg(long, global = true, env = "WALRUS_PUBLISHER")]
    publisher: Option<String>,

    /// Sui full node JSON-RPC URL
    #[arg(long, global = true, env = "SUI_RPC_URL")]
    rpc_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "WALRUS_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Print outcomes as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List blob objects owned by an address
    List {
        /// Owner address
        #[arg(long, env = "SUI_OWNER")]
        owner: Option<String>,

        /// Fetch the first bytes of every blob to report its file type
        #[arg(long)]
        sniff: bool,
    },
    /// Look up a blob object and report its blob id and file type
    Inspect {
        object_id: String,
    },
    /// Upload a file
    Upload {
        file: PathBuf,
    },
    /// Download a blob into a folder
    Download {
        blob_id: String,

        #[arg(long)]
        folder: PathBuf,

        /// File name, with extension
        #[arg(long)]
        filename: String,

        /// Skip file type detection
        #[arg(long)]
        no_sniff: bool,
    },
}

impl Args {
    fn store_config(&self) -> Result<StoreConfig> {
        let mut config = StoreConfig::from_env()?;
        if let Some(url) = &self.aggregator {
            config = config.with_aggregator(url.clone());
        }
        if let Some(url) = &self.publisher {
            config = config.with_publisher(url.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    fn ledger_config(&self) -> LedgerConfig {
        let mut config = LedgerConfig::from_env();
        if let Some(url) = &self.rpc_url {
            config = config.with_rpc_url(url.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let store = args.store_config()?;
    let ledger = args.ledger_config();
    let output = commands::Output { json: args.json };

    match args.command {
        Command::List { owner, sniff } => commands::list(store, ledger, owner, sniff, output).await,
        Command::Inspect { object_id } => commands::inspect(store, ledger, &object_id, output).await,
        Command::Upload { file } => commands::upload(store, &file, output).await,
        Command::Download {
            blob_id,
            folder,
            filename,
            no_sniff,
        } => {
            let store = if no_sniff { store.without_sniffing() } else { store };
            commands::download(store, &blob_id, &folder, &filename, output).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn endpoint_flags_fall_back_to_env() {
        let command = Args::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .and_then(|env| env.to_str())
                .map(str::to_string)
        };

        assert_eq!(env_of("aggregator").as_deref(), Some("WALRUS_AGGREGATOR"));
        assert_eq!(env_of("publisher").as_deref(), Some("WALRUS_PUBLISHER"));
        assert_eq!(env_of("rpc_url").as_deref(), Some("SUI_RPC_URL"));
        assert_eq!(env_of("timeout_secs").as_deref(), Some("WALRUS_TIMEOUT_SECS"));
    }

    #[test]
    fn flags_override_config() {
        let args = Args::try_parse_from([
            "dog-walrus",
            "--aggregator",
            "http://localhost:31415/",
            "--timeout-secs",
            "7",
            "upload",
            "photo.png",
        ])
        .unwrap();

        let config = args.store_config().unwrap();
        assert_eq!(config.aggregator_url, "http://localhost:31415");
        assert_eq!(config.timeout, Some(Duration::from_secs(7)));
        assert!(matches!(args.command, Command::Upload { .. }));
    }
}
