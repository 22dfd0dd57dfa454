use std::path::{Component, Path};

use anyhow::{anyhow, bail, Context, Result};
use dog_walrus::{
    FileType, LedgerClient, LedgerConfig, StoreConfig, SuiLedgerClient, TransferOrchestrator,
    TransferOutcome,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListedBlob {
    #[serde(flatten)]
    summary: dog_walrus::BlobObjectSummary,
    file_type: Option<FileType>,
}

pub async fn list(
    store: StoreConfig,
    ledger: LedgerConfig,
    owner: Option<String>,
    sniff: bool,
    output: Output,
) -> Result<()> {
    let owner = owner
        .or_else(|| ledger.owner.clone())
        .ok_or_else(|| anyhow!("no owner given: pass --owner or set SUI_OWNER"))?;

    let client = SuiLedgerClient::new(ledger)?;
    let transfers = TransferOrchestrator::from_config(store)?;

    let objects = client
        .list_blob_objects(&owner)
        .await
        .with_context(|| format!("failed to list blob objects of {owner}"))?;

    let mut listed = Vec::with_capacity(objects.len());
    for summary in objects {
        let file_type = if sniff {
            match transfers.sniff_remote(&summary.blob_id.canonical()).await {
                Ok(file_type) => Some(file_type),
                Err(e) => {
                    tracing::warn!(object_id = %summary.object_id, "could not sniff blob: {e}");
                    None
                }
            }
        } else {
            None
        };
        listed.push(ListedBlob { summary, file_type });
    }

    output.emit(&listed, || {
        if listed.is_empty() {
            return "No blob objects found".to_string();
        }
        listed
            .iter()
            .map(|blob| {
                let s = &blob.summary;
                format!(
                    "{}  {}  {} bytes  certified: {}  stored: {}  type: {}",
                    s.object_id,
                    s.blob_id,
                    s.size,
                    s.certified_epoch.map(|e| e.to_string()).unwrap_or_else(|| "-".to_string()),
                    s.stored_epoch,
                    blob.file_type.map(|t| t.label()).unwrap_or("UNKNOWN"),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    })
}

pub async fn inspect(store: StoreConfig, ledger: LedgerConfig, object_id: &str, output: Output) -> Result<()> {
    let client = SuiLedgerClient::new(ledger)?;
    let transfers = TransferOrchestrator::from_config(store)?;

    let summary = client
        .get_blob_object(object_id)
        .await
        .with_context(|| format!("failed to look up {object_id}"))?;
    let file_type = transfers.sniff_remote(&summary.blob_id.canonical()).await?;

    let listed = ListedBlob {
        summary,
        file_type: Some(file_type),
    };
    output.emit(&listed, || {
        let s = &listed.summary;
        format!(
            "## Blob Object\n\
             - Sui Object ID: {}\n\
             - Blob ID: {}\n\
             - File type: {}\n\
             - Size: {}\n\
             - Certified epoch: {}\n\
             - Stored epoch: {}\n",
            s.object_id,
            s.blob_id,
            file_type,
            s.size,
            s.certified_epoch.map(|e| e.to_string()).unwrap_or_else(|| "-".to_string()),
            s.stored_epoch,
        )
    })
}

pub async fn upload(store: StoreConfig, file: &Path, output: Output) -> Result<()> {
    let transfers = TransferOrchestrator::from_config(store)?;
    tracing::info!(path = %file.display(), "uploading file");

    let outcome = transfers.upload(file).await;
    report(outcome, output)
}

pub async fn download(
    store: StoreConfig,
    blob_id: &str,
    folder: &Path,
    filename: &str,
    output: Output,
) -> Result<()> {
    if filename.trim().is_empty() {
        bail!("please enter a filename");
    }
    if blob_id.trim().is_empty() {
        bail!("please enter a blob id");
    }
    let mut components = Path::new(filename).components();
    if !matches!((components.next(), components.next()), (Some(Component::Normal(_)), None)) {
        bail!("filename must not contain a path: {filename}");
    }

    let transfers = TransferOrchestrator::from_config(store)?;
    tracing::info!(blob_id, folder = %folder.display(), "downloading file");

    let outcome = transfers.download(blob_id, folder.join(filename)).await;
    report(outcome, output)
}

fn report(outcome: TransferOutcome, output: Output) -> Result<()> {
    output.emit(&outcome, || outcome.to_markdown())?;
    match outcome {
        TransferOutcome::Failed { kind, message } => Err(anyhow!("{kind}: {message}")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dog_walrus::FailureKind;

    const QUIET: Output = Output { json: true };

    // nothing listens on port 9
    fn offline() -> StoreConfig {
        StoreConfig::new()
            .with_aggregator("http://127.0.0.1:9")
            .with_publisher("http://127.0.0.1:9")
    }

    #[test]
    fn failed_outcome_is_an_error() {
        let outcome = TransferOutcome::Failed {
            kind: FailureKind::StoreRejected,
            message: "Store rejected the request with status 500".to_string(),
        };
        let err = report(outcome, QUIET).unwrap_err();
        assert!(err.to_string().contains("500"), "{err}");
    }

    #[test]
    fn successful_outcome_is_ok() {
        let outcome = TransferOutcome::DownloadCompleted {
            destination_path: "photo.png".into(),
            detected_type: Some(FileType::Png),
        };
        assert!(report(outcome, QUIET).is_ok());
    }

    #[tokio::test]
    async fn download_rejects_bad_filenames() {
        let folder = std::env::temp_dir();
        for filename in ["", "  ", "a/b", "..", "../x", "/etc/passwd"] {
            let err = download(offline(), "AQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA", &folder, filename, QUIET)
                .await
                .unwrap_err();
            let message = err.to_string();
            assert!(
                message.contains("filename"),
                "{filename:?} was not rejected up front: {message}"
            );
        }
    }

    #[tokio::test]
    async fn download_requires_blob_id() {
        let folder = std::env::temp_dir();
        let err = download(offline(), " ", &folder, "photo.png", QUIET).await.unwrap_err();
        assert!(err.to_string().contains("blob id"), "{err}");
    }
}
