use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::response::parse_store_response;
use crate::store::{BlobStoreClient, ReadReply};
use crate::{
    BlobError, BlobId, BlobResult, FileType, HttpBlobStore, Sniffer, StoreConfig, TransferOutcome,
    TransferRequest, TransferState,
};

/// Most of an error body kept for the failure message
const ERROR_BODY_LIMIT: usize = 4 * 1024;

/// Drives uploads and downloads against a blob store.
///
/// Holds no per-transfer state, so one orchestrator can run any number of
/// transfers concurrently. Every call walks its own
/// `Idle -> Validating -> InFlight -> Completed | Failed` sequence and returns
/// exactly one [`TransferOutcome`]; errors never escape as `Err`.
#[derive(Clone)]
pub struct TransferOrchestrator {
    store: Arc<dyn BlobStoreClient>,
    sniff_downloads: bool,
}

impl TransferOrchestrator {
    pub fn new<S: BlobStoreClient + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(store),
            sniff_downloads: true,
        }
    }

    /// Share a store client with other components
    pub fn with_store(store: Arc<dyn BlobStoreClient>) -> Self {
        Self {
            store,
            sniff_downloads: true,
        }
    }

    /// HTTP orchestrator for the given endpoints
    pub fn from_config(config: StoreConfig) -> BlobResult<Self> {
        let sniff_downloads = config.sniff_downloads;
        let store = HttpBlobStore::new(config)?;
        Ok(Self::new(store).with_sniffing(sniff_downloads))
    }

    pub fn with_sniffing(mut self, enabled: bool) -> Self {
        self.sniff_downloads = enabled;
        self
    }

    pub fn store(&self) -> &Arc<dyn BlobStoreClient> {
        &self.store
    }

    /// Run a request to completion
    pub async fn execute(&self, request: TransferRequest) -> TransferOutcome {
        match request {
            TransferRequest::Upload { source_path } => self.upload(source_path).await,
            TransferRequest::Download {
                identifier,
                destination_path,
            } => self.download(&identifier, destination_path).await,
        }
    }

    /// Upload a local file, streaming it to the publisher
    pub async fn upload<P: AsRef<Path>>(&self, source_path: P) -> TransferOutcome {
        let mut transfer = Transfer::begin("upload");
        let result = self.try_upload(&mut transfer, source_path.as_ref()).await;
        transfer.finish(result)
    }

    /// Download a blob into `destination_path`.
    ///
    /// Content is written to a uniquely named sibling file and renamed into
    /// place only after the whole body arrived. Dropping the returned future
    /// removes the partial file.
    pub async fn download<P: AsRef<Path>>(&self, identifier: &str, destination_path: P) -> TransferOutcome {
        let mut transfer = Transfer::begin("download");
        let result = self
            .try_download(&mut transfer, identifier, destination_path.as_ref())
            .await;
        transfer.finish(result)
    }

    /// Fetch just enough of a blob to classify it
    pub async fn sniff_remote(&self, identifier: &str) -> BlobResult<FileType> {
        let id = BlobId::from_canonical(identifier)?;
        let mut reply = self.store.read(&id).await?;
        if !reply.is_success() {
            return Err(rejected(reply).await);
        }

        let mut sniffer = Sniffer::new();
        while !sniffer.is_full() {
            match reply.body.next().await {
                Some(chunk) => sniffer.feed(&chunk?),
                None => break,
            }
        }

        // The rest of the body is dropped with the connection.
        Ok(sniffer.classify())
    }

    async fn try_upload(&self, transfer: &mut Transfer, source_path: &Path) -> BlobResult<TransferOutcome> {
        transfer.advance(TransferState::Validating);

        let metadata = tokio::fs::metadata(source_path)
            .await
            .map_err(|e| BlobError::invalid(format!("cannot access {}: {e}", source_path.display())))?;
        if !metadata.is_file() {
            return Err(BlobError::invalid(format!(
                "{} is not a regular file",
                source_path.display()
            )));
        }
        let file = File::open(source_path)
            .await
            .map_err(|e| BlobError::invalid(format!("cannot read {}: {e}", source_path.display())))?;

        transfer.advance(TransferState::InFlight);
        tracing::debug!(
            transfer = %transfer.id,
            path = %source_path.display(),
            size = metadata.len(),
            "streaming file to publisher"
        );

        let reply = self.store.store(Box::pin(ReaderStream::new(file))).await?;
        if !reply.is_success() {
            return Err(BlobError::StoreRejected {
                status: reply.status,
                body: error_body(&reply.body),
            });
        }

        let response = parse_store_response(&reply.body)?;
        Ok(response.into())
    }

    async fn try_download(
        &self,
        transfer: &mut Transfer,
        identifier: &str,
        destination_path: &Path,
    ) -> BlobResult<TransferOutcome> {
        transfer.advance(TransferState::Validating);

        let id = BlobId::from_canonical(identifier.trim())?;
        let (partial, file) = PartialFile::create_beside(destination_path).await?;

        transfer.advance(TransferState::InFlight);
        tracing::debug!(
            transfer = %transfer.id,
            blob_id = %id,
            partial = %partial.path.display(),
            "downloading blob"
        );

        let mut reply = self.store.read(&id).await?;
        if !reply.is_success() {
            return Err(rejected(reply).await);
        }

        let mut sniffer = self.sniff_downloads.then(Sniffer::new);
        let mut writer = BufWriter::new(file);
        let mut written: u64 = 0;

        while let Some(chunk) = reply.body.next().await {
            let chunk = chunk?;
            if let Some(sniffer) = sniffer.as_mut().filter(|s| !s.is_full()) {
                sniffer.feed(&chunk);
            }
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        writer.flush().await?;
        let file = writer.into_inner();
        file.sync_all().await?;
        drop(file);

        if let Some(expected) = reply.content_length {
            if expected != written {
                return Err(BlobError::transfer(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("received {written} of {expected} bytes"),
                )));
            }
        }

        partial.persist(destination_path).await?;

        let detected_type = sniffer.map(|s| s.classify());
        tracing::info!(
            transfer = %transfer.id,
            blob_id = %id,
            bytes = written,
            detected = detected_type.map(|t| t.label()).unwrap_or("-"),
            destination = %destination_path.display(),
            "blob downloaded"
        );

        Ok(TransferOutcome::DownloadCompleted {
            destination_path: destination_path.to_path_buf(),
            detected_type,
        })
    }
}

/// One pass through the transfer state machine
struct Transfer {
    id: Uuid,
    operation: &'static str,
    state: TransferState,
}

impl Transfer {
    fn begin(operation: &'static str) -> Self {
        Self {
            id: Uuid::new_v4(),
            operation,
            state: TransferState::Idle,
        }
    }

    fn advance(&mut self, next: TransferState) {
        debug_assert!(
            !self.state.is_terminal() && next > self.state,
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::debug!(
            transfer = %self.id,
            operation = self.operation,
            from = ?self.state,
            to = ?next,
            "transfer state"
        );
        self.state = next;
    }

    fn finish(mut self, result: BlobResult<TransferOutcome>) -> TransferOutcome {
        match result {
            Ok(outcome) => {
                self.advance(TransferState::Completed);
                if let Some(id) = outcome.identifier() {
                    tracing::info!(transfer = %self.id, blob_id = %id, "blob stored");
                }
                outcome
            }
            Err(error) => {
                self.advance(TransferState::Failed);
                tracing::warn!(
                    transfer = %self.id,
                    operation = self.operation,
                    kind = %error.kind(),
                    "transfer failed: {error}"
                );
                error.into()
            }
        }
    }
}

/// Download target that is removed on drop unless persisted
struct PartialFile {
    path: PathBuf,
    keep: bool,
}

impl PartialFile {
    /// Create a uniquely named file next to `destination`
    async fn create_beside(destination: &Path) -> BlobResult<(Self, File)> {
        let file_name = destination
            .file_name()
            .ok_or_else(|| BlobError::invalid(format!("{} has no file name", destination.display())))?;

        let parent = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let metadata = tokio::fs::metadata(parent)
            .await
            .map_err(|e| BlobError::invalid(format!("cannot access {}: {e}", parent.display())))?;
        if !metadata.is_dir() {
            return Err(BlobError::invalid(format!("{} is not a directory", parent.display())));
        }
        if tokio::fs::metadata(destination)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Err(BlobError::invalid(format!("{} is a directory", destination.display())));
        }

        let path = parent.join(format!(
            ".{}.{}.part",
            file_name.to_string_lossy(),
            Uuid::new_v4().simple()
        ));
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| BlobError::invalid(format!("cannot write to {}: {e}", parent.display())))?;

        Ok((Self { path, keep: false }, file))
    }

    /// Atomically move the finished file to `destination`
    async fn persist(mut self, destination: &Path) -> BlobResult<()> {
        tokio::fs::rename(&self.path, destination).await?;
        self.keep = true;
        Ok(())
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed partial download"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.path.display(), "failed to remove partial download: {e}"),
        }
    }
}

/// Build a `StoreRejected` error from a non-2xx reply, keeping the head of its body
async fn rejected(mut reply: ReadReply) -> BlobError {
    let mut body = Vec::new();
    while body.len() < ERROR_BODY_LIMIT {
        match reply.body.next().await {
            Some(Ok(chunk)) => body.extend_from_slice(&chunk),
            _ => break,
        }
    }

    BlobError::StoreRejected {
        status: reply.status,
        body: error_body(&body),
    }
}

fn error_body(body: &[u8]) -> String {
    String::from_utf8_lossy(&body[..body.len().min(ERROR_BODY_LIMIT)]).into_owned()
}
