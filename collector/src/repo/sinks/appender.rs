use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Written,
    /// The log could not be opened for a permission or missing-path reason.
    Skipped,
}

/// Newline-delimited JSON log. The file is opened and closed on every append.
pub struct DurableAppender {
    path: PathBuf,
}

impl DurableAppender {
    pub fn new(path: PathBuf) -> DurableAppender {
        DurableAppender { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Permission and not-found errors are logged and reported as
    /// `Skipped`; any other I/O error is returned to the caller.
    pub async fn append(&self, payload: &[u8]) -> io::Result<AppendOutcome> {
        match self.write_record(payload).await {
            Ok(()) => Ok(AppendOutcome::Written),
            Err(e) if is_contained(e.kind()) => {
                warn!(
                    step = "append",
                    path = %self.path.display(),
                    error = %e,
                    "failed to append-write telemetry event"
                );
                Ok(AppendOutcome::Skipped)
            }
            Err(e) => Err(e),
        }
    }

    async fn write_record(&self, payload: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        let mut record = Vec::with_capacity(payload.len() + 1);
        record.extend_from_slice(payload);
        record.push(b'\n');

        file.write_all(&record).await?;
        file.flush().await
    }
}

/// Error kinds the appender swallows. Anything else points at a defect.
fn is_contained(kind: io::ErrorKind) -> bool {
    matches!(kind, io::ErrorKind::PermissionDenied | io::ErrorKind::NotFound)
}
