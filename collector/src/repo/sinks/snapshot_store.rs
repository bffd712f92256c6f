use std::path::PathBuf;

use tracing::{debug, warn};

/// Writes camera frames as `<dir>/<epoch_seconds>.jpeg`.
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: PathBuf) -> SnapshotStore {
        SnapshotStore { dir }
    }

    pub fn path_for(&self, epoch_seconds: i64) -> PathBuf {
        self.dir.join(format!("{}.jpeg", epoch_seconds))
    }

    /// Returns the written path; every failure is logged and swallowed.
    pub async fn persist(&self, image: &[u8], epoch_seconds: i64) -> Option<PathBuf> {
        let path = self.path_for(epoch_seconds);

        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            warn!(step = "snapshot", dir = %self.dir.display(), error = %e, "failed to create snapshot directory");
            return None;
        }

        match tokio::fs::write(&path, image).await {
            Ok(()) => {
                debug!(path = %path.display(), bytes = image.len(), "saved camera1 image");
                Some(path)
            }
            Err(e) => {
                warn!(step = "snapshot", path = %path.display(), error = %e, "failed to save camera1 image");
                None
            }
        }
    }
}
