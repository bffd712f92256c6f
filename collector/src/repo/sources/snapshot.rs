use std::sync::Arc;

use common_data::avionics::http::CAMERA1_PATH;

use tracing::warn;

use super::link::AvionicsLink;

/// Camera image for the current tick, if the avionics has one to give.
pub struct SnapshotSource {
    link: Arc<dyn AvionicsLink>,
}

impl SnapshotSource {
    pub fn new(link: Arc<dyn AvionicsLink>) -> SnapshotSource {
        SnapshotSource { link }
    }

    pub async fn fetch_image(&self) -> Option<Vec<u8>> {
        match self.link.get(CAMERA1_PATH).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(
                    step = "snapshot",
                    host = self.link.host(),
                    error = %e,
                    "failed to get image from camera1"
                );
                None
            }
        }
    }
}
