use common_data::avionics::http::{AvionicsHttp, FetchError};

use async_trait::async_trait;

/// Read access to the avionics endpoint.
#[async_trait]
pub trait AvionicsLink: Send + Sync {
    fn host(&self) -> &str;
    async fn get(&self, path: &str) -> Result<Vec<u8>, FetchError>;
}

#[async_trait]
impl AvionicsLink for AvionicsHttp {
    fn host(&self) -> &str {
        AvionicsHttp::host(self)
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        self.get_bytes(path).await
    }
}
