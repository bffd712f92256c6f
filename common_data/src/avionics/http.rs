use std::time::Duration;

use reqwest;
pub use reqwest::StatusCode;

use thiserror::Error;

pub const STATE_PATH: &str = "/state";
pub const CAMERA1_PATH: &str = "/sensors/camera1";

/// Client for the avionics data endpoint on the local network.
pub struct AvionicsHttp {
    client: reqwest::Client,
    scheme: String,
    host: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },
}

impl AvionicsHttp {
    /// Every request made through this client is bounded by `timeout`.
    pub fn new(scheme: &str, host: &str, timeout: Duration) -> Result<AvionicsHttp, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        return Ok(AvionicsHttp {
            client,
            scheme: scheme.to_string(),
            host: host.to_string(),
        });
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}://{}{}", self.scheme, self.host, path)
    }

    /// GETs `path` and returns the body of a successful response.
    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.url(path);

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => return Err(classify(url, e)),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }

        match response.bytes().await {
            Ok(body) => Ok(body.to_vec()),
            Err(e) => Err(classify(url, e)),
        }
    }
}

fn classify(url: String, source: reqwest::Error) -> FetchError {
    if source.is_timeout() {
        return FetchError::Timeout { url };
    }
    FetchError::Transport { url, source }
}
