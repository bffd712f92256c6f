//! In-memory stand-ins for the avionics endpoint and the broker.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use common_data::avionics::http::{FetchError, StatusCode};

use async_trait::async_trait;

use super::sinks::publisher::{PublishError, TelemetryPublisher};
use super::sources::link::AvionicsLink;

#[derive(Debug, Clone)]
pub enum Reply {
    Body(Vec<u8>),
    Status(u16),
    Timeout,
}

#[derive(Clone, Default)]
pub struct FakeLink {
    replies: Arc<Mutex<HashMap<String, Reply>>>,
    calls: Arc<Mutex<HashMap<String, usize>>>,
}

impl FakeLink {
    pub fn new() -> FakeLink {
        FakeLink::default()
    }

    pub fn reply(self, path: &str, reply: Reply) -> FakeLink {
        self.replies.lock().unwrap().insert(path.to_string(), reply);
        self
    }

    pub fn calls(&self, path: &str) -> usize {
        self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

#[async_trait]
impl AvionicsLink for FakeLink {
    fn host(&self) -> &str {
        "avionics.test"
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        *self.calls.lock().unwrap().entry(path.to_string()).or_insert(0) += 1;

        let url = format!("https://avionics.test{}", path);
        match self.replies.lock().unwrap().get(path).cloned() {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Status(code)) => Err(FetchError::Status {
                url,
                status: StatusCode::from_u16(code).unwrap(),
            }),
            Some(Reply::Timeout) | None => Err(FetchError::Timeout { url }),
        }
    }
}

/// Records every publish; optionally fails all of them after recording.
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    pub published: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    failing: bool,
}

impl RecordingPublisher {
    pub fn new() -> RecordingPublisher {
        RecordingPublisher::default()
    }

    pub fn failing() -> RecordingPublisher {
        RecordingPublisher {
            failing: true,
            ..RecordingPublisher::default()
        }
    }

    pub fn count(&self) -> usize {
        self.published.lock().unwrap().len()
    }

    pub fn last_json(&self) -> serde_json::Value {
        let published = self.published.lock().unwrap();
        let (_, payload) = published.last().expect("nothing published");
        serde_json::from_slice(payload).unwrap()
    }
}

#[async_trait]
impl TelemetryPublisher for RecordingPublisher {
    async fn publish(&mut self, topic: &str, payload: Vec<u8>) -> Result<(), PublishError> {
        self.published.lock().unwrap().push((topic.to_string(), payload));
        if self.failing {
            return Err(PublishError::AckTimeout(std::time::Duration::from_millis(1)));
        }
        Ok(())
    }
}
