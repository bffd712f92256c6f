use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use collector::config::THING_NAME_VAR;
use collector::repo::sinks::{PublishError, TelemetryPublisher};
use collector::{Args, CollectorConfig, SchedulerLoop};
use common_data::avionics::http::AvionicsHttp;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Default)]
struct Recorder {
    published: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

#[async_trait]
impl TelemetryPublisher for Recorder {
    async fn publish(&mut self, topic: &str, payload: Vec<u8>) -> Result<(), PublishError> {
        self.published.lock().unwrap().push((topic.to_string(), payload));
        Ok(())
    }
}

/// Answers every request with the given status and an empty body.
async fn avionics_answering(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(s) => s,
                Err(_) => return,
            };
            tokio::spawn(async move {
                let mut buff = [0; 4096];
                let _ = socket.read(&mut buff).await;
                let response = format!("HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n", status_line);
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr.to_string()
}

fn config(host: String, root: PathBuf) -> CollectorConfig {
    let args = Args {
        avionics_host: host,
        output_root: root,
    };
    CollectorConfig::from_lookup(args, |name| match name {
        THING_NAME_VAR => Some("drone-7".to_string()),
        "COLLECTOR_AVIONICS_SCHEME" => Some("http".to_string()),
        _ => None,
    })
    .unwrap()
}

#[tokio::test]
async fn server_error_on_state_publishes_a_sample() {
    let host = avionics_answering("500 Internal Server Error").await;
    let root = tempfile::tempdir().unwrap();
    let config = config(host, root.path().to_path_buf());

    let link = AvionicsHttp::new(&config.avionics_scheme, &config.avionics_host, Duration::from_secs(1)).unwrap();
    let recorder = Recorder::default();
    let mut scheduler = SchedulerLoop::new(
        &config,
        Arc::new(link),
        Box::new(recorder.clone()),
        CancellationToken::new(),
    );

    let report = scheduler.tick().await.unwrap();

    assert!(report.sampled);
    assert!(report.published);
    assert!(report.appended);
    assert_eq!(report.snapshot, None);

    let published = recorder.published.lock().unwrap();
    assert_eq!(published.len(), 1);
    let (topic, payload) = &published[0];
    assert_eq!(topic, "flythings/drone-7/avionics/telemetry");

    let event: serde_json::Value = serde_json::from_slice(payload).unwrap();
    assert_eq!(event["sample"], serde_json::Value::Bool(true));
    assert_eq!(event["thing_name"], "drone-7");

    let logged = std::fs::read_to_string(config.telemetry_log_path()).unwrap();
    assert_eq!(logged.lines().count(), 1);
}

#[tokio::test]
async fn unreachable_avionics_still_produces_a_tick() {
    // Nothing listens on this port once the listener is dropped.
    let host = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().to_string()
    };
    let root = tempfile::tempdir().unwrap();
    let config = config(host, root.path().to_path_buf());

    let link = AvionicsHttp::new(&config.avionics_scheme, &config.avionics_host, Duration::from_secs(1)).unwrap();
    let recorder = Recorder::default();
    let mut scheduler = SchedulerLoop::new(
        &config,
        Arc::new(link),
        Box::new(recorder.clone()),
        CancellationToken::new(),
    );

    let first = scheduler.tick().await.unwrap();
    let second = scheduler.tick().await.unwrap();

    assert!(first.sampled && second.sampled);
    assert_eq!(recorder.published.lock().unwrap().len(), 2);
}
