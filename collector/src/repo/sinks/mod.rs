pub mod appender;
pub mod publisher;
pub mod snapshot_store;

pub use appender::{AppendOutcome, DurableAppender};
pub use publisher::{MqttPublisher, PublishError, TelemetryPublisher};
pub use snapshot_store::SnapshotStore;
