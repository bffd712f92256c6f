pub mod link;
pub mod snapshot;
pub mod telemetry;

pub use link::AvionicsLink;
pub use snapshot::SnapshotSource;
pub use telemetry::TelemetrySource;
