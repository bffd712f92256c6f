//! Fixed-period sampling loop.
//!
//! Each tick runs source, publish, append and snapshot in that order. A
//! failing step is logged and recorded in the `TickReport`; the remaining
//! steps still run and the next tick is still scheduled. Only defects that
//! would silently corrupt output (`TickError`) stop the loop.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::CollectorConfig;
use crate::repo::sinks::{AppendOutcome, DurableAppender, SnapshotStore, TelemetryPublisher};
use crate::repo::sources::{AvionicsLink, SnapshotSource, TelemetrySource};
use crate::sim::SimulatedStateModel;

#[derive(Debug, Error)]
pub enum TickError {
    #[error("failed to serialize telemetry payload: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("unexpected I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub sampled: bool,
    pub published: bool,
    pub appended: bool,
    pub snapshot: Option<PathBuf>,
}

pub struct SchedulerLoop {
    telemetry: TelemetrySource,
    snapshots: SnapshotSource,
    publisher: Box<dyn TelemetryPublisher>,
    appender: DurableAppender,
    store: SnapshotStore,
    topic: String,
    period: Duration,
    shutdown: CancellationToken,
}

impl SchedulerLoop {
    pub fn new(
        config: &CollectorConfig,
        link: Arc<dyn AvionicsLink>,
        publisher: Box<dyn TelemetryPublisher>,
        shutdown: CancellationToken,
    ) -> SchedulerLoop {
        let model = SimulatedStateModel::new(config.thing_name.clone());
        Self::with_model(config, model, link, publisher, shutdown)
    }

    pub fn with_model(
        config: &CollectorConfig,
        model: SimulatedStateModel,
        link: Arc<dyn AvionicsLink>,
        publisher: Box<dyn TelemetryPublisher>,
        shutdown: CancellationToken,
    ) -> SchedulerLoop {
        SchedulerLoop {
            telemetry: TelemetrySource::new(link.clone(), model, config.validate_live),
            snapshots: SnapshotSource::new(link),
            publisher,
            appender: DurableAppender::new(config.telemetry_log_path()),
            store: SnapshotStore::new(config.snapshot_dir()),
            topic: config.telemetry_topic(),
            period: config.period,
            shutdown,
        }
    }

    pub fn model(&self) -> &SimulatedStateModel {
        self.telemetry.model()
    }

    /// Runs one tick to completion.
    pub async fn tick(&mut self) -> Result<TickReport, TickError> {
        let payload = self.telemetry.fetch().await;
        let sampled = payload.is_sample();
        let bytes = payload.to_json_bytes()?;

        let published = match self.publisher.publish(&self.topic, bytes.clone()).await {
            Ok(()) => true,
            Err(e) => {
                warn!(step = "publish", topic = %self.topic, error = %e, "failed to publish message");
                false
            }
        };

        let appended = match self.appender.append(&bytes).await {
            Ok(outcome) => outcome == AppendOutcome::Written,
            Err(source) => {
                return Err(TickError::Io {
                    path: self.appender.path().to_path_buf(),
                    source,
                })
            }
        };

        let snapshot = match self.snapshots.fetch_image().await {
            Some(image) => self.store.persist(&image, Utc::now().timestamp()).await,
            None => None,
        };

        Ok(TickReport {
            sampled,
            published,
            appended,
            snapshot,
        })
    }

    /// Ticks until cancelled and returns the number of completed ticks.
    ///
    /// The period is measured from the end of one tick to the start of the
    /// next, so the effective interval is `period` plus the tick duration.
    /// Cancellation is observed between ticks only.
    pub async fn run(mut self) -> Result<u64, TickError> {
        let mut ticks: u64 = 0;
        info!(topic = %self.topic, period = ?self.period, "publishing periodic telemetry data");

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!(ticks, "shutdown requested, sampling stopped");
                    return Ok(ticks);
                }
                _ = tokio::time::sleep(self.period) => {}
            }

            let report = self.tick().await?;
            ticks += 1;
            debug!(
                tick = ticks,
                sampled = report.sampled,
                published = report.published,
                appended = report.appended,
                snapshot = report.snapshot.is_some(),
                "tick complete"
            );
        }
    }
}
