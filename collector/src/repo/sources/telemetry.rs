use std::sync::Arc;

use common_data::avionics::data::telemetry::{Telemetry, TelemetryPayload};
use common_data::avionics::http::{FetchError, STATE_PATH};

use chrono::Utc;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::link::AvionicsLink;
use crate::sim::SimulatedStateModel;

#[derive(Debug, Error)]
enum LiveStateError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("state body is not JSON: {0}")]
    Parse(serde_json::Error),
    #[error("state body does not match the telemetry schema: {0}")]
    Schema(serde_json::Error),
}

/// Produces exactly one payload per tick: the live `/state` reading when the
/// avionics answers, otherwise a record derived from the simulation.
pub struct TelemetrySource {
    link: Arc<dyn AvionicsLink>,
    model: SimulatedStateModel,
    validate_live: bool,
}

impl TelemetrySource {
    pub fn new(link: Arc<dyn AvionicsLink>, model: SimulatedStateModel, validate_live: bool) -> TelemetrySource {
        TelemetrySource {
            link,
            model,
            validate_live,
        }
    }

    pub fn model(&self) -> &SimulatedStateModel {
        &self.model
    }

    pub async fn fetch(&mut self) -> TelemetryPayload {
        match self.fetch_live().await {
            Ok(value) => {
                debug!(host = self.link.host(), "using live avionics state");
                TelemetryPayload::Live(value)
            }
            Err(e) => {
                warn!(
                    step = "telemetry",
                    host = self.link.host(),
                    error = %e,
                    "failed to get telemetry from avionics, using sampled state"
                );
                TelemetryPayload::Sampled(self.model.derive_snapshot(Utc::now().timestamp_millis()))
            }
        }
    }

    async fn fetch_live(&self) -> Result<Value, LiveStateError> {
        let body = self.link.get(STATE_PATH).await?;
        let value: Value = serde_json::from_slice(&body).map_err(LiveStateError::Parse)?;

        if self.validate_live {
            serde_json::from_value::<Telemetry>(value.clone()).map_err(LiveStateError::Schema)?;
        }

        Ok(value)
    }
}
