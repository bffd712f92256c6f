use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, ClientError, Event, EventLoop, MqttOptions, Packet, QoS};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::MqttConfig;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("broker client rejected the publish: {0}")]
    Client(#[from] ClientError),
    #[error("no acknowledgement from the broker within {0:?}")]
    AckTimeout(Duration),
    #[error("broker connection closed")]
    Closed,
}

/// Sends one serialized telemetry event to a broker topic.
#[async_trait]
pub trait TelemetryPublisher: Send {
    async fn publish(&mut self, topic: &str, payload: Vec<u8>) -> Result<(), PublishError>;
}

/// At-least-once MQTT publisher with a bounded wait for `PUBACK`.
///
/// Ticks never overlap, so at most one publish is outstanding and the next
/// acknowledgement seen on the event loop belongs to it.
pub struct MqttPublisher {
    client: AsyncClient,
    acks: mpsc::UnboundedReceiver<u16>,
    ack_timeout: Duration,
}

impl MqttPublisher {
    /// Spawns the event loop task. It runs until `shutdown` is cancelled.
    pub fn connect(
        cfg: &MqttConfig,
        ack_timeout: Duration,
        shutdown: CancellationToken,
    ) -> (MqttPublisher, JoinHandle<()>) {
        let mut opts = MqttOptions::new(&cfg.client_id, &cfg.host, cfg.port);
        opts.set_keep_alive(cfg.keep_alive);

        let (client, eventloop) = AsyncClient::new(opts, 10);
        let (ack_tx, acks) = mpsc::unbounded_channel();

        let host = format!("{}:{}", cfg.host, cfg.port);
        let join = tokio::spawn(drive(eventloop, ack_tx, host, shutdown));

        (
            MqttPublisher {
                client,
                acks,
                ack_timeout,
            },
            join,
        )
    }
}

async fn drive(
    mut eventloop: EventLoop,
    ack_tx: mpsc::UnboundedSender<u16>,
    host: String,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("MQTT event loop cancelled");
                break;
            }
            ev = eventloop.poll() => {
                match ev {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        info!(broker = %host, "connected to broker");
                    }
                    Ok(Event::Incoming(Packet::PubAck(ack))) => {
                        if ack_tx.send(ack.pkid).is_err() {
                            debug!("publisher dropped, stopping MQTT event loop");
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(broker = %host, error = %e, "MQTT poll error (retrying)");
                        tokio::select! {
                            _ = shutdown.cancelled() => break,
                            _ = tokio::time::sleep(Duration::from_secs(1)) => {}
                        }
                    }
                }
            }
        }
    }
}

/// Discards acks that arrived after an earlier attempt gave up waiting.
fn drain_stale_acks(acks: &mut mpsc::UnboundedReceiver<u16>) -> usize {
    let mut drained = 0;
    while let Ok(pkid) = acks.try_recv() {
        debug!(pkid, "discarding stale broker acknowledgement");
        drained += 1;
    }
    drained
}

#[async_trait]
impl TelemetryPublisher for MqttPublisher {
    async fn publish(&mut self, topic: &str, payload: Vec<u8>) -> Result<(), PublishError> {
        // Acks are matched by order, not pkid: a late ack from a timed-out
        // attempt that lands after this drain is taken for this publish.
        drain_stale_acks(&mut self.acks);

        let client = &self.client;
        let acks = &mut self.acks;
        let attempt = async move {
            client.publish(topic, QoS::AtLeastOnce, false, payload).await?;
            acks.recv().await.ok_or(PublishError::Closed)
        };

        match timeout(self.ack_timeout, attempt).await {
            Ok(Ok(pkid)) => {
                debug!(topic, pkid, "broker acknowledged telemetry");
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(PublishError::AckTimeout(self.ack_timeout)),
        }
    }
}
