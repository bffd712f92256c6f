use std::sync::Arc;

use collector::repo::sinks::MqttPublisher;
use collector::signals::shutdown_signal;
use collector::{Args, CollectorConfig, SchedulerLoop};

use common_data::avionics::http::AvionicsHttp;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Optional .env next to the binary
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = CollectorConfig::from_env(args).context("invalid collector configuration")?;

    info!(
        thing = %config.thing_name,
        avionics = %config.avionics_host,
        output = %config.output_root.display(),
        broker = %format!("{}:{}", config.mqtt.host, config.mqtt.port),
        "starting avionics collector"
    );

    let link = AvionicsHttp::new(&config.avionics_scheme, &config.avionics_host, config.fetch_timeout)
        .context("failed to build avionics HTTP client")?;

    // The broker outlives the scheduler so an in-flight publish can still be acknowledged.
    let broker_shutdown = CancellationToken::new();
    let (publisher, broker_task) =
        MqttPublisher::connect(&config.mqtt, config.publish_timeout, broker_shutdown.clone());

    let shutdown = CancellationToken::new();
    let scheduler = SchedulerLoop::new(&config, Arc::new(link), Box::new(publisher), shutdown.clone());
    let mut run = tokio::spawn(scheduler.run());

    let stop = shutdown_signal().context("failed to install signal handlers")?;

    let outcome = tokio::select! {
        signal = stop => {
            info!(signal, "shutdown signal received, finishing current tick...");
            shutdown.cancel();
            (&mut run).await
        }
        res = &mut run => res,
    };

    broker_shutdown.cancel();
    broker_task.await.context("broker task panicked")?;

    let ticks = outcome
        .context("scheduler task panicked")?
        .context("scheduler stopped on a fatal error")?;

    info!(ticks, "collector stopped");
    Ok(())
}
