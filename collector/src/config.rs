use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use uuid::Uuid;

pub const THING_NAME_VAR: &str = "AWS_IOT_THING_NAME";

const TELEMETRY_LOG_FILE: &str = "telemetry.json";

#[derive(Parser, Debug, Clone)]
#[command(about = "Sample avionics telemetry and publish it to the broker")]
pub struct Args {
    /// Host (optionally host:port) of the avionics data endpoint
    pub avionics_host: String,
    /// Root directory for the telemetry log and camera snapshots
    pub output_root: PathBuf,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set to the thing name of this device")]
    MissingThingName(&'static str),
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub keep_alive: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectorConfig {
    pub avionics_host: String,
    pub avionics_scheme: String,
    pub output_root: PathBuf,
    pub thing_name: String,
    pub mqtt: MqttConfig,
    pub period: Duration,
    pub fetch_timeout: Duration,
    pub publish_timeout: Duration,
    pub validate_live: bool,
}

impl CollectorConfig {
    /// Reads everything but the positional arguments from the process
    /// environment. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env(args: Args) -> Result<CollectorConfig, ConfigError> {
        Self::from_lookup(args, |name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(args: Args, lookup: F) -> Result<CollectorConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let thing_name = match lookup(THING_NAME_VAR) {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => return Err(ConfigError::MissingThingName(THING_NAME_VAR)),
        };

        let client_id = lookup("COLLECTOR_MQTT_CLIENT_ID")
            .unwrap_or_else(|| format!("avionics-collector-{}", Uuid::new_v4()));

        let mqtt = MqttConfig {
            host: lookup("COLLECTOR_MQTT_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: parse_or(&lookup, "COLLECTOR_MQTT_PORT", 1883)?,
            client_id,
            keep_alive: Duration::from_secs(parse_or(&lookup, "COLLECTOR_MQTT_KEEP_ALIVE_SECS", 30)?),
        };

        let period_secs: u64 = parse_or(&lookup, "COLLECTOR_PERIOD_SECS", 5)?;
        if period_secs == 0 {
            return Err(ConfigError::Zero("COLLECTOR_PERIOD_SECS"));
        }
        let fetch_ms: u64 = parse_or(&lookup, "COLLECTOR_FETCH_TIMEOUT_MS", 1_000)?;
        if fetch_ms == 0 {
            return Err(ConfigError::Zero("COLLECTOR_FETCH_TIMEOUT_MS"));
        }
        let publish_ms: u64 = parse_or(&lookup, "COLLECTOR_PUBLISH_TIMEOUT_MS", 5_000)?;
        if publish_ms == 0 {
            return Err(ConfigError::Zero("COLLECTOR_PUBLISH_TIMEOUT_MS"));
        }

        return Ok(CollectorConfig {
            avionics_host: args.avionics_host,
            avionics_scheme: lookup("COLLECTOR_AVIONICS_SCHEME").unwrap_or_else(|| "https".to_string()),
            output_root: args.output_root,
            thing_name,
            mqtt,
            period: Duration::from_secs(period_secs),
            fetch_timeout: Duration::from_millis(fetch_ms),
            publish_timeout: Duration::from_millis(publish_ms),
            validate_live: parse_or(&lookup, "COLLECTOR_VALIDATE_LIVE", false)?,
        });
    }

    pub fn telemetry_topic(&self) -> String {
        format!("flythings/{}/avionics/telemetry", self.thing_name)
    }

    pub fn telemetry_log_path(&self) -> PathBuf {
        self.output_root.join(TELEMETRY_LOG_FILE)
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        self.output_root.join("sensors").join("camera1")
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}
