pub mod config;
pub mod repo;
pub mod scheduler;
pub mod signals;
pub mod sim;

pub use config::{Args, CollectorConfig};
pub use scheduler::{SchedulerLoop, TickError, TickReport};
