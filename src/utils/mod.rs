//! Configuration and logging utilities

pub mod config;
pub mod logging;

pub use config::{AppConfig, ConfigError, ConfigurationManager, ReportConfig};
