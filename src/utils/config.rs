use crate::api::types::{LineEnding, ReportFormat};
use crate::hardware::{FixMode, FixTimeout, SensorMode, UartOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Cold starts rarely produce a 3D fix faster than this (seconds)
const COLD_START_FIX_S: u32 = 30;

/// Highest baud rate the low energy UART sustains without a HF clock
const LEUART_MAX_BAUD: u32 = 9600;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Output stream settings
    pub uart: UartOptions,
    /// Receiver mode for the fix session
    pub fix_mode: FixMode,
    /// Fix session length
    pub fix_timeout: FixTimeout,
    /// Role on the sensor network
    pub sensor_mode: SensorMode,
    /// Erase flash variables during setup
    pub reset_flash_variables: bool,
    /// Report output settings
    #[serde(default)]
    pub report: ReportConfig,
    /// Enable debug logging
    #[serde(default)]
    pub debug_logging: bool,
}

/// Report output settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub format: ReportFormat,
    pub line_ending: LineEnding,
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid parameter value
    InvalidParameter { parameter: String, value: String, reason: String },
    /// Configuration file I/O error
    IoError { message: String },
    /// JSON serialization/deserialization error
    SerializationError { message: String },
}

/// Configuration validation result
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ConfigError>,
    pub warnings: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            uart: UartOptions::default(),
            fix_mode: FixMode::Navigation,
            fix_timeout: FixTimeout::Infinite,
            sensor_mode: SensorMode::Transmitter,
            reset_flash_variables: true,
            report: ReportConfig::default(),
            debug_logging: false,
        }
    }
}

impl AppConfig {
    /// Load a configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read {}: {}", path.as_ref().display(), e),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::SerializationError {
            message: format!("Failed to parse configuration: {}", e),
        })
    }

    /// Save the configuration as pretty JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializationError {
            message: format!("Failed to serialize configuration: {}", e),
        })?;

        fs::write(path.as_ref(), content).map_err(|e| ConfigError::IoError {
            message: format!("Failed to write {}: {}", path.as_ref().display(), e),
        })
    }

    /// Validate every parameter, collecting all errors and warnings
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if let Err(e) = self.uart.validate() {
            result.errors.push(ConfigError::InvalidParameter {
                parameter: "uart".to_string(),
                value: format!("{:?}", self.uart),
                reason: e.to_string(),
            });
        }

        if self.uart.device.starts_with("LEUART") && self.uart.baud_rate > LEUART_MAX_BAUD {
            result.warnings.push(format!(
                "{} at {} baud needs the high frequency clock running",
                self.uart.device, self.uart.baud_rate
            ));
        }

        if self.fix_mode == FixMode::Off {
            result.errors.push(ConfigError::InvalidParameter {
                parameter: "fix_mode".to_string(),
                value: self.fix_mode.to_string(),
                reason: "receiver must be powered to acquire a fix".to_string(),
            });
        }

        match self.fix_timeout {
            FixTimeout::Seconds(0) => {
                result.errors.push(ConfigError::InvalidParameter {
                    parameter: "fix_timeout".to_string(),
                    value: "0".to_string(),
                    reason: "timeout must be positive".to_string(),
                });
            }
            FixTimeout::Seconds(seconds) if seconds < COLD_START_FIX_S => {
                result.warnings.push(format!(
                    "Fix timeout of {}s is shorter than a typical cold start",
                    seconds
                ));
            }
            _ => {}
        }

        if self.report.format == ReportFormat::Json && self.report.line_ending == LineEnding::CrLf {
            result
                .warnings
                .push("JSON reports are usually consumed with LF line endings".to_string());
        }

        result.is_valid = result.errors.is_empty();
        result
    }

    /// Validate and return the first error, if any
    pub fn check(&self) -> Result<(), ConfigError> {
        match self.validate().errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Owns the active configuration and tracks where it came from
#[derive(Debug, Default)]
pub struct ConfigurationManager {
    config: AppConfig,
    config_file_path: Option<String>,
    is_modified: bool,
}

impl ConfigurationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = AppConfig::load_from_file(path.as_ref())?;
        config.check()?;
        Ok(Self {
            config,
            config_file_path: Some(path.as_ref().to_string_lossy().into_owned()),
            is_modified: false,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Replace the configuration after validating it
    pub fn update_config(&mut self, config: AppConfig) -> Result<(), ConfigError> {
        config.check()?;
        self.config = config;
        self.is_modified = true;
        Ok(())
    }

    pub fn set_fix_timeout(&mut self, timeout: FixTimeout) -> Result<FixTimeout, ConfigError> {
        let mut config = self.config.clone();
        let old = config.fix_timeout;
        config.fix_timeout = timeout;
        self.update_config(config)?;
        Ok(old)
    }

    pub fn set_report_format(&mut self, format: ReportFormat) -> ReportFormat {
        let old = self.config.report.format;
        self.config.report.format = format;
        self.is_modified = true;
        old
    }

    /// Save back to the file the configuration was loaded from
    pub fn save(&mut self) -> Result<(), ConfigError> {
        let path = self.config_file_path.clone().ok_or_else(|| ConfigError::IoError {
            message: "No configuration file path set".to_string(),
        })?;
        self.save_to_file(path)
    }

    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        self.config.save_to_file(path.as_ref())?;
        self.config_file_path = Some(path.as_ref().to_string_lossy().into_owned());
        self.is_modified = false;
        Ok(())
    }

    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    pub fn into_config(self) -> AppConfig {
        self.config
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidParameter { parameter, value, reason } => {
                write!(f, "Invalid parameter {}: {} ({})", parameter, value, reason)
            }
            ConfigError::IoError { message } => {
                write!(f, "I/O error: {}", message)
            }
            ConfigError::SerializationError { message } => {
                write!(f, "Serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
