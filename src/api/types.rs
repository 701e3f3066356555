//! Common API types and error definitions

use crate::hardware::HardwareError;
use crate::utils::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API error types
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Hardware collaborator failure
    HardwareError { error: HardwareError },
    /// Invalid configuration
    ConfigurationError { error: ConfigError },
    /// Loop called before setup
    NotInitialized,
}

impl From<HardwareError> for ApiError {
    fn from(error: HardwareError) -> Self {
        ApiError::HardwareError { error }
    }
}

impl From<ConfigError> for ApiError {
    fn from(error: ConfigError) -> Self {
        ApiError::ConfigurationError { error }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::HardwareError { error } => write!(f, "Hardware error: {}", error),
            ApiError::ConfigurationError { error } => write!(f, "Configuration error: {}", error),
            ApiError::NotInitialized => write!(f, "Application setup has not run"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Whether the main loop can keep running after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ApiError::HardwareError { error } if error.is_recoverable())
    }
}

/// Output format of the fix reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// Human-readable terminal lines
    Text,
    /// One JSON document per fix event
    Json,
}

impl Default for ReportFormat {
    fn default() -> Self {
        ReportFormat::Text
    }
}

/// Line terminator used in text reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineEnding {
    CrLf,
    Lf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::CrLf => "\r\n",
            LineEnding::Lf => "\n",
        }
    }
}

impl Default for LineEnding {
    fn default() -> Self {
        LineEnding::CrLf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_recoverability() {
        let busy: ApiError = HardwareError::Io {
            message: "radio busy".to_string(),
        }
        .into();
        assert!(busy.is_recoverable());
        assert!(!ApiError::from(HardwareError::StreamClosed).is_recoverable());
        assert!(!ApiError::NotInitialized.is_recoverable());
    }
}
