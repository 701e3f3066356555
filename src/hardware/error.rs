//! Hardware and SDK error types

use std::fmt;

/// Errors reported by the hardware collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum HardwareError {
    /// A subsystem was used before its init call
    NotInitialized { subsystem: String },
    /// UART options rejected when opening the stream
    InvalidUartOptions { parameter: String, value: String },
    /// Write attempted on a stream that is not open
    StreamClosed,
    /// Underlying I/O failure
    Io { message: String },
    /// A fix session is already armed
    SessionActive,
    /// Fix mode cannot be used to acquire a fix
    InvalidMode { mode: String },
    /// Raw fix level outside the known range
    InvalidFixLevel { value: u8 },
    /// Fix replay script could not be loaded
    ScriptError { message: String },
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardwareError::NotInitialized { subsystem } => {
                write!(f, "{} used before initialization", subsystem)
            }
            HardwareError::InvalidUartOptions { parameter, value } => {
                write!(f, "Invalid UART option: {} = {}", parameter, value)
            }
            HardwareError::StreamClosed => write!(f, "Output stream is not open"),
            HardwareError::Io { message } => write!(f, "I/O error: {}", message),
            HardwareError::SessionActive => write!(f, "A fix session is already active"),
            HardwareError::InvalidMode { mode } => {
                write!(f, "Fix mode {} cannot acquire a fix", mode)
            }
            HardwareError::InvalidFixLevel { value } => {
                write!(f, "Invalid fix level {}", value)
            }
            HardwareError::ScriptError { message } => {
                write!(f, "Fix script error: {}", message)
            }
        }
    }
}

impl std::error::Error for HardwareError {}

impl From<std::io::Error> for HardwareError {
    fn from(error: std::io::Error) -> Self {
        HardwareError::Io {
            message: error.to_string(),
        }
    }
}

/// Result type for hardware operations
pub type HwResult<T> = Result<T, HardwareError>;

impl HardwareError {
    /// Whether the main loop can keep running after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, HardwareError::Io { .. } | HardwareError::SessionActive)
    }
}
