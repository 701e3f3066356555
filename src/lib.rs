//! Continuous GPS fix reporting
//!
//! Drives a geolocation fix engine forever and prints every fix event as a
//! terminal report: time, date, position, speed and altitude as far as the
//! fix level allows, followed by satellite and ephemeris status.

pub mod core;
pub mod hardware;
pub mod api;
pub mod utils;
pub mod app;

// Re-export commonly used types
pub use self::core::{DateTime, FixLevel, FixPosition, FixResult, SatChannel, Satellites, FIXED_POINT_SCALE};
pub use hardware::{
    Accelerometer, FixCallback, FixEngine, FixMode, FixTimeout, FlashStore, HardwareError,
    HwResult, SensorMode, SensorSubsystem, UartOptions, UartStream,
};
pub use api::{
    split_fixed_point, ApiError, ApiResult, Coordinate, EphemerisSummary, FixReport, FixReporter,
    Hemisphere, JsonFormatter, LineEnding, ReportDispatcher, ReportFormat,
};
pub use utils::{AppConfig, ConfigError, ConfigurationManager, ReportConfig};
pub use app::{GeolocApp, Peripherals};
