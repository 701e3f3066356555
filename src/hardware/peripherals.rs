//! Lifecycle collaborators driven by the application setup and loop

use crate::hardware::HwResult;
use serde::{Deserialize, Serialize};

/// Role of the device on the sensor network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorMode {
    Transmitter,
    Gateway,
}

/// Persistent variable store in flash
pub trait FlashStore {
    /// Erase all stored variables so defaults apply on next read
    fn delete_variables(&mut self) -> HwResult<()>;
}

/// Sensor transport subsystem
pub trait SensorSubsystem {
    fn init(&mut self, mode: SensorMode) -> HwResult<()>;

    /// Handle pending sensor events; call this from the main loop
    fn process(&mut self) -> HwResult<()>;
}

pub trait Accelerometer {
    fn init(&mut self) -> HwResult<()>;
}
