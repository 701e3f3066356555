//! Geolocation fix engine interface

use crate::core::FixResult;
use crate::hardware::HwResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Callback invoked with each fix event and the timeout flag
pub type FixCallback = Box<dyn FnMut(&FixResult, bool)>;

/// Receiver operating mode for a fix session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixMode {
    /// Receiver powered down
    Off,
    /// Continuous navigation
    Navigation,
    /// Cyclic power save tracking
    PowerSave,
    /// Hardware backup, keeps ephemeris across sessions
    HardwareBackup,
}

impl fmt::Display for FixMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FixMode::Off => "off",
            FixMode::Navigation => "navigation",
            FixMode::PowerSave => "power_save",
            FixMode::HardwareBackup => "hardware_backup",
        };
        write!(f, "{}", name)
    }
}

/// How long a fix session may run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixTimeout {
    /// Keep trying forever, reporting every event
    Infinite,
    /// Give up after this many seconds of acquisition
    Seconds(u32),
}

impl FixTimeout {
    /// Whether an event at `duration_s` ends the session by timeout
    pub fn expired(&self, duration_s: u32) -> bool {
        match self {
            FixTimeout::Infinite => false,
            FixTimeout::Seconds(limit) => duration_s >= *limit,
        }
    }
}

/// Hardware abstraction for the GPS fix engine
pub trait FixEngine {
    /// Power up the receiver
    fn init(&mut self) -> HwResult<()>;

    /// Arm a fix session; `callback` runs from `process` for each event
    fn try_to_fix(&mut self, mode: FixMode, timeout: FixTimeout, callback: FixCallback) -> HwResult<()>;

    /// Advance the session; call this from the main loop
    fn process(&mut self) -> HwResult<()>;

    /// Abort the session and drop the callback
    fn stop(&mut self);

    /// Whether a session is armed
    fn is_active(&self) -> bool;
}
