//! Core data types for GPS fix results

use crate::core::constants::{DOWNLOAD_QUALITY_THRESHOLD, SV_FLAG_EPHEMERIS};
use crate::hardware::HardwareError;
use serde::{Deserialize, Serialize};

/// How much of a fix the receiver obtained.
///
/// Levels are totally ordered and each one guarantees everything the lower
/// levels guarantee, so `level >= FixLevel::Date` implies the time is valid too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FixLevel {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "time")]
    Time,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "2d")]
    Fix2D,
    #[serde(rename = "3d")]
    Fix3D,
}

impl FixLevel {
    /// All levels from coarsest to finest
    pub const ALL: [FixLevel; 5] = [
        FixLevel::None,
        FixLevel::Time,
        FixLevel::Date,
        FixLevel::Fix2D,
        FixLevel::Fix3D,
    ];

    pub fn has_time(self) -> bool {
        self >= FixLevel::Time
    }

    pub fn has_date(self) -> bool {
        self >= FixLevel::Date
    }

    pub fn has_position(self) -> bool {
        self >= FixLevel::Fix2D
    }

    pub fn has_altitude(self) -> bool {
        self >= FixLevel::Fix3D
    }
}

impl Default for FixLevel {
    fn default() -> Self {
        FixLevel::None
    }
}

impl TryFrom<u8> for FixLevel {
    type Error = HardwareError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        FixLevel::ALL
            .get(value as usize)
            .copied()
            .ok_or(HardwareError::InvalidFixLevel { value })
    }
}

/// UTC time and date as decoded by the receiver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTime {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub day: u8,
    pub month: u8,
    pub year: u16,
}

impl DateTime {
    pub fn new(year: u16, month: u8, day: u8, hours: u8, minutes: u8, seconds: u8) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            day,
            month,
            year,
        }
    }
}

/// Position in 1e-7 degree fixed point, altitude in metres
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixPosition {
    pub latitude: i32,
    pub longitude: i32,
    pub altitude: i32,
}

impl FixPosition {
    pub fn new(latitude: i32, longitude: i32, altitude: i32) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }
}

/// One receiver tracking channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatChannel {
    /// Satellite vehicle id
    #[serde(default)]
    pub svid: u8,
    /// Signal quality indicator (0..=7)
    pub quality: u8,
    pub ephemeris: bool,
}

impl SatChannel {
    pub fn new(svid: u8, quality: u8, ephemeris: bool) -> Self {
        Self {
            svid,
            quality,
            ephemeris,
        }
    }

    /// Build a channel from raw NAV-SVINFO flags
    pub fn from_svinfo(svid: u8, flags: u8, quality: u8) -> Self {
        Self::new(svid, quality, flags & SV_FLAG_EPHEMERIS != 0)
    }

    /// Orbit data already received for this satellite
    pub fn has_ephemeris(&self) -> bool {
        self.ephemeris
    }

    /// Signal locked well enough that ephemeris is being received
    pub fn is_downloading_ephemeris(&self) -> bool {
        !self.ephemeris && self.quality > DOWNLOAD_QUALITY_THRESHOLD
    }
}

/// Satellite tracking snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Satellites {
    /// Satellites contributing to the fix
    pub usable: u8,
    #[serde(default)]
    pub channels: Vec<SatChannel>,
}

impl Satellites {
    pub fn new(usable: u8, channels: Vec<SatChannel>) -> Self {
        Self { usable, channels }
    }
}

/// Result handed to the fix callback for a single acquisition event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixResult {
    pub level: FixLevel,
    #[serde(default)]
    pub datetime: DateTime,
    #[serde(default)]
    pub position: FixPosition,
    #[serde(default)]
    pub speed_kmh: u32,
    #[serde(default)]
    pub duration_s: u32,
    #[serde(default)]
    pub satellites: Satellites,
    #[serde(default)]
    pub timed_out: bool,
}

impl FixResult {
    pub fn new(level: FixLevel) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn with_datetime(mut self, datetime: DateTime) -> Self {
        self.datetime = datetime;
        self
    }

    pub fn with_position(mut self, position: FixPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_speed(mut self, speed_kmh: u32) -> Self {
        self.speed_kmh = speed_kmh;
        self
    }

    pub fn with_duration(mut self, duration_s: u32) -> Self {
        self.duration_s = duration_s;
        self
    }

    pub fn with_satellites(mut self, satellites: Satellites) -> Self {
        self.satellites = satellites;
        self
    }

    pub fn with_timeout(mut self, timed_out: bool) -> Self {
        self.timed_out = timed_out;
        self
    }
}
