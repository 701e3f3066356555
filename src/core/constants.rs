//! Fixed-point scales and receiver constants

/// Coordinates are reported in 1e-7 degree units
pub const FIXED_POINT_SCALE: u32 = 10_000_000;

/// NAV-SVINFO channel flag set once ephemeris is available for the satellite
pub const SV_FLAG_EPHEMERIS: u8 = 0x08;

/// Channels above this quality indicator are tracking a signal
pub const DOWNLOAD_QUALITY_THRESHOLD: u8 = 4;

/// Highest quality indicator a receiver channel reports
pub const MAX_QUALITY_INDICATOR: u8 = 7;
