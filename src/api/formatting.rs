//! Fix report formatting
//!
//! A [`FixReport`] is the level-gated view of a [`FixResult`]: every field
//! the fix level does not unlock is `None`. The text and JSON formatters
//! render from that view, so a field missing from one is missing from both.

use crate::api::types::LineEnding;
use crate::core::{FixLevel, FixResult, SatChannel, FIXED_POINT_SCALE};
use serde::Serialize;
use std::fmt::{self, Write};

/// Split a 1e-7 degree magnitude into whole degrees and the 7-digit fraction
pub fn split_fixed_point(magnitude: u32) -> (u32, u32) {
    (magnitude / FIXED_POINT_SCALE, magnitude % FIXED_POINT_SCALE)
}

/// Cardinal direction of a coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Hemisphere {
    #[serde(rename = "N")]
    North,
    #[serde(rename = "S")]
    South,
    #[serde(rename = "E")]
    East,
    #[serde(rename = "W")]
    West,
}

impl Hemisphere {
    pub fn as_char(self) -> char {
        match self {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
            Hemisphere::East => 'E',
            Hemisphere::West => 'W',
        }
    }
}

/// Unsigned coordinate with its direction letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Coordinate {
    pub hemisphere: Hemisphere,
    pub degrees: u32,
    /// Fraction of a degree in 1e-7 units
    pub fraction: u32,
}

impl Coordinate {
    pub fn latitude(raw: i32) -> Self {
        let hemisphere = if raw < 0 { Hemisphere::South } else { Hemisphere::North };
        Self::from_magnitude(hemisphere, raw.unsigned_abs())
    }

    pub fn longitude(raw: i32) -> Self {
        let hemisphere = if raw < 0 { Hemisphere::West } else { Hemisphere::East };
        Self::from_magnitude(hemisphere, raw.unsigned_abs())
    }

    fn from_magnitude(hemisphere: Hemisphere, magnitude: u32) -> Self {
        let (degrees, fraction) = split_fixed_point(magnitude);
        Self {
            hemisphere,
            degrees,
            fraction,
        }
    }
}

/// Width, if given, pads the whole degrees
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:width$}.{:07}°{}",
            self.degrees,
            self.fraction,
            self.hemisphere.as_char(),
            width = f.width().unwrap_or(0)
        )
    }
}

/// Ephemeris state counted across the tracking channels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EphemerisSummary {
    pub available: u32,
    pub downloading: u32,
}

impl EphemerisSummary {
    /// Count both states in a single pass
    pub fn from_channels(channels: &[SatChannel]) -> Self {
        channels.iter().fold(Self::default(), |mut summary, channel| {
            if channel.has_ephemeris() {
                summary.available += 1;
            } else if channel.is_downloading_ephemeris() {
                summary.downloading += 1;
            }
            summary
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportTime {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportDate {
    pub day: u8,
    pub month: u8,
    pub year: u16,
}

/// Level-gated, structured view of one fix event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixReport {
    pub level: FixLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<ReportTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<ReportDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Coordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Coordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_kmh: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude_m: Option<i32>,
    pub elapsed_s: u32,
    pub usable_satellites: u8,
    pub ephemeris: EphemerisSummary,
    pub timed_out: bool,
}

impl FixReport {
    pub fn from_fix(fix: &FixResult) -> Self {
        let level = fix.level;
        let datetime = &fix.datetime;
        let position = &fix.position;

        Self {
            level,
            time: level.has_time().then(|| ReportTime {
                hours: datetime.hours,
                minutes: datetime.minutes,
                seconds: datetime.seconds,
            }),
            date: level.has_date().then(|| ReportDate {
                day: datetime.day,
                month: datetime.month,
                year: datetime.year,
            }),
            latitude: level.has_position().then(|| Coordinate::latitude(position.latitude)),
            longitude: level.has_position().then(|| Coordinate::longitude(position.longitude)),
            speed_kmh: level.has_position().then(|| fix.speed_kmh),
            altitude_m: level.has_altitude().then(|| position.altitude),
            elapsed_s: fix.duration_s,
            usable_satellites: fix.satellites.usable,
            ephemeris: EphemerisSummary::from_channels(&fix.satellites.channels),
            timed_out: fix.timed_out,
        }
    }
}

/// Human-readable fix reporter for a serial terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct FixReporter {
    pub line_ending: LineEnding,
}

impl FixReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_line_ending(line_ending: LineEnding) -> Self {
        Self { line_ending }
    }

    /// Render the report for one fix event
    pub fn report(&self, fix: &FixResult) -> String {
        TextReport {
            reporter: self,
            report: FixReport::from_fix(fix),
        }
        .to_string()
    }

    pub fn write_report<W: Write>(&self, fix: &FixResult, out: &mut W) -> fmt::Result {
        self.write_text(&FixReport::from_fix(fix), out)
    }

    /// Render an already extracted report
    pub fn write_text<W: Write>(&self, report: &FixReport, out: &mut W) -> fmt::Result {
        let eol = self.line_ending.as_str();

        if let Some(time) = &report.time {
            write!(
                out,
                "Time (HH:MM:SS): {:02}:{:02}:{:02}{}",
                time.hours, time.minutes, time.seconds, eol
            )?;
        }

        if let Some(date) = &report.date {
            write!(
                out,
                "Date (DD/MM/YYYY): {:02}/{:02}/{:04}{}",
                date.day, date.month, date.year, eol
            )?;
        }

        if let (Some(lat), Some(lon)) = (&report.latitude, &report.longitude) {
            write!(out, "Position: {:4} {:5}{}", lat, lon, eol)?;
        }

        if let Some(speed) = report.speed_kmh {
            write!(out, "Speed: {} km/h{}", speed, eol)?;
        }

        if let Some(altitude) = report.altitude_m {
            write!(out, "Altitude: {} m{}", altitude, eol)?;
        }

        write!(out, "Elapsed: {} s{}", report.elapsed_s, eol)?;
        write!(
            out,
            "Usable Sats = {}  -  Ephemeris av. = {}  - Ephemeris Downloading {}{}{}",
            report.usable_satellites,
            report.ephemeris.available,
            report.ephemeris.downloading,
            eol,
            eol
        )
    }
}

struct TextReport<'a> {
    reporter: &'a FixReporter,
    report: FixReport,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.reporter.write_text(&self.report, f)
    }
}

/// JSON formatter for structured output
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter {
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Format one fix event as a JSON document
    pub fn format_json(&self, fix: &FixResult) -> Result<String, serde_json::Error> {
        let report = FixReport::from_fix(fix);
        if self.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        }
    }
}
