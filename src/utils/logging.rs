//! Host logger setup for the `log` facade
//!
//! Library code only uses the `log` macros. The binary installs
//! `env_logger` on stderr so log lines never mix with the reports on the
//! output stream.

use log::{LevelFilter, SetLoggerError};

/// Level used for the given debug switch
pub fn level_for(debug_logging: bool) -> LevelFilter {
    if debug_logging {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Logger builder writing to stderr at the configured level
pub fn builder(debug_logging: bool) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level_for(debug_logging))
        .target(env_logger::Target::Stderr);
    builder
}

/// Install the stderr logger as the global logger
pub fn init(debug_logging: bool) -> Result<(), SetLoggerError> {
    builder(debug_logging).try_init()
}
