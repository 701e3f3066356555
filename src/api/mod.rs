//! Fix reporting API
//!
//! Formatting of fix events into terminal or JSON reports, and the callback
//! that hands them from the fix engine to the output stream.

pub mod callback;
pub mod types;
pub mod formatting;

pub use types::{ApiError, ApiResult, LineEnding, ReportFormat};
pub use callback::ReportDispatcher;
pub use formatting::{
    split_fixed_point, Coordinate, EphemerisSummary, FixReport, FixReporter, Hemisphere,
    JsonFormatter,
};
