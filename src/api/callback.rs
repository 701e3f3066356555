//! Fix callback wiring between the fix engine and the output stream

use crate::api::formatting::{FixReporter, JsonFormatter};
use crate::api::types::ReportFormat;
use crate::core::FixResult;
use crate::hardware::{FixCallback, UartStream};
use crate::utils::config::ReportConfig;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Renders fix events and writes each report to the stream in one write
pub struct ReportDispatcher {
    format: ReportFormat,
    reporter: FixReporter,
    json: JsonFormatter,
    stream: Rc<RefCell<UartStream>>,
    reports_emitted: Rc<Cell<u32>>,
}

impl ReportDispatcher {
    pub fn new(config: &ReportConfig, stream: Rc<RefCell<UartStream>>) -> Self {
        Self {
            format: config.format,
            reporter: FixReporter::with_line_ending(config.line_ending),
            json: JsonFormatter::new(),
            stream,
            reports_emitted: Rc::new(Cell::new(0)),
        }
    }

    /// Render the report text for one fix event
    pub fn render(&self, fix: &FixResult) -> Option<String> {
        match self.format {
            ReportFormat::Text => Some(self.reporter.report(fix)),
            ReportFormat::Json => match self.json.format_json(fix) {
                Ok(mut document) => {
                    document.push_str(self.reporter.line_ending.as_str());
                    Some(document)
                }
                Err(e) => {
                    log::error!("failed to encode fix report: {}", e);
                    None
                }
            },
        }
    }

    /// Handle one fix event from the engine
    pub fn on_fix(&self, fix: &FixResult, timed_out: bool) {
        log::debug!(
            "fix event: level={:?} elapsed={}s timed_out={}",
            fix.level,
            fix.duration_s,
            timed_out
        );

        let report = match self.render(fix) {
            Some(report) => report,
            None => return,
        };

        match self.stream.borrow_mut().write_str(&report) {
            Ok(()) => self.reports_emitted.set(self.reports_emitted.get() + 1),
            Err(e) => log::warn!("dropped fix report: {}", e),
        }
    }

    /// Shared count of reports written to the stream
    pub fn counter(&self) -> Rc<Cell<u32>> {
        Rc::clone(&self.reports_emitted)
    }

    /// Box the dispatcher as the engine callback
    pub fn into_callback(self) -> FixCallback {
        Box::new(move |fix: &FixResult, timed_out: bool| self.on_fix(fix, timed_out))
    }
}
