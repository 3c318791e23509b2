//! `ReportSink<W>` — feeds scenario records to a `ReportWriter`.

use sw_monitor::ScenarioRecord;

use crate::writer::ReportWriter;
use crate::{OutputError, OutputResult, ScenarioRow, SuiteSummary};

/// Converts [`ScenarioRecord`]s to rows, tallies the suite, and writes both
/// to any [`ReportWriter`].
///
/// Write errors never interrupt the suite.  They are stored, and only the
/// first is kept; check with [`take_error`][Self::take_error] after
/// [`finish`][Self::finish].
pub struct ReportSink<W: ReportWriter> {
    writer:     W,
    summary:    SuiteSummary,
    last_error: Option<OutputError>,
}

impl<W: ReportWriter> ReportSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, summary: SuiteSummary::default(), last_error: None }
    }

    /// Write one scenario and count it.
    pub fn record(&mut self, record: &ScenarioRecord) -> ScenarioRow {
        let row = ScenarioRow::from(record);
        self.summary.record(&row);
        let result = self.writer.write_scenario(&row);
        self.store_err(result);
        row
    }

    /// Write the summary and flush the writer.
    pub fn finish(&mut self) {
        let result = self.writer.finish(&self.summary);
        self.store_err(result);
    }

    pub fn summary(&self) -> SuiteSummary {
        self.summary
    }

    /// Take the stored write error (if any).
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}
