//! The `ReportWriter` trait implemented by all report backends.

use crate::{OutputResult, ScenarioRow, SuiteSummary};

/// A destination for scenario reports.
///
/// Errors are stored by [`ReportSink`][crate::ReportSink] rather than
/// aborting a suite.
pub trait ReportWriter {
    /// Write one scenario.
    fn write_scenario(&mut self, row: &ScenarioRow) -> OutputResult<()>;

    /// Write the suite summary and flush.  Idempotent.
    fn finish(&mut self, summary: &SuiteSummary) -> OutputResult<()>;
}

/// Fan out to two writers.  Both are always called; the first error wins.
impl<A: ReportWriter, B: ReportWriter> ReportWriter for (A, B) {
    fn write_scenario(&mut self, row: &ScenarioRow) -> OutputResult<()> {
        let a = self.0.write_scenario(row);
        let b = self.1.write_scenario(row);
        a.and(b)
    }

    fn finish(&mut self, summary: &SuiteSummary) -> OutputResult<()> {
        let a = self.0.finish(summary);
        let b = self.1.finish(summary);
        a.and(b)
    }
}
