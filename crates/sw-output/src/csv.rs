//! CSV output backend.
//!
//! Creates `scenario_results.csv` in the configured output directory, one
//! row per scenario.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::ReportWriter;
use crate::{OutputResult, ScenarioRow, SuiteSummary};

pub const CSV_FILE: &str = "scenario_results.csv";

/// Writes scenario rows to a CSV file.
pub struct CsvWriter {
    rows:     Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) the CSV file in `dir` and write the header row.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut rows = Writer::from_path(dir.join(CSV_FILE))?;
        rows.write_record([
            "id", "name", "latency_secs", "start_secs", "stop_secs", "converged", "unique", "crashed", "pairs",
            "mode",
        ])?;
        Ok(Self { rows, finished: false })
    }
}

impl ReportWriter for CsvWriter {
    fn write_scenario(&mut self, row: &ScenarioRow) -> OutputResult<()> {
        self.rows.write_record(&[
            row.id.clone(),
            row.name.clone(),
            format!("{:.4}", row.latency_secs),
            format!("{:.4}", row.start_secs),
            format!("{:.4}", row.stop_secs),
            (row.converged as u8).to_string(),
            (row.unique as u8).to_string(),
            row.crashed.clone(),
            row.pairs.clone(),
            row.mode.to_owned(),
        ])?;
        Ok(())
    }

    fn finish(&mut self, _summary: &SuiteSummary) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.rows.flush()?;
        Ok(())
    }
}
