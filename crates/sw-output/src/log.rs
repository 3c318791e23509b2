//! Human-readable latency log.
//!
//! ```text
//!
//! ---------Test 1a - Move all targets within range ---------
//! Latency:		3.2100 seconds
//!     Start Time:		0.0000 seconds
//!     Stop Time:		3.2100 seconds
//! Uav-Target Pairs:	{1: [11], 2: [12]}
//! Result:			Test Case PASSED. All uavs are tracking different targets.
//! ```
//!
//! followed, on `finish`, by the suite's pass/fail counts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::writer::ReportWriter;
use crate::{OutputResult, ScenarioRow, SuiteSummary};

/// File name used by [`LogWriter::create`].
pub const LOG_FILE: &str = "latency.log";

const PASSED: &str = "Test Case PASSED. All uavs are tracking different targets.";
const FAILED: &str = "Test Case FAILED. Some uavs are tracking the same targets.";

pub struct LogWriter<W: Write> {
    out:      W,
    finished: bool,
}

impl LogWriter<BufWriter<File>> {
    /// Create (or truncate) `latency.log` in `dir`.
    pub fn create(dir: &Path) -> OutputResult<Self> {
        let file = File::create(dir.join(LOG_FILE))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> LogWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, finished: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportWriter for LogWriter<W> {
    fn write_scenario(&mut self, row: &ScenarioRow) -> OutputResult<()> {
        let out = &mut self.out;
        write!(out, "\n---------Test {} - {} ---------\n", row.id, row.name)?;
        writeln!(out, "Latency:\t\t{:.4} seconds", row.latency_secs)?;
        writeln!(out, "    Start Time:\t\t{:.4} seconds", row.start_secs)?;
        writeln!(out, "    Stop Time:\t\t{:.4} seconds", row.stop_secs)?;
        writeln!(out, "Uav-Target Pairs:\t{}", row.pairs)?;
        writeln!(out, "Result:\t\t\t{}\n", if row.unique { PASSED } else { FAILED })?;
        Ok(())
    }

    fn finish(&mut self, summary: &SuiteSummary) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        write!(
            self.out,
            "\n\nNumber of times uav-target pairings had all unique targets:\t{}\n\
             Number of times uav-target pairings had duplicate targets:\t{}\n\n\n",
            summary.unique, summary.duplicate,
        )?;
        self.out.flush()?;
        Ok(())
    }
}
