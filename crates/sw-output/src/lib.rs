//! `sw-output` — scenario report writers for the rust_swarm monitor.
//!
//! | Writer        | File                    | Contents                                   |
//! |---------------|-------------------------|--------------------------------------------|
//! | [`LogWriter`] | `latency.log`           | Per-scenario latency, pairs, verdict; suite counts |
//! | [`CsvWriter`] | `scenario_results.csv`  | One machine-readable row per scenario      |
//!
//! Both implement [`ReportWriter`] (as does a pair of writers) and are driven
//! by [`ReportSink`], which converts `sw_monitor::ScenarioRecord`s to
//! [`ScenarioRow`]s and keeps the suite tally.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sw_output::{CsvWriter, LogWriter, ReportSink};
//!
//! let writers = (LogWriter::create(dir)?, CsvWriter::new(dir)?);
//! let mut sink = ReportSink::new(writers);
//! for record in &records {
//!     sink.record(record);
//! }
//! sink.finish();
//! sink.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod log;
pub mod row;
pub mod sink;
pub mod writer;


pub use crate::csv::{CSV_FILE, CsvWriter};
pub use error::{OutputError, OutputResult};
pub use log::{LOG_FILE, LogWriter};
pub use row::{ScenarioRow, SuiteSummary};
pub use sink::ReportSink;
pub use writer::ReportWriter;
