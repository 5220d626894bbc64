// Copyright (c) 2025 - Cowboy AI, Inc.
//! Report export
//!
//! The pipeline hands finished reports to an [`ExportSink`]. The CSV sink
//! writes one `<category>.csv` per report into a directory; packaging the
//! directory is left to the caller.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::ExportError;
use crate::reports::Report;

/// Destination for finished reports
pub trait ExportSink {
    fn write_report(&mut self, report: &Report) -> Result<(), ExportError>;

    /// Write every report in order, stopping at the first failure
    fn write_all(&mut self, reports: &[Report]) -> Result<(), ExportError> {
        for report in reports {
            self.write_report(report)?;
        }
        Ok(())
    }
}

/// Writes `<category>.csv` files into one directory
#[derive(Debug)]
pub struct CsvDirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl CsvDirectorySink {
    /// Create the directory if needed
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, ExportError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            written: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far, in write order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ExportSink for CsvDirectorySink {
    fn write_report(&mut self, report: &Report) -> Result<(), ExportError> {
        let path = self.dir.join(format!("{}.csv", report.category.as_str()));
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(&report.headers)?;
        for row in &report.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        debug!(path = %path.display(), rows = report.len(), "report written");
        self.written.push(path);
        Ok(())
    }
}
