//! CSV report sink for correlation rows

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::MonitorError;

/// CSV column header, written once at session start.
pub const CSV_HEADER: &str = "PCR1,PCR2,PCR Delta,Latency (ms),Sync";

/// Byte stream the correlator appends rows to (file or stderr).
///
/// The sink lives inside the correlator state, so the correlator mutex is
/// what serializes all writes.
pub struct CsvReport {
    out: Box<dyn Write + Send>,
}

impl CsvReport {
    /// Open the report sink: the given file, or standard error when no
    /// path is configured.
    pub fn open(path: Option<&Path>) -> Result<Self, MonitorError> {
        let out: Box<dyn Write + Send> = match path {
            Some(path) => {
                let file = File::create(path).map_err(|source| MonitorError::SinkOpen {
                    path: path.to_path_buf(),
                    source,
                })?;
                Box::new(file)
            }
            None => Box::new(io::stderr()),
        };
        Ok(CsvReport { out })
    }

    /// Report writing into an arbitrary byte stream.
    pub fn from_writer(out: Box<dyn Write + Send>) -> Self {
        CsvReport { out }
    }

    pub fn write_header(&mut self) -> io::Result<()> {
        writeln!(self.out, "{CSV_HEADER}")?;
        self.out.flush()
    }

    /// Append one matched row. Latency uses the default `f64` rendering;
    /// the sync column is the literal `true` or `false`.
    pub fn write_row(
        &mut self,
        pcr1: u64,
        pcr2: u64,
        delta_pcr: u64,
        latency_ms: f64,
        in_sync: bool,
    ) -> io::Result<()> {
        writeln!(self.out, "{pcr1},{pcr2},{delta_pcr},{latency_ms},{in_sync}")?;
        self.out.flush()
    }
}
