//! Error types for the latency monitor

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the session controller and its workers.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot open output file {path}: {source}")]
    SinkOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input {input} failed to open: {source}")]
    SourceOpen {
        input: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
