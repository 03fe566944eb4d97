// src/lib.rs
pub mod monitor {
    //! Public facade for the PCR latency monitor.

    pub use crate::config::SessionConfig;
    pub use crate::error::MonitorError;
    pub use crate::packet::{PacketMetadata, TsPacket};
    pub use crate::session::Session;
    pub use crate::source::{PacketSource, SourceSpec};

    /// Blocking entry-point; returns when both inputs drain or the
    /// session is stopped.
    pub fn run(config: SessionConfig) -> anyhow::Result<()> {
        let session = crate::session::Session::start(config)?;
        session.wait()?;
        Ok(())
    }
}

pub mod config;
pub mod constants;
pub mod correlator;
pub mod error;
pub mod ingest;
pub mod packet;
pub mod report;
pub mod session;
pub mod source;
pub mod types;
