//! Shared types for the correlation engine

/// One PCR observation taken from an input leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// 42-bit PCR value in 27 MHz units.
    pub pcr: u64,
    /// Arrival instant in 27 MHz units, directly differenceable with `pcr`.
    pub arrival_ts: i64,
}

/// Lifecycle of a monitoring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    New,
    Running,
    Stopping,
    Drained,
    Closed,
}
