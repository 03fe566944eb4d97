//! Immutable session configuration

use std::path::PathBuf;

use crate::constants::{
    DEFAULT_PACKET_BATCH_MAX, DEFAULT_PAIR_SKEW_MS, DEFAULT_QUEUE_SOFT_CAP, INPUT_COUNT,
};
use crate::error::MonitorError;
use crate::source::SourceSpec;

/// Configuration options for one monitoring session.
///
/// Built once before the session starts and read-only thereafter; the
/// session controller validates it before spawning any thread.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The two input descriptors.
    pub inputs: Vec<SourceSpec>,
    /// Latency threshold in milliseconds for the `Sync` column.
    pub latency_threshold_ms: f64,
    /// Maximum arrival-time skew between paired samples, in milliseconds.
    pub pair_skew_ms: f64,
    /// Per-input queue length that triggers a reset when the peer stalls.
    pub queue_soft_cap: usize,
    /// CSV output path; `None` writes to standard error.
    pub output_path: Option<PathBuf>,
    /// Maximum packets per source receive call.
    pub packet_batch_max: usize,
}

impl SessionConfig {
    /// Configuration with historical policy defaults for the given inputs.
    pub fn new(inputs: Vec<SourceSpec>) -> Self {
        SessionConfig {
            inputs,
            latency_threshold_ms: 0.0,
            pair_skew_ms: DEFAULT_PAIR_SKEW_MS,
            queue_soft_cap: DEFAULT_QUEUE_SOFT_CAP,
            output_path: None,
            packet_batch_max: DEFAULT_PACKET_BATCH_MAX,
        }
    }

    /// Check session parameters; called by the controller before start.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.inputs.len() != INPUT_COUNT {
            return Err(MonitorError::Config(format!(
                "number of inputs must be {}, got {}",
                INPUT_COUNT,
                self.inputs.len()
            )));
        }
        if !self.latency_threshold_ms.is_finite() || self.latency_threshold_ms < 0.0 {
            return Err(MonitorError::Config(format!(
                "latency threshold must be a non-negative number of milliseconds, got {}",
                self.latency_threshold_ms
            )));
        }
        if !self.pair_skew_ms.is_finite() || self.pair_skew_ms < 0.0 {
            return Err(MonitorError::Config(format!(
                "pair skew gate must be a non-negative number of milliseconds, got {}",
                self.pair_skew_ms
            )));
        }
        if self.packet_batch_max == 0 {
            return Err(MonitorError::Config(
                "packet batch size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
