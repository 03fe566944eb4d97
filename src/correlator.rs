//! Serialized PCR pairing engine shared by the ingest workers
//!
//! One instance per session. All state, including the report sink, sits
//! behind a single mutex; `ingest` reacquires it per packet so neither
//! worker starves the other across a whole batch. PCR-bearing packets are
//! a tiny fraction of the stream (one per ~100 ms per leg), so contention
//! is negligible.

use std::collections::VecDeque;
use std::io;

use parking_lot::Mutex;
use tracing::debug;

use crate::config::SessionConfig;
use crate::constants::{INPUT_COUNT, PCR_TICKS_PER_MS};
use crate::packet::{PacketMetadata, TsPacket};
use crate::report::CsvReport;
use crate::types::Sample;

/// Pairing engine fed by both ingest workers.
pub struct Correlator {
    inner: Mutex<PairingState>,
}

struct PairingState {
    queues: [VecDeque<Sample>; INPUT_COUNT],
    report: CsvReport,
    latency_threshold_ms: f64,
    pair_skew_ms: f64,
    queue_soft_cap: usize,
    rows_emitted: u64,
}

impl Correlator {
    pub fn new(config: &SessionConfig, report: CsvReport) -> Self {
        Correlator {
            inner: Mutex::new(PairingState {
                queues: [VecDeque::new(), VecDeque::new()],
                report,
                latency_threshold_ms: config.latency_threshold_ms,
                pair_skew_ms: config.pair_skew_ms,
                queue_soft_cap: config.queue_soft_cap,
                rows_emitted: 0,
            }),
        }
    }

    /// Feed one received batch from input `input_index`.
    ///
    /// Packets without a PCR are discarded; each PCR-bearing packet
    /// becomes a sample stamped with its input timestamp and triggers one
    /// pairing pass.
    pub fn ingest(
        &self,
        packets: &[TsPacket],
        metadata: &[PacketMetadata],
        input_index: usize,
    ) -> io::Result<()> {
        debug_assert!(input_index < INPUT_COUNT);
        debug_assert_eq!(packets.len(), metadata.len());

        for (packet, meta) in packets.iter().zip(metadata) {
            let mut state = self.inner.lock();
            if let Some(pcr) = packet.pcr() {
                state.queues[input_index].push_back(Sample {
                    pcr,
                    arrival_ts: meta.input_timestamp,
                });
                state.pair()?;
            }
        }
        Ok(())
    }

    /// Number of CSV rows emitted so far.
    pub fn rows_emitted(&self) -> u64 {
        self.inner.lock().rows_emitted
    }

    /// Current queue lengths, front sample first.
    pub fn queue_depths(&self) -> [usize; INPUT_COUNT] {
        let state = self.inner.lock();
        [state.queues[0].len(), state.queues[1].len()]
    }
}

impl PairingState {
    /// One pairing pass, invoked after every successful push.
    ///
    /// Pops one sample from each queue and emits a row when the front
    /// samples arrived within the skew gate; resets both queues when they
    /// diverged in wall time or when a stalled peer lets one queue grow
    /// past the soft cap.
    fn pair(&mut self) -> io::Result<()> {
        if !self.queues[0].is_empty() && !self.queues[1].is_empty() {
            let s1 = self.queues[0][0];
            let s2 = self.queues[1][0];

            let skew_ms = (s1.arrival_ts - s2.arrival_ts).unsigned_abs() as f64 / PCR_TICKS_PER_MS;
            if skew_ms > self.pair_skew_ms {
                // The streams diverged in wall time; differencing these
                // PCRs would compare unrelated instants.
                self.reset_all("arrival skew");
                return Ok(());
            }

            let delta_pcr = s1.pcr.abs_diff(s2.pcr);
            let latency_ms = delta_pcr as f64 / PCR_TICKS_PER_MS;
            let in_sync = latency_ms <= self.latency_threshold_ms;

            self.report
                .write_row(s1.pcr, s2.pcr, delta_pcr, latency_ms, in_sync)?;
            self.rows_emitted += 1;

            self.queues[0].pop_front();
            self.queues[1].pop_front();
        } else if self.queues[0].len() > self.queue_soft_cap
            || self.queues[1].len() > self.queue_soft_cap
        {
            // One leg stalled or was lost; pairing resumes from a fresh
            // mutual point once it recovers.
            self.reset_all("peer stalled");
        }
        Ok(())
    }

    fn reset_all(&mut self, reason: &str) {
        debug!(
            reason,
            len0 = self.queues[0].len(),
            len1 = self.queues[1].len(),
            "clearing both sample queues"
        );
        for queue in &mut self.queues {
            queue.clear();
        }
    }
}
