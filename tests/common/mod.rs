//! Shared helpers for session-level tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::path::Path;
use std::time::Duration;

use mpegts_latency::monitor::{PacketMetadata, PacketSource, SessionConfig, SourceSpec, TsPacket};

/// In-memory source replaying a script of packet batches.
///
/// Each scripted packet optionally carries an input timestamp; a batch
/// whose packets carry none exercises the worker-side monotonic fill.
pub struct ScriptedSource {
    batches: VecDeque<Vec<(TsPacket, Option<i64>)>>,
    delay: Duration,
    fail_open: bool,
}

impl ScriptedSource {
    pub fn new(batches: Vec<Vec<(TsPacket, Option<i64>)>>) -> Self {
        ScriptedSource {
            batches: batches.into(),
            delay: Duration::ZERO,
            fail_open: false,
        }
    }

    /// One stamped PCR packet per batch.
    pub fn pcr_samples(samples: &[(u64, i64)]) -> Self {
        Self::new(
            samples
                .iter()
                .map(|&(pcr, ts)| vec![(TsPacket::with_pcr(pcr), Some(ts))])
                .collect(),
        )
    }

    /// Sleep this long inside every receive call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// A source whose `open` fails.
    pub fn failing_open() -> Self {
        let mut source = Self::new(Vec::new());
        source.fail_open = true;
        source
    }
}

impl PacketSource for ScriptedSource {
    fn open(&mut self) -> io::Result<()> {
        if self.fail_open {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "scripted open failure",
            ));
        }
        Ok(())
    }

    fn receive(
        &mut self,
        packets: &mut [TsPacket],
        metadata: &mut [PacketMetadata],
    ) -> io::Result<usize> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let Some(batch) = self.batches.pop_front() else {
            return Ok(0);
        };
        let count = batch.len().min(packets.len());
        for (i, (packet, ts)) in batch.into_iter().take(count).enumerate() {
            packets[i] = packet;
            if let Some(ts) = ts {
                metadata[i].set_input_timestamp(ts);
            }
        }
        Ok(count)
    }

    fn close(&mut self) {}
}

/// Session config pointing at two placeholder inputs, CSV to `path`.
pub fn config_to(path: &Path) -> SessionConfig {
    let inputs = vec![
        SourceSpec::parse("udp://239.1.1.2:1234").unwrap(),
        SourceSpec::parse("udp://239.1.1.3:1234").unwrap(),
    ];
    let mut config = SessionConfig::new(inputs);
    config.output_path = Some(path.to_path_buf());
    config
}

/// Read the CSV back as lines.
pub fn csv_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_owned)
        .collect()
}
