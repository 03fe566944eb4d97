//! Property tests for the pairing engine invariants

use std::io;
use std::sync::Arc;

use mpegts_latency::config::SessionConfig;
use mpegts_latency::constants::PCR_WRAP;
use mpegts_latency::correlator::Correlator;
use mpegts_latency::monitor::{PacketMetadata, SourceSpec, TsPacket};
use mpegts_latency::report::CsvReport;
use parking_lot::Mutex;
use proptest::prelude::*;

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn correlator(threshold_ms: f64) -> (Correlator, SharedBuf) {
    let inputs = vec![
        SourceSpec::parse("udp://239.1.1.2:1234").unwrap(),
        SourceSpec::parse("udp://239.1.1.3:1234").unwrap(),
    ];
    let mut config = SessionConfig::new(inputs);
    config.latency_threshold_ms = threshold_ms;
    let buf = SharedBuf::default();
    let report = CsvReport::from_writer(Box::new(buf.clone()));
    (Correlator::new(&config, report), buf)
}

fn push(corr: &Correlator, input: usize, pcr: u64, arrival_ts: i64) {
    let packets = [TsPacket::with_pcr(pcr)];
    let mut meta = PacketMetadata::default();
    meta.set_input_timestamp(arrival_ts);
    corr.ingest(&packets, &[meta], input).unwrap();
}

fn rows(buf: &SharedBuf) -> Vec<String> {
    String::from_utf8(buf.0.lock().clone())
        .unwrap()
        .lines()
        .map(str::to_owned)
        .collect()
}

proptest! {
    /// Every emitted row satisfies the pairing arithmetic, and rows
    /// never outnumber the samples accepted on the thinner leg.
    #[test]
    fn rows_satisfy_pairing_arithmetic(
        ops in prop::collection::vec((any::<bool>(), 0u64..PCR_WRAP), 1..200),
        threshold_raw in 0u32..100,
    ) {
        let threshold_ms = threshold_raw as f64;
        let (corr, buf) = correlator(threshold_ms);

        let mut pushed = [0usize; 2];
        for &(second_leg, pcr) in &ops {
            let input = second_leg as usize;
            pushed[input] += 1;
            // Identical arrival stamps keep the skew gate out of the way.
            push(&corr, input, pcr, 0);
        }

        let emitted = rows(&buf);
        prop_assert!(emitted.len() <= pushed[0].min(pushed[1]));

        for row in &emitted {
            let fields: Vec<&str> = row.split(',').collect();
            prop_assert_eq!(fields.len(), 5);
            let pcr1: u64 = fields[0].parse().unwrap();
            let pcr2: u64 = fields[1].parse().unwrap();
            let delta: u64 = fields[2].parse().unwrap();
            let latency: f64 = fields[3].parse().unwrap();
            prop_assert_eq!(delta, pcr1.abs_diff(pcr2));
            prop_assert_eq!(latency, delta as f64 / 27_000.0);
            prop_assert_eq!(fields[4] == "true", latency <= threshold_ms);
        }
    }

    /// No interleaving can grow a queue past the soft cap plus the
    /// sample that triggered the check.
    #[test]
    fn queues_stay_bounded(
        ops in prop::collection::vec((any::<bool>(), 0u64..PCR_WRAP), 1..300),
    ) {
        let (corr, _buf) = correlator(0.0);
        for &(second_leg, pcr) in &ops {
            push(&corr, second_leg as usize, pcr, 0);
            let depths = corr.queue_depths();
            prop_assert!(depths[0] <= 11 && depths[1] <= 11, "depths: {depths:?}");
        }
    }

    /// A skew-gate reset leaves both queues empty, never one.
    #[test]
    fn skew_reset_clears_both_queues(
        backlog in 1usize..8,
        skew_ticks in 270_001i64..1_000_000_000,
    ) {
        let (corr, buf) = correlator(0.0);
        for i in 0..backlog {
            push(&corr, 0, (i as u64 + 1) * 300, 0);
        }
        push(&corr, 1, 300, skew_ticks);
        prop_assert_eq!(corr.queue_depths(), [0, 0]);
        prop_assert!(rows(&buf).is_empty());
    }
}
