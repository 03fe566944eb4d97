//! Ingest worker: one thread per input leg
//!
//! Drives its packet source, fills arrival timestamps the source did not
//! provide, and hands every batch to the shared correlator. Termination
//! is cooperative: the flags are checked between receive calls, an
//! in-flight receive cannot be interrupted.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, error};

use crate::correlator::Correlator;
use crate::error::MonitorError;
use crate::packet::{PacketMetadata, TsPacket};
use crate::source::PacketSource;

/// Handle to one running ingest thread.
pub struct IngestWorker {
    handle: JoinHandle<Result<(), MonitorError>>,
    terminate: Arc<AtomicBool>,
    input_index: usize,
}

impl IngestWorker {
    /// Spawn the worker thread for input `input_index`.
    ///
    /// `abort` is shared across the session: a worker that fails raises it
    /// so its peer drains out at the next batch boundary.
    pub fn spawn(
        input_index: usize,
        source: Box<dyn PacketSource>,
        correlator: Arc<Correlator>,
        batch_max: usize,
        abort: Arc<AtomicBool>,
    ) -> io::Result<IngestWorker> {
        let terminate = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&terminate);
        let handle = thread::Builder::new()
            .name(format!("input-{input_index}"))
            .spawn(move || run_input(input_index, source, correlator, batch_max, flag, abort))?;
        Ok(IngestWorker {
            handle,
            terminate,
            input_index,
        })
    }

    /// Ask the worker to stop at the next batch boundary.
    pub fn terminate(&self) {
        debug!(input = self.input_index, "terminate requested");
        self.terminate.store(true, Ordering::Relaxed);
    }

    /// Join the thread and return its result.
    pub fn join(self) -> Result<(), MonitorError> {
        match self.handle.join() {
            Ok(result) => result,
            Err(_) => Err(MonitorError::Io(io::Error::other("input thread panicked"))),
        }
    }
}

fn run_input(
    input_index: usize,
    mut source: Box<dyn PacketSource>,
    correlator: Arc<Correlator>,
    batch_max: usize,
    terminate: Arc<AtomicBool>,
    abort: Arc<AtomicBool>,
) -> Result<(), MonitorError> {
    debug!(input = input_index, "input thread started");

    if let Err(source_err) = source.open() {
        error!(input = input_index, error = %source_err, "input failed to open");
        abort.store(true, Ordering::Relaxed);
        return Err(MonitorError::SourceOpen {
            input: input_index,
            source: source_err,
        });
    }

    // Monotonic baseline for arrival stamping.
    let t0 = Instant::now();

    let mut packets = vec![TsPacket::null(); batch_max];
    let mut metadata = vec![PacketMetadata::default(); batch_max];

    let result = loop {
        if terminate.load(Ordering::Relaxed) || abort.load(Ordering::Relaxed) {
            debug!(input = input_index, "input loop terminating");
            break Ok(());
        }

        for meta in metadata.iter_mut() {
            meta.reset();
        }

        let count = match source.receive(&mut packets, &mut metadata) {
            Ok(0) => {
                debug!(input = input_index, "end of input");
                break Ok(());
            }
            Ok(count) => count,
            Err(receive_err) => {
                error!(input = input_index, error = %receive_err, "receive failed");
                abort.store(true, Ordering::Relaxed);
                break Err(MonitorError::Io(receive_err));
            }
        };

        // Sources stamp either every packet of a batch or none; when the
        // first packet has no input timestamp, stamp the whole batch from
        // the monotonic clock.
        if !metadata[0].has_input_timestamp {
            let arrival_ts = monotonic_ticks(t0);
            for meta in metadata[..count].iter_mut() {
                meta.set_input_timestamp(arrival_ts);
            }
        }

        if let Err(write_err) = correlator.ingest(&packets[..count], &metadata[..count], input_index)
        {
            error!(input = input_index, error = %write_err, "report write failed");
            abort.store(true, Ordering::Relaxed);
            break Err(MonitorError::Io(write_err));
        }
    };

    source.close();
    debug!(input = input_index, "input thread stopped");
    result
}

/// Elapsed time since `t0` in 27 MHz units (27 ticks per microsecond).
fn monotonic_ticks(t0: Instant) -> i64 {
    t0.elapsed().as_micros() as i64 * 27
}
