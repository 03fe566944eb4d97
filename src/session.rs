//! Session controller: owns the workers and the correlator
//!
//! Lifecycle: `start` opens the report sink, writes the CSV header and
//! spawns one ingest worker per input; `wait` joins them; `stop` flips
//! the terminate flags. The correlator is shared with the workers through
//! an `Arc` and dropped after the last worker has joined.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::correlator::Correlator;
use crate::error::MonitorError;
use crate::ingest::IngestWorker;
use crate::report::CsvReport;
use crate::source::PacketSource;
use crate::types::SessionState;

/// A running monitoring session.
pub struct Session {
    workers: Vec<IngestWorker>,
    correlator: Arc<Correlator>,
    state: Mutex<SessionState>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("workers", &self.workers.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Validate the configuration, open the report sink and start both
    /// ingest workers. Returns once the session is running.
    pub fn start(config: SessionConfig) -> Result<Session, MonitorError> {
        let sources = config.inputs.iter().map(|spec| spec.create()).collect();
        Session::start_with_sources(config, sources)
    }

    /// Start with caller-provided sources (one per configured input).
    /// This is the seam that lets anything implementing `PacketSource`
    /// plug in.
    pub fn start_with_sources(
        config: SessionConfig,
        sources: Vec<Box<dyn PacketSource>>,
    ) -> Result<Session, MonitorError> {
        config.validate()?;
        if sources.len() != config.inputs.len() {
            return Err(MonitorError::Config(format!(
                "expected {} sources, got {}",
                config.inputs.len(),
                sources.len()
            )));
        }

        let mut report = CsvReport::open(config.output_path.as_deref())?;
        report.write_header()?;

        let correlator = Arc::new(Correlator::new(&config, report));
        let abort = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(sources.len());
        for (input_index, source) in sources.into_iter().enumerate() {
            let spawned = IngestWorker::spawn(
                input_index,
                source,
                Arc::clone(&correlator),
                config.packet_batch_max,
                Arc::clone(&abort),
            );
            match spawned {
                Ok(worker) => workers.push(worker),
                Err(spawn_err) => {
                    // Tear down whatever already started before failing.
                    abort.store(true, std::sync::atomic::Ordering::Relaxed);
                    for worker in &workers {
                        worker.terminate();
                    }
                    for worker in workers {
                        let _ = worker.join();
                    }
                    return Err(MonitorError::Io(spawn_err));
                }
            }
        }

        info!(inputs = workers.len(), "session running");
        Ok(Session {
            workers,
            correlator,
            state: Mutex::new(SessionState::Running),
        })
    }

    /// Ask every worker to stop at its next batch boundary. Idempotent;
    /// a worker blocked in `receive` exits once the call returns.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        if *state == SessionState::Running {
            *state = SessionState::Stopping;
        }
        drop(state);
        for worker in &self.workers {
            worker.terminate();
        }
    }

    /// Join all workers, flush and close the report sink, and surface the
    /// first worker error, if any.
    pub fn wait(self) -> Result<(), MonitorError> {
        let mut first_error = None;
        for worker in self.workers {
            if let Err(worker_err) = worker.join() {
                if first_error.is_none() {
                    first_error = Some(worker_err);
                }
            }
        }
        *self.state.lock() = SessionState::Drained;
        debug!("all input threads joined");

        let rows = self.correlator.rows_emitted();
        // Dropping the correlator closes the sink.
        drop(self.correlator);
        *self.state.lock() = SessionState::Closed;
        info!(rows, "session closed");

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
