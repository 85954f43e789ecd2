use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use bletrace_engine::SessionTracker;
use bletrace_store::RecordSink;
use bletrace_types::{SessionSummary, Sighting};
use chrono::Utc;
use serde::Serialize;

use crate::source::SightingSource;
use crate::{Error, Result};

/// Messages flowing into the engine thread.
#[derive(Debug)]
enum MonitorEvent {
    Sighting(Sighting),
    SourceClosed,
    Shutdown,
}

/// Counters from a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Sightings the engine ingested.
    pub sightings_seen: u64,
    /// Raw-log rows that passed the throttle and were persisted.
    pub raw_rows_written: u64,
    /// Sessions closed by eviction or drain, whether or not their row
    /// made it to disk.
    pub sessions_closed: u64,
    /// Appends (either stream) that failed. Failures never stop a run.
    pub write_failures: u64,
}

/// Cheap cloneable handle asking a running monitor to shut down.
///
/// Safe to invoke more than once; the engine drains exactly once and
/// later requests land on an emptied channel.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Sender<MonitorEvent>,
}

impl ShutdownHandle {
    pub fn request(&self) {
        let _ = self.tx.send(MonitorEvent::Shutdown);
    }
}

/// The lifecycle controller.
///
/// Owns two threads: a source thread feeding sightings into a channel,
/// and an engine thread that owns the tracker and the sink. The engine
/// thread serializes ingestion and eviction, so no lock guards the
/// session table, and an eviction cycle can never be interrupted by a
/// shutdown: requests are only observed between channel waits. When the
/// loop exits (shutdown request, source exhaustion, or every sender
/// gone) the tracker drains once and the report comes back via `wait`.
pub struct Monitor {
    tx: Sender<MonitorEvent>,
    engine_handle: JoinHandle<RunReport>,
    // The source thread may sit in a blocking read past shutdown, so it
    // is never joined; it unblocks or dies with the process.
    _source_handle: JoinHandle<()>,
}

impl Monitor {
    /// Spawn the source and engine threads and start tracking.
    pub fn start(
        tracker: SessionTracker,
        flush_interval: Duration,
        mut source: Box<dyn SightingSource>,
        mut sink: Box<dyn RecordSink>,
    ) -> Result<Self> {
        let (tx, rx) = channel();

        let source_tx = tx.clone();
        let source_handle = std::thread::Builder::new()
            .name("bletrace-source".to_string())
            .spawn(move || {
                let outcome = source.run(&mut |sighting| {
                    source_tx.send(MonitorEvent::Sighting(sighting)).is_ok()
                });
                if let Err(e) = outcome {
                    log::error!("sighting source {} failed: {}", source.name(), e);
                }
                let _ = source_tx.send(MonitorEvent::SourceClosed);
            })
            .map_err(Error::Io)?;

        let engine_handle = std::thread::Builder::new()
            .name("bletrace-engine".to_string())
            .spawn(move || engine_loop(tracker, flush_interval, rx, sink.as_mut()))
            .map_err(Error::Io)?;

        Ok(Self {
            tx,
            engine_handle,
            _source_handle: source_handle,
        })
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.tx.clone(),
        }
    }

    /// Block until the run finishes and return its counters.
    pub fn wait(self) -> Result<RunReport> {
        drop(self.tx);
        self.engine_handle
            .join()
            .map_err(|_| Error::InvalidOperation("engine thread panicked".to_string()))
    }
}

fn engine_loop(
    mut tracker: SessionTracker,
    flush_interval: Duration,
    rx: Receiver<MonitorEvent>,
    sink: &mut dyn RecordSink,
) -> RunReport {
    let mut report = RunReport::default();
    let mut next_sweep = Instant::now() + flush_interval;

    loop {
        let wait = next_sweep.saturating_duration_since(Instant::now());
        match rx.recv_timeout(wait) {
            Ok(MonitorEvent::Sighting(sighting)) => {
                report.sightings_seen += 1;
                log::debug!("sighting {} rssi {}", sighting.device, sighting.rssi);
                if let Some(record) = tracker.ingest(sighting) {
                    match sink.append_sighting(&record) {
                        Ok(()) => report.raw_rows_written += 1,
                        Err(e) => {
                            report.write_failures += 1;
                            log::error!("failed to append sighting row: {}", e);
                        }
                    }
                }
            }
            Ok(MonitorEvent::SourceClosed) => {
                log::info!("sighting source closed, draining open sessions");
                break;
            }
            Ok(MonitorEvent::Shutdown) => {
                log::info!("shutdown requested, draining open sessions");
                break;
            }
            Err(RecvTimeoutError::Timeout) => {
                // Fall through to the sweep check.
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if Instant::now() >= next_sweep {
            flush_summaries(tracker.sweep(Utc::now()), sink, &mut report);
            next_sweep = Instant::now() + flush_interval;
        }
    }

    flush_summaries(tracker.drain(), sink, &mut report);
    report
}

fn flush_summaries(
    summaries: Vec<SessionSummary>,
    sink: &mut dyn RecordSink,
    report: &mut RunReport,
) {
    for summary in summaries {
        report.sessions_closed += 1;
        log::info!(
            "closed session {} ({}s, mean rssi {})",
            summary.id,
            summary.duration_secs,
            summary.mean_rssi
        );
        if let Err(e) = sink.append_session(&summary) {
            report.write_failures += 1;
            log::error!("failed to append session row: {}", e);
        }
    }
}
