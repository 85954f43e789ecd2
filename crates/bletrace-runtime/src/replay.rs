use bletrace_engine::SessionTracker;
use bletrace_store::RecordSink;
use bletrace_types::SessionSummary;
use chrono::{DateTime, Duration, Utc};

use crate::Result;
use crate::monitor::RunReport;
use crate::source::SightingSource;

/// Single-pass offline run over a recorded capture.
///
/// The clock is virtual: it advances with the capture timestamps, and
/// eviction sweeps fire at every flush-interval boundary of stream time
/// that passes between two sightings. A quiet stretch longer than the
/// session timeout therefore splits sessions exactly as it would live.
/// Sweeps for a gap run before the sighting that revealed the gap is
/// ingested. Whatever is still open when the capture ends is drained,
/// mirroring shutdown.
pub fn run(
    source: &mut dyn SightingSource,
    mut tracker: SessionTracker,
    flush_interval: Duration,
    sink: &mut dyn RecordSink,
) -> Result<RunReport> {
    let mut report = RunReport::default();
    let mut next_sweep: Option<DateTime<Utc>> = None;

    source.run(&mut |sighting| {
        let now = sighting.seen_at;
        let mut deadline = *next_sweep.get_or_insert(now + flush_interval);

        while deadline <= now {
            flush_summaries(tracker.sweep(deadline), sink, &mut report);
            deadline += flush_interval;
        }
        next_sweep = Some(deadline);

        report.sightings_seen += 1;
        if let Some(record) = tracker.ingest(sighting) {
            match sink.append_sighting(&record) {
                Ok(()) => report.raw_rows_written += 1,
                Err(e) => {
                    report.write_failures += 1;
                    log::error!("failed to append sighting row: {}", e);
                }
            }
        }
        true
    })?;

    flush_summaries(tracker.drain(), sink, &mut report);
    Ok(report)
}

fn flush_summaries(
    summaries: Vec<SessionSummary>,
    sink: &mut dyn RecordSink,
    report: &mut RunReport,
) {
    for summary in summaries {
        report.sessions_closed += 1;
        if let Err(e) = sink.append_session(&summary) {
            report.write_failures += 1;
            log::error!("failed to append session row: {}", e);
        }
    }
}
