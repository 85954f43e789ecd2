use anyhow::{Context, Result};
use bletrace_engine::SessionTracker;
use bletrace_runtime::{Config, LineSource, Monitor};
use bletrace_store::CsvStore;
use std::io::{self, BufReader};
use std::path::Path;

pub fn handle(config: &Config, data_dir: &Path) -> Result<()> {
    let store = CsvStore::create(data_dir, config.row_schema())
        .with_context(|| format!("could not open data directory {}", data_dir.display()))?;

    let tracker = SessionTracker::new(
        config.session_timeout(),
        config.throttle_window(),
        config.anonymizer(),
    );
    let source = LineSource::new(BufReader::new(io::stdin()));

    let monitor = Monitor::start(
        tracker,
        config.flush_interval(),
        Box::new(source),
        Box::new(store),
    )?;

    let shutdown = monitor.shutdown_handle();
    ctrlc::set_handler(move || shutdown.request())?;

    log::info!(
        "tracking sightings from stdin into {} (ctrl-c to stop)",
        data_dir.display()
    );

    let report = monitor.wait()?;
    log::info!(
        "run finished: {} sightings seen, {} raw rows, {} sessions closed",
        report.sightings_seen,
        report.raw_rows_written,
        report.sessions_closed
    );
    if report.write_failures > 0 {
        log::warn!("{} writes failed during the run", report.write_failures);
    }

    Ok(())
}
