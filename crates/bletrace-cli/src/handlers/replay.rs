use crate::types::OutputFormat;
use anyhow::{Context, Result};
use bletrace_engine::SessionTracker;
use bletrace_runtime::{CaptureSource, Config, replay};
use bletrace_store::CsvStore;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub fn handle(
    config: &Config,
    data_dir: &Path,
    capture: &Path,
    format: OutputFormat,
) -> Result<()> {
    let file = File::open(capture)
        .with_context(|| format!("could not open capture file {}", capture.display()))?;
    let mut source = CaptureSource::new(BufReader::new(file));

    let mut store = CsvStore::create(data_dir, config.row_schema())
        .with_context(|| format!("could not open data directory {}", data_dir.display()))?;

    let tracker = SessionTracker::new(
        config.session_timeout(),
        config.throttle_window(),
        config.anonymizer(),
    );
    let flush_interval = chrono::Duration::seconds(config.flush_interval_secs as i64);

    let report = replay::run(&mut source, tracker, flush_interval, &mut store)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Plain => {
            println!("Replayed {}", capture.display());
            println!("  sightings seen    {}", report.sightings_seen);
            println!("  raw rows written  {}", report.raw_rows_written);
            println!("  sessions closed   {}", report.sessions_closed);
            if report.write_failures > 0 {
                println!("  write failures    {}", report.write_failures);
            }
        }
    }

    Ok(())
}
