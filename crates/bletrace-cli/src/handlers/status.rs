use crate::types::OutputFormat;
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub data_dir: PathBuf,
    pub days: Vec<DayStatus>,
    pub total_sightings: u64,
    pub total_sessions: u64,
}

#[derive(Debug, Serialize)]
pub struct DayStatus {
    pub date: String,
    pub sightings: u64,
    pub sessions: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartitionKind {
    Sightings,
    Sessions,
}

pub fn handle(data_dir: &Path, format: OutputFormat) -> Result<()> {
    let report = build_report(data_dir)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Plain => print_plain(&report),
    }

    Ok(())
}

/// Walk the partition files and tally data rows per day. A missing data
/// directory is an empty report, not an error.
fn build_report(data_dir: &Path) -> Result<StatusReport> {
    let mut days: BTreeMap<String, (u64, u64)> = BTreeMap::new();

    if data_dir.is_dir() {
        for entry in std::fs::read_dir(data_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some((kind, date)) = partition_parts(name) else {
                continue;
            };

            let rows = count_rows(&entry.path())?;
            let slot = days.entry(date.to_string()).or_default();
            match kind {
                PartitionKind::Sightings => slot.0 += rows,
                PartitionKind::Sessions => slot.1 += rows,
            }
        }
    }

    let days: Vec<DayStatus> = days
        .into_iter()
        .map(|(date, (sightings, sessions))| DayStatus {
            date,
            sightings,
            sessions,
        })
        .collect();

    Ok(StatusReport {
        data_dir: data_dir.to_path_buf(),
        total_sightings: days.iter().map(|d| d.sightings).sum(),
        total_sessions: days.iter().map(|d| d.sessions).sum(),
        days,
    })
}

/// Split a partition file name into its stream kind and day stamp.
fn partition_parts(name: &str) -> Option<(PartitionKind, &str)> {
    let stem = name.strip_suffix(".csv")?;
    if let Some(date) = stem.strip_prefix("seen-") {
        return Some((PartitionKind::Sightings, date));
    }
    if let Some(date) = stem.strip_prefix("sessions-") {
        return Some((PartitionKind::Sessions, date));
    }
    None
}

/// Data rows in a partition, not counting the header line.
fn count_rows(path: &Path) -> Result<u64> {
    let content = std::fs::read_to_string(path)?;
    Ok(content.lines().count().saturating_sub(1) as u64)
}

fn print_plain(report: &StatusReport) {
    println!("Data directory: {}", report.data_dir.display());
    if report.days.is_empty() {
        println!("No partitions found.");
        return;
    }

    for day in &report.days {
        println!(
            "  {}  {:>6} sightings  {:>5} sessions",
            day.date, day.sightings, day.sessions
        );
    }
    println!(
        "Totals: {} sightings, {} sessions over {} day(s)",
        report.total_sightings,
        report.total_sessions,
        report.days.len()
    );
}
