use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use bletrace_types::{SessionSummary, SightingRecord, day_stamp, format_utc};

use crate::error::Result;
use crate::sink::RecordSink;

/// Column set carried by both CSV streams.
///
/// Chosen once at startup from the identifier policy; every partition a
/// store writes has the same shape, never a per-row decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSchema {
    /// Stored id plus a trailing raw-address (`mac`) column.
    WithRawAddress,
    /// Stored id only.
    Anonymized,
}

impl RowSchema {
    pub fn for_raw_echo(echoes_raw: bool) -> Self {
        if echoes_raw {
            RowSchema::WithRawAddress
        } else {
            RowSchema::Anonymized
        }
    }
}

/// Date-partitioned CSV store.
///
/// Sighting rows land in `seen-YYYY-MM-DD.csv` keyed by the sighting's
/// own date; session rows land in `sessions-YYYY-MM-DD.csv` keyed by
/// the session's start date. A partition gets its header exactly once,
/// when the file is created (or found empty), and is appended to ever
/// after. Files are opened per append, so midnight rollover and
/// external rotation need no special handling.
#[derive(Debug)]
pub struct CsvStore {
    dir: PathBuf,
    schema: RowSchema,
}

impl CsvStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn create(dir: impl Into<PathBuf>, schema: RowSchema) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, schema })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn schema(&self) -> RowSchema {
        self.schema
    }

    fn sighting_header(&self) -> &'static [&'static str] {
        match self.schema {
            RowSchema::WithRawAddress => &["id", "utc", "rssi", "mac"],
            RowSchema::Anonymized => &["id", "utc", "rssi"],
        }
    }

    fn session_header(&self) -> &'static [&'static str] {
        match self.schema {
            RowSchema::WithRawAddress => {
                &["id", "start_utc", "end_utc", "duration_s", "mean_rssi", "mac"]
            }
            RowSchema::Anonymized => &["id", "start_utc", "end_utc", "duration_s", "mean_rssi"],
        }
    }

    fn append_row(&self, file_name: &str, header: &[&str], row: &[String]) -> Result<()> {
        let path = self.dir.join(file_name);
        let needs_header = match std::fs::metadata(&path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer.write_record(header)?;
        }
        writer.write_record(row)?;
        writer.flush()?;
        Ok(())
    }
}

impl RecordSink for CsvStore {
    fn append_sighting(&mut self, record: &SightingRecord) -> Result<()> {
        let file_name = format!("seen-{}.csv", day_stamp(record.seen_at));
        let mut row = vec![
            record.id.clone(),
            format_utc(record.seen_at),
            record.rssi.to_string(),
        ];
        if self.schema == RowSchema::WithRawAddress {
            row.push(record.raw_address.clone().unwrap_or_default());
        }
        self.append_row(&file_name, self.sighting_header(), &row)
    }

    fn append_session(&mut self, summary: &SessionSummary) -> Result<()> {
        let file_name = format!("sessions-{}.csv", day_stamp(summary.started_at));
        let mut row = vec![
            summary.id.clone(),
            format_utc(summary.started_at),
            format_utc(summary.ended_at),
            summary.duration_secs.to_string(),
            summary.mean_rssi.to_string(),
        ];
        if self.schema == RowSchema::WithRawAddress {
            row.push(summary.raw_address.clone().unwrap_or_default());
        }
        self.append_row(&file_name, self.session_header(), &row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use tempfile::TempDir;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 21, 12, 0, 0).unwrap()
    }

    fn sighting_record(id: &str, secs: i64, rssi: i16, raw: Option<&str>) -> SightingRecord {
        SightingRecord {
            id: id.to_string(),
            seen_at: base_time() + Duration::seconds(secs),
            rssi,
            raw_address: raw.map(str::to_string),
        }
    }

    fn read_lines(dir: &Path, name: &str) -> Vec<String> {
        let content = std::fs::read_to_string(dir.join(name)).expect("partition exists");
        content.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_header_written_once_then_appends() {
        let tmp = TempDir::new().expect("tempdir");
        let mut store = CsvStore::create(tmp.path(), RowSchema::WithRawAddress).expect("store");

        store
            .append_sighting(&sighting_record("AA", 0, -60, Some("AA")))
            .expect("append");
        store
            .append_sighting(&sighting_record("AA", 6, -61, Some("AA")))
            .expect("append");

        let lines = read_lines(tmp.path(), "seen-2024-08-21.csv");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "id,utc,rssi,mac");
        assert_eq!(lines[1], "AA,2024-08-21T12:00:00.000000+00:00,-60,AA");
        assert_eq!(lines[2], "AA,2024-08-21T12:00:06.000000+00:00,-61,AA");
    }

    #[test]
    fn test_anonymized_schema_has_no_mac_column() {
        let tmp = TempDir::new().expect("tempdir");
        let mut store = CsvStore::create(tmp.path(), RowSchema::Anonymized).expect("store");

        store
            .append_sighting(&sighting_record("3f2a9c", 0, -60, None))
            .expect("append");

        let lines = read_lines(tmp.path(), "seen-2024-08-21.csv");
        assert_eq!(lines[0], "id,utc,rssi");
        assert_eq!(lines[1], "3f2a9c,2024-08-21T12:00:00.000000+00:00,-60");
    }

    #[test]
    fn test_sightings_partition_by_their_own_date() {
        let tmp = TempDir::new().expect("tempdir");
        let mut store = CsvStore::create(tmp.path(), RowSchema::Anonymized).expect("store");

        store
            .append_sighting(&sighting_record("AA", 0, -60, None))
            .expect("append");
        // Crosses midnight into the next day.
        store
            .append_sighting(&sighting_record("AA", 13 * 3600, -61, None))
            .expect("append");

        assert!(tmp.path().join("seen-2024-08-21.csv").exists());
        assert!(tmp.path().join("seen-2024-08-22.csv").exists());
    }

    #[test]
    fn test_sessions_partition_by_start_date() {
        let tmp = TempDir::new().expect("tempdir");
        let mut store = CsvStore::create(tmp.path(), RowSchema::Anonymized).expect("store");

        // Starts before midnight, ends after; the row belongs to the start day.
        let summary = SessionSummary {
            id: "AA".to_string(),
            started_at: Utc.with_ymd_and_hms(2024, 8, 21, 23, 59, 0).unwrap(),
            ended_at: Utc.with_ymd_and_hms(2024, 8, 22, 0, 10, 0).unwrap(),
            duration_secs: 660,
            mean_rssi: -60,
            raw_address: None,
        };
        store.append_session(&summary).expect("append");

        let lines = read_lines(tmp.path(), "sessions-2024-08-21.csv");
        assert_eq!(lines[0], "id,start_utc,end_utc,duration_s,mean_rssi");
        assert_eq!(
            lines[1],
            "AA,2024-08-21T23:59:00.000000+00:00,2024-08-22T00:10:00.000000+00:00,660,-60"
        );
        assert!(!tmp.path().join("sessions-2024-08-22.csv").exists());
    }

    #[test]
    fn test_session_row_with_mac_column() {
        let tmp = TempDir::new().expect("tempdir");
        let mut store = CsvStore::create(tmp.path(), RowSchema::WithRawAddress).expect("store");

        let summary = SessionSummary {
            id: "AA:BB:CC:DD:EE:FF".to_string(),
            started_at: base_time(),
            ended_at: base_time() + Duration::seconds(6),
            duration_secs: 6,
            mean_rssi: -60,
            raw_address: Some("AA:BB:CC:DD:EE:FF".to_string()),
        };
        store.append_session(&summary).expect("append");

        let lines = read_lines(tmp.path(), "sessions-2024-08-21.csv");
        assert_eq!(
            lines[0],
            "id,start_utc,end_utc,duration_s,mean_rssi,mac"
        );
        assert_eq!(
            lines[1],
            "AA:BB:CC:DD:EE:FF,2024-08-21T12:00:00.000000+00:00,2024-08-21T12:00:06.000000+00:00,6,-60,AA:BB:CC:DD:EE:FF"
        );
    }

    #[test]
    fn test_reopened_store_appends_without_second_header() {
        let tmp = TempDir::new().expect("tempdir");
        {
            let mut store = CsvStore::create(tmp.path(), RowSchema::Anonymized).expect("store");
            store
                .append_sighting(&sighting_record("AA", 0, -60, None))
                .expect("append");
        }
        {
            let mut store = CsvStore::create(tmp.path(), RowSchema::Anonymized).expect("store");
            store
                .append_sighting(&sighting_record("BB", 1, -70, None))
                .expect("append");
        }

        let lines = read_lines(tmp.path(), "seen-2024-08-21.csv");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "id,utc,rssi");
        assert!(lines[2].starts_with("BB,"));
    }

    #[test]
    fn test_empty_partition_file_receives_header() {
        let tmp = TempDir::new().expect("tempdir");
        std::fs::File::create(tmp.path().join("seen-2024-08-21.csv")).expect("touch");

        let mut store = CsvStore::create(tmp.path(), RowSchema::Anonymized).expect("store");
        store
            .append_sighting(&sighting_record("AA", 0, -60, None))
            .expect("append");

        let lines = read_lines(tmp.path(), "seen-2024-08-21.csv");
        assert_eq!(lines[0], "id,utc,rssi");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_create_makes_the_data_directory() {
        let tmp = TempDir::new().expect("tempdir");
        let nested = tmp.path().join("var").join("bletrace");
        let _store = CsvStore::create(&nested, RowSchema::Anonymized).expect("store");
        assert!(nested.is_dir());
    }
}
