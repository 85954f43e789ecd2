use std::io::BufRead;

use bletrace_types::{DeviceId, Sighting};
use chrono::{DateTime, Utc};

use crate::Result;

/// Producer of sighting events.
///
/// `run` blocks, handing each sighting to `deliver` in arrival order,
/// and returns when the source is exhausted or `deliver` reports that
/// nobody is listening anymore. Implementations never decide policy;
/// throttling and session bookkeeping happen downstream.
pub trait SightingSource: Send {
    fn name(&self) -> &str;

    fn run(&mut self, deliver: &mut dyn FnMut(Sighting) -> bool) -> Result<()>;
}

/// Live source reading advertisement lines from a stream, one
/// `<address> [rssi]` pair per line, stamping arrival time with the
/// wall clock. Blank lines and `#` comments are skipped.
pub struct LineSource<R: BufRead> {
    reader: R,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead + Send> SightingSource for LineSource<R> {
    fn name(&self) -> &str {
        "lines"
    }

    fn run(&mut self, deliver: &mut dyn FnMut(Sighting) -> bool) -> Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(());
            }
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some((device, rssi)) = parse_advertisement(trimmed) else {
                continue;
            };
            if !deliver(Sighting::new(device, rssi, Utc::now())) {
                return Ok(());
            }
        }
    }
}

/// Offline source reading a capture file of
/// `<epoch_seconds> <address> [rssi]` lines, preserving the recorded
/// timestamps. Blank lines and `#` comments are skipped; lines that do
/// not parse are logged and dropped.
pub struct CaptureSource<R: BufRead> {
    reader: R,
}

impl<R: BufRead> CaptureSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead + Send> SightingSource for CaptureSource<R> {
    fn name(&self) -> &str {
        "capture"
    }

    fn run(&mut self, deliver: &mut dyn FnMut(Sighting) -> bool) -> Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(());
            }
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some(sighting) = parse_capture_line(trimmed) else {
                log::warn!("skipping malformed capture line: {:?}", trimmed);
                continue;
            };
            if !deliver(sighting) {
                return Ok(());
            }
        }
    }
}

/// Parse a live advertisement line: address, then an optional RSSI
/// token. A missing or unreadable reading counts as 0.
pub fn parse_advertisement(line: &str) -> Option<(DeviceId, i16)> {
    let mut parts = line.split_whitespace();
    let address = parts.next()?;
    let rssi = parse_rssi(parts.next());
    Some((DeviceId::new(address), rssi))
}

/// Parse a capture line: epoch seconds (fractional part preserved to
/// microseconds), address, optional RSSI.
pub fn parse_capture_line(line: &str) -> Option<Sighting> {
    let mut parts = line.split_whitespace();
    let stamp: f64 = parts.next()?.parse().ok()?;
    let address = parts.next()?;
    let rssi = parse_rssi(parts.next());

    let micros = (stamp * 1_000_000.0).round() as i64;
    let seen_at: DateTime<Utc> = DateTime::from_timestamp_micros(micros)?;
    Some(Sighting::new(DeviceId::new(address), rssi, seen_at))
}

fn parse_rssi(token: Option<&str>) -> i16 {
    token.and_then(|t| t.parse::<i16>().ok()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_advertisement_with_rssi() {
        let (device, rssi) = parse_advertisement("AA:BB:CC:DD:EE:FF -67").expect("parses");
        assert_eq!(device.as_str(), "AA:BB:CC:DD:EE:FF");
        assert_eq!(rssi, -67);
    }

    #[test]
    fn test_missing_rssi_reads_as_zero() {
        let (_, rssi) = parse_advertisement("AA:BB:CC:DD:EE:FF").expect("parses");
        assert_eq!(rssi, 0);
    }

    #[test]
    fn test_garbage_rssi_reads_as_zero() {
        let (_, rssi) = parse_advertisement("AA:BB:CC:DD:EE:FF strong").expect("parses");
        assert_eq!(rssi, 0);
    }

    #[test]
    fn test_parse_capture_line_preserves_subseconds() {
        let sighting = parse_capture_line("1724245800.125 AA:BB:CC:DD:EE:FF -67").expect("parses");
        assert_eq!(sighting.device.as_str(), "AA:BB:CC:DD:EE:FF");
        assert_eq!(sighting.rssi, -67);
        assert_eq!(sighting.seen_at.timestamp(), 1_724_245_800);
        assert_eq!(sighting.seen_at.timestamp_subsec_micros(), 125_000);
    }

    #[test]
    fn test_capture_line_without_address_is_rejected() {
        assert!(parse_capture_line("1724245800.125").is_none());
        assert!(parse_capture_line("not-a-timestamp AA:BB -60").is_none());
    }

    #[test]
    fn test_line_source_skips_blanks_and_comments() {
        let input = "# capture of lobby beacon\n\nAA:BB:CC:DD:EE:FF -60\n";
        let mut source = LineSource::new(Cursor::new(input));
        let mut seen = Vec::new();
        source
            .run(&mut |s| {
                seen.push(s);
                true
            })
            .expect("run");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].device.as_str(), "AA:BB:CC:DD:EE:FF");
        assert_eq!(seen[0].rssi, -60);
    }

    #[test]
    fn test_capture_source_drops_malformed_lines() {
        let input = "1000.0 AA -60\nbogus line here\n1001.0 BB -70\n";
        let mut source = CaptureSource::new(Cursor::new(input));
        let mut seen = Vec::new();
        source
            .run(&mut |s| {
                seen.push(s);
                true
            })
            .expect("run");
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].device.as_str(), "AA");
        assert_eq!(seen[1].device.as_str(), "BB");
    }

    #[test]
    fn test_source_stops_when_delivery_fails() {
        let input = "1000.0 AA -60\n1001.0 BB -70\n1002.0 CC -80\n";
        let mut source = CaptureSource::new(Cursor::new(input));
        let mut count = 0;
        source
            .run(&mut |_| {
                count += 1;
                count < 2
            })
            .expect("run");
        assert_eq!(count, 2);
    }
}
