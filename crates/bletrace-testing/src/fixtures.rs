//! Deterministic builders for sighting data.

use bletrace_types::{DeviceId, Sighting};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Fixed reference instant shared by deterministic tests.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 8, 21, 12, 0, 0).unwrap()
}

/// `base_time` shifted by whole seconds.
pub fn at(secs: i64) -> DateTime<Utc> {
    base_time() + Duration::seconds(secs)
}

/// Sighting of `device` at `base_time + secs`.
pub fn sighting(device: &str, rssi: i16, secs: i64) -> Sighting {
    Sighting::new(DeviceId::new(device), rssi, at(secs))
}
