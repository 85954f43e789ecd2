use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw advertised identifier of a beacon device (e.g. a BLE MAC address).
///
/// Any string is a valid identifier; equality and hashing are on the raw
/// form, so the session table and throttle state key on the physical
/// device regardless of the configured identifier policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One observed advertisement: a device seen at a point in time with a
/// signal-strength reading.
///
/// Produced by a sighting source, consumed per call. Sources normalize a
/// missing or unreadable RSSI to 0 before the event reaches the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sighting {
    pub device: DeviceId,
    /// Received signal strength in dBm.
    pub rssi: i16,
    pub seen_at: DateTime<Utc>,
}

impl Sighting {
    pub fn new(device: DeviceId, rssi: i16, seen_at: DateTime<Utc>) -> Self {
        Self {
            device,
            rssi,
            seen_at,
        }
    }
}

/// Row destined for the raw sighting log.
///
/// `id` is the stored identifier, already shaped by the identifier
/// policy. `raw_address` is populated only when the policy echoes the
/// raw form; with anonymization enabled it is always `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SightingRecord {
    pub id: String,
    pub seen_at: DateTime<Utc>,
    pub rssi: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_address: Option<String>,
}

/// Closed presence session, one row in the session log.
///
/// `ended_at` is the timestamp of the last sighting that fed the
/// session, for timed-out and drained sessions alike. `duration_secs`
/// and `mean_rssi` are rounded to the nearest integer at emission;
/// accumulation up to that point is exact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_secs: i64,
    pub mean_rssi: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_address: Option<String>,
}
