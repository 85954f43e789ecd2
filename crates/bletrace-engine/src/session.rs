use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Accumulated state for one device's open presence session.
///
/// Running sums stay exact for the whole life of the record; the mean
/// and duration are rounded to the nearest integer only when the
/// session closes. `sighting_count` is at least 1 from construction on,
/// so the mean is always defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenSession {
    pub started_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub rssi_sum: i64,
    pub sighting_count: u64,
}

impl OpenSession {
    /// Open a session from the first sighting of a device.
    pub fn open(rssi: i16, seen_at: DateTime<Utc>) -> Self {
        Self {
            started_at: seen_at,
            last_seen_at: seen_at,
            rssi_sum: rssi as i64,
            sighting_count: 1,
        }
    }

    /// Fold one more sighting into the session.
    pub fn observe(&mut self, rssi: i16, seen_at: DateTime<Utc>) {
        self.last_seen_at = seen_at;
        self.rssi_sum += rssi as i64;
        self.sighting_count += 1;
    }

    /// A session is stale once a full timeout has elapsed since its
    /// last sighting.
    pub fn is_stale(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        now - self.last_seen_at >= timeout
    }

    /// Arithmetic mean of all readings, rounded to the nearest dBm.
    pub fn mean_rssi(&self) -> i16 {
        (self.rssi_sum as f64 / self.sighting_count as f64).round() as i16
    }

    /// Observed span in whole seconds, rounded to nearest. Negative if
    /// the clock regressed between sightings, which is tolerated.
    pub fn duration_secs(&self) -> i64 {
        let millis = (self.last_seen_at - self.started_at).num_milliseconds();
        (millis as f64 / 1000.0).round() as i64
    }
}
