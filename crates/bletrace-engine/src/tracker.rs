use std::collections::HashMap;
use std::collections::hash_map::Entry;

use bletrace_types::{DeviceId, SessionSummary, Sighting, SightingRecord};
use chrono::{DateTime, Duration, Utc};

use crate::anonymize::Anonymizer;
use crate::session::OpenSession;
use crate::throttle::WriteThrottle;

/// The session table and everything that feeds it.
///
/// Owns all mutable aggregation state: one open session per device at
/// most, plus the raw-log throttle stamps. The tracker never touches a
/// clock or performs I/O; timestamps flow in with each call and closed
/// summaries flow back out for the caller to persist. Callers decide
/// when to sweep and when to drain.
#[derive(Debug)]
pub struct SessionTracker {
    timeout: Duration,
    sessions: HashMap<DeviceId, OpenSession>,
    throttle: WriteThrottle,
    anonymizer: Anonymizer,
}

impl SessionTracker {
    pub fn new(timeout: Duration, throttle_window: Duration, anonymizer: Anonymizer) -> Self {
        Self {
            timeout,
            sessions: HashMap::new(),
            throttle: WriteThrottle::new(throttle_window),
            anonymizer,
        }
    }

    /// Ingest one sighting.
    ///
    /// Returns the raw-log record when the throttle admits it; the
    /// session table is updated either way, so means stay correct no
    /// matter how many sightings the raw log drops.
    pub fn ingest(&mut self, sighting: Sighting) -> Option<SightingRecord> {
        let Sighting {
            device,
            rssi,
            seen_at,
        } = sighting;

        let record = if self.throttle.admit(&device, seen_at) {
            Some(SightingRecord {
                id: self.anonymizer.stored_id(&device),
                seen_at,
                rssi,
                raw_address: self.echo_of(&device),
            })
        } else {
            None
        };

        match self.sessions.entry(device) {
            Entry::Occupied(mut entry) => entry.get_mut().observe(rssi, seen_at),
            Entry::Vacant(entry) => {
                entry.insert(OpenSession::open(rssi, seen_at));
            }
        }

        record
    }

    /// Close every session whose last sighting is at least one timeout
    /// old. Stale keys are snapshotted first; each closure removes the
    /// entry and shapes the summary in one step.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> Vec<SessionSummary> {
        let stale: Vec<DeviceId> = self
            .sessions
            .iter()
            .filter(|(_, session)| session.is_stale(now, self.timeout))
            .map(|(device, _)| device.clone())
            .collect();

        stale
            .into_iter()
            .filter_map(|device| self.close(&device))
            .collect()
    }

    /// Close every remaining session regardless of age. Used once at
    /// shutdown; calling it again on the emptied table yields nothing.
    pub fn drain(&mut self) -> Vec<SessionSummary> {
        let open: Vec<DeviceId> = self.sessions.keys().cloned().collect();
        open.into_iter()
            .filter_map(|device| self.close(&device))
            .collect()
    }

    /// Number of currently open sessions.
    pub fn open_sessions(&self) -> usize {
        self.sessions.len()
    }

    fn close(&mut self, device: &DeviceId) -> Option<SessionSummary> {
        let session = self.sessions.remove(device)?;
        Some(SessionSummary {
            id: self.anonymizer.stored_id(device),
            started_at: session.started_at,
            ended_at: session.last_seen_at,
            duration_secs: session.duration_secs(),
            mean_rssi: session.mean_rssi(),
            raw_address: self.echo_of(device),
        })
    }

    fn echo_of(&self, device: &DeviceId) -> Option<String> {
        self.anonymizer
            .echoes_raw()
            .then(|| device.as_str().to_string())
    }
}
