use std::collections::HashMap;

use bletrace_types::DeviceId;
use chrono::{DateTime, Duration, Utc};

/// Per-device rate limiter for the raw sighting log.
///
/// A device is admitted when at least one full window has passed since
/// its previous admission; a device never admitted before is always
/// eligible. Admission and the timestamp update are one operation, so a
/// suppressed sighting never advances the window.
#[derive(Debug)]
pub struct WriteThrottle {
    window: Duration,
    last_emitted: HashMap<DeviceId, DateTime<Utc>>,
}

impl WriteThrottle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_emitted: HashMap::new(),
        }
    }

    /// Returns true iff `now - last admission >= window`, recording
    /// `now` as the new admission timestamp when it does.
    pub fn admit(&mut self, device: &DeviceId, now: DateTime<Utc>) -> bool {
        if let Some(last) = self.last_emitted.get(device) {
            if now - *last < self.window {
                return false;
            }
        }
        self.last_emitted.insert(device.clone(), now);
        true
    }
}
