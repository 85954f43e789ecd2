use bletrace_types::{SessionSummary, SightingRecord};

use crate::error::Result;

/// Append-only destination for the two record streams.
///
/// Callers guarantee per-device ordering: a device's sighting rows
/// arrive in non-decreasing timestamp order and its session summary
/// only after every sighting that fed it. Implementations just append.
/// `Send` so a boxed sink can move onto the engine thread.
pub trait RecordSink: Send {
    /// Append one row to the raw sighting stream.
    fn append_sighting(&mut self, record: &SightingRecord) -> Result<()>;

    /// Append one row to the session stream.
    fn append_session(&mut self, summary: &SessionSummary) -> Result<()>;
}
