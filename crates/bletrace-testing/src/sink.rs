use std::sync::{Arc, Mutex};

use bletrace_store::{RecordSink, Result};
use bletrace_types::{SessionSummary, SightingRecord};

#[derive(Debug, Clone)]
enum SinkOp {
    Sighting(SightingRecord),
    Session(SessionSummary),
}

#[derive(Debug, Default)]
struct Inner {
    ops: Vec<SinkOp>,
    fail_appends: bool,
}

/// In-memory sink that records every append in arrival order.
///
/// Clones share state, so a test can hand one clone to the code under
/// test and inspect the other after the run. `failing()` builds a sink
/// whose appends all error, for exercising best-effort persistence.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<Inner>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                ops: Vec::new(),
                fail_appends: true,
            })),
        }
    }

    /// Raw-log rows in append order.
    pub fn sightings(&self) -> Vec<SightingRecord> {
        self.inner
            .lock()
            .expect("sink lock")
            .ops
            .iter()
            .filter_map(|op| match op {
                SinkOp::Sighting(record) => Some(record.clone()),
                SinkOp::Session(_) => None,
            })
            .collect()
    }

    /// Session rows in append order.
    pub fn sessions(&self) -> Vec<SessionSummary> {
        self.inner
            .lock()
            .expect("sink lock")
            .ops
            .iter()
            .filter_map(|op| match op {
                SinkOp::Session(summary) => Some(summary.clone()),
                SinkOp::Sighting(_) => None,
            })
            .collect()
    }

    /// Kind of every append in order, for interleaving assertions.
    pub fn op_kinds(&self) -> Vec<&'static str> {
        self.inner
            .lock()
            .expect("sink lock")
            .ops
            .iter()
            .map(|op| match op {
                SinkOp::Sighting(_) => "sighting",
                SinkOp::Session(_) => "session",
            })
            .collect()
    }

    fn push(&self, op: SinkOp) -> Result<()> {
        let mut inner = self.inner.lock().expect("sink lock");
        if inner.fail_appends {
            return Err(std::io::Error::other("sink is wired to fail").into());
        }
        inner.ops.push(op);
        Ok(())
    }
}

impl RecordSink for MemorySink {
    fn append_sighting(&mut self, record: &SightingRecord) -> Result<()> {
        self.push(SinkOp::Sighting(record.clone()))
    }

    fn append_session(&mut self, summary: &SessionSummary) -> Result<()> {
        self.push(SinkOp::Session(summary.clone()))
    }
}
