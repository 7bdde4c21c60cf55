//! Scalar sinks

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::rc::Rc;
use tracing::{info, warn};

use crate::distributed::Membership;
use crate::error::Result;

/// One recorded scalar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarRecord {
    pub name: String,
    pub value: f32,
    pub step: u64,
}

/// Destination for training scalars
pub trait TelemetrySink {
    fn add_scalar(&mut self, name: &str, value: f32, step: u64);

    fn flush(&mut self) {}
}

impl<S: TelemetrySink + ?Sized> TelemetrySink for Box<S> {
    fn add_scalar(&mut self, name: &str, value: f32, step: u64) {
        (**self).add_scalar(name, value, step);
    }

    fn flush(&mut self) {
        (**self).flush();
    }
}

/// Emits every scalar as a `tracing` event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn add_scalar(&mut self, name: &str, value: f32, step: u64) {
        info!(target: "eegan::telemetry", scalar = name, value, step);
    }
}

/// In-memory sink; clones share the same record buffer
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Rc<RefCell<Vec<ScalarRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ScalarRecord> {
        self.records.borrow().clone()
    }

    /// `(step, value)` pairs recorded under `name`, in write order
    pub fn series(&self, name: &str) -> Vec<(u64, f32)> {
        self.records
            .borrow()
            .iter()
            .filter(|r| r.name == name)
            .map(|r| (r.step, r.value))
            .collect()
    }

    pub fn last(&self, name: &str) -> Option<f32> {
        self.series(name).last().map(|&(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl TelemetrySink for MemorySink {
    fn add_scalar(&mut self, name: &str, value: f32, step: u64) {
        self.records.borrow_mut().push(ScalarRecord { name: name.to_string(), value, step });
    }
}

/// Appends one JSON object per scalar to a file
pub struct JsonlSink {
    writer: BufWriter<File>,
}

impl JsonlSink {
    /// Start a fresh file, truncating any previous contents
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        Ok(Self { writer: BufWriter::new(file) })
    }

    /// Append to an existing file, creating it if needed
    pub fn append<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path.as_ref())?;
        Ok(Self { writer: BufWriter::new(file) })
    }
}

impl TelemetrySink for JsonlSink {
    fn add_scalar(&mut self, name: &str, value: f32, step: u64) {
        let record = ScalarRecord { name: name.to_string(), value, step };
        let written = serde_json::to_string(&record)
            .map_err(std::io::Error::other)
            .and_then(|line| writeln!(self.writer, "{line}"));
        if let Err(e) = written {
            warn!(scalar = name, step, "dropping telemetry record: {e}");
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.writer.flush() {
            warn!("failed to flush telemetry: {e}");
        }
    }
}

impl Drop for JsonlSink {
    fn drop(&mut self) {
        TelemetrySink::flush(self);
    }
}

/// Forwards writes only on the primary rank
pub struct RankGated<S> {
    inner: S,
    enabled: bool,
}

impl<S: TelemetrySink> RankGated<S> {
    pub fn new(inner: S, membership: Membership) -> Self {
        Self { inner, enabled: membership.is_primary() }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl<S: TelemetrySink> TelemetrySink for RankGated<S> {
    fn add_scalar(&mut self, name: &str, value: f32, step: u64) {
        if self.enabled {
            self.inner.add_scalar(name, value, step);
        }
    }

    fn flush(&mut self) {
        if self.enabled {
            self.inner.flush();
        }
    }
}
