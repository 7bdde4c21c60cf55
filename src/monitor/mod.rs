//! Training telemetry
//!
//! Scalars are reported as `(name, value, step)` triples through a
//! [`TelemetrySink`]. Writes are best-effort: a failing sink logs a warning
//! and training continues.

mod telemetry;

pub use telemetry::{JsonlSink, MemorySink, RankGated, ScalarRecord, TelemetrySink, TracingSink};
