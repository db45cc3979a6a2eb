//! Batch pipeline: per-file processing and outcome reporting.

mod report;
mod runner;

pub use report::{BatchSummary, ChunkOutcome, FileOutcome, FileReport};
pub use runner::Narrator;
