//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `RunCheckpoint`: the durable `(category, item)` cursor of an unfinished run
//! - `ResumePoint`: where the next run starts, derived from a checkpoint
//! - `RunSummary`: per-run counters returned to the caller

mod checkpoint;
mod run_summary;

// Re-export main types
pub use checkpoint::{ResumePoint, RunCheckpoint};
pub use run_summary::{RunOutcome, RunSummary};
