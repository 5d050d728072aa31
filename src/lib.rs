// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod daily;
pub mod ingest;
pub mod monitor;
pub mod publish;
pub mod summarize;

// ---- Re-exports for stable public API ----
pub use crate::config::{AccountRef, Config};
pub use crate::monitor::{run_monitor, MonitorOutcome};
pub use crate::publish::{publish, GitRunner, PublishOutcome};
pub use crate::summarize::{run_summarize, SummarizeOutcome};
