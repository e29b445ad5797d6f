//! Log processing for adbscope
//!
//! This crate provides the ingestion pipeline: line parsing, the bounded
//! buffer, filtering, the process-driven ingestion controller and the view
//! projection consumed by the UI.

mod buffer;
mod error;
mod filter;
mod ingest;
mod parser;
mod session;
mod view;

pub use buffer::{LogBuffer, SeverityCounts, Snapshot};
pub use error::{ConfigError, IngestError};
pub use filter::{FilterCriteria, FilterEngine, MIN_FILTER_CHARS};
pub use ingest::{DEFAULT_STOP_TIMEOUT, IngestState, IngestionController, StartOptions, StopOutcome};
pub use parser::LineParser;
pub use session::{IngestionSession, SessionConfig};
pub use view::{LogView, ViewProjector};

// Re-export types used in our public API
pub use adbscope_adb::{LogSource, LogcatArgs};
pub use adbscope_types::{ArcLogEntry, Channel, LogEntry, Severity};
