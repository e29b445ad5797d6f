use std::io;

use thiserror::Error;

/// Errors reported by the ingestion controller
#[derive(Debug, Error)]
pub enum IngestError {
    /// A source process is already attached to this controller
    #[error("ingestion already running")]
    AlreadyRunning,

    /// The source process could not be spawned
    #[error("ingestion start failed: {cause}")]
    StartFailed {
        #[source]
        cause: io::Error,
    },
}

/// Invalid session settings
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("buffer capacity must be at least 1")]
    ZeroCapacity,

    #[error("display limit must be at least 1")]
    ZeroDisplayLimit,
}
