//! Error types for the batch runner binary.

use legaltime_boundaries::BoundaryError;
use legaltime_resolve::ResolveError;

use crate::config::ConfigError;

/// Errors that abort the batch run (as opposed to per-event failures,
/// which are isolated and reported inline).
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// Reference data could not be loaded.
    #[error(transparent)]
    Boundary {
        /// The underlying boundary error.
        #[from]
        source: BoundaryError,
    },

    /// Override tables could not be loaded.
    #[error(transparent)]
    Resolve {
        /// The underlying resolve error.
        #[from]
        source: ResolveError,
    },

    /// Event input or estimate output I/O failed.
    #[error("batch I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An output record could not be serialized.
    #[error("failed to serialize output record: {source}")]
    OutputSerialize {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
