//! Engine error types.

use thiserror::Error;

/// Errors raised by a migration engine.
///
/// While a command streams, these travel as `ProgressEvent::Failure` and do
/// not end the stream. Synchronous engine calls (`create`, `version`) return
/// them directly.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The target URL could not be parsed.
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl {
        /// The URL as given.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No engine is registered for the URL scheme.
    #[error("no migration engine registered for scheme '{scheme}'")]
    UnsupportedScheme {
        /// The scheme taken from the URL.
        scheme: String,
    },

    /// The underlying driver reported an error.
    #[error("driver error: {0}")]
    Driver(String),

    /// A migration file could not be read or applied.
    #[error("migration {version} ({file_name}) failed: {reason}")]
    Step {
        /// Version of the failing migration.
        version: u64,
        /// File name of the failing migration.
        file_name: String,
        /// Why it failed.
        reason: String,
    },

    /// The applied version could not be determined.
    #[error("unable to read current version: {0}")]
    Version(String),

    /// The engine task ended abnormally.
    #[error("migration task failed: {0}")]
    TaskFailed(String),
}
