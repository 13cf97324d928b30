//! CLI error types.

use migrate_core::MigrationError;
use thiserror::Error;

/// Errors that end a command before any progress is streamed.
#[derive(Debug, Error)]
pub enum CliError {
    /// No migrations directory could be determined.
    #[error("Please specify path")]
    MissingPath,

    /// `create` was called without a migration name.
    #[error("Please specify name.")]
    MissingName,

    /// The `<n>` argument of `migrate` is not a signed integer.
    #[error("Unable to parse param <n>.")]
    InvalidOffset {
        /// The argument as given.
        value: String,
    },

    /// The `<v>` argument of `goto` is not a non-negative integer.
    #[error("Unable to parse param <v>.")]
    InvalidTargetVersion {
        /// The argument as given.
        value: String,
    },

    /// The distance between two versions does not fit an offset.
    #[error("cannot migrate from version {current} to {target}: offset out of range")]
    OffsetOutOfRange {
        /// Currently applied version.
        current: u64,
        /// Requested version.
        target: u64,
    },

    /// A synchronous engine call failed.
    #[error("{0}")]
    Engine(#[from] MigrationError),

    /// Writing output failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        1
    }
}
