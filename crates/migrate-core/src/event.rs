//! Progress events streamed from an engine to the reporter.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::MigrationError;

/// Whether a migration is applied or reverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Forward migration.
    Up,
    /// Rollback.
    Down,
}

impl Direction {
    /// Glyph printed in front of a migration step.
    pub fn glyph(&self) -> &'static str {
        match self {
            Direction::Up => ">",
            Direction::Down => "<",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// A single migration file, as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationFile {
    /// Directory holding the file.
    pub path: PathBuf,
    /// File name, e.g. `001_init.up.sql`.
    pub file_name: String,
    /// Migration version.
    pub version: u64,
    /// Human readable migration name, e.g. `init`.
    pub name: String,
    /// Which half of the migration this file is.
    pub direction: Direction,
}

impl MigrationFile {
    /// Create a new migration file description.
    pub fn new(
        path: impl Into<PathBuf>,
        file_name: impl Into<String>,
        version: u64,
        name: impl Into<String>,
        direction: Direction,
    ) -> Self {
        Self {
            path: path.into(),
            file_name: file_name.into(),
            version,
            name: name.into(),
            direction,
        }
    }
}

/// The pair of files produced by `create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationFiles {
    /// Version shared by both files.
    pub version: u64,
    /// The forward migration.
    pub up_file: MigrationFile,
    /// The rollback migration.
    pub down_file: MigrationFile,
}

/// An event emitted by an engine while a command runs.
pub enum ProgressEvent {
    /// Informational line.
    Message(String),
    /// An engine error. The stream continues after it.
    Failure(MigrationError),
    /// A migration file was applied or reverted.
    MigrationStep(MigrationFile),
    /// Any other payload, rendered through `Display`.
    Other(Box<dyn fmt::Display + Send + Sync>),
}

impl ProgressEvent {
    /// Create a message event.
    pub fn message(text: impl Into<String>) -> Self {
        ProgressEvent::Message(text.into())
    }

    /// Wrap an arbitrary displayable payload.
    pub fn other(payload: impl fmt::Display + Send + Sync + 'static) -> Self {
        ProgressEvent::Other(Box::new(payload))
    }

    /// Whether this event flips the outcome of the command to failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, ProgressEvent::Failure(_))
    }

    /// Short name of the event kind, used in logs and JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            ProgressEvent::Message(_) => "message",
            ProgressEvent::Failure(_) => "failure",
            ProgressEvent::MigrationStep(_) => "migration",
            ProgressEvent::Other(_) => "other",
        }
    }
}

impl fmt::Debug for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Message(text) => f.debug_tuple("Message").field(text).finish(),
            ProgressEvent::Failure(err) => f.debug_tuple("Failure").field(err).finish(),
            ProgressEvent::MigrationStep(file) => {
                f.debug_tuple("MigrationStep").field(file).finish()
            }
            ProgressEvent::Other(payload) => f
                .debug_tuple("Other")
                .field(&payload.to_string())
                .finish(),
        }
    }
}

impl From<String> for ProgressEvent {
    fn from(text: String) -> Self {
        ProgressEvent::Message(text)
    }
}

impl From<&str> for ProgressEvent {
    fn from(text: &str) -> Self {
        ProgressEvent::Message(text.to_string())
    }
}

impl From<MigrationError> for ProgressEvent {
    fn from(err: MigrationError) -> Self {
        ProgressEvent::Failure(err)
    }
}

impl From<MigrationFile> for ProgressEvent {
    fn from(file: MigrationFile) -> Self {
        ProgressEvent::MigrationStep(file)
    }
}
