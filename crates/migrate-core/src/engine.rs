//! The interface a migration engine exposes to the CLI.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::MigrationError;
use crate::event::MigrationFiles;
use crate::pipe::ProgressSender;

/// Signed number of migrations to apply (positive) or revert (negative).
pub type RelativeOffset = i64;

/// A migration engine.
///
/// Streaming methods take ownership of the pipe, emit progress on it and
/// close it when they are done. Whether the engine keeps going after emitting
/// a failure is up to the engine; the reporter drains either way.
#[async_trait]
pub trait MigrationEngine: Send + Sync {
    /// Create a new pair of up/down migration files named `name`.
    async fn create(&self, url: &str, path: &Path, name: &str)
        -> Result<MigrationFiles, MigrationError>;

    /// Apply (`offset > 0`) or revert (`offset < 0`) `offset` migrations.
    async fn migrate(&self, pipe: ProgressSender, url: &str, path: &Path, offset: RelativeOffset);

    /// Apply all pending migrations.
    async fn up(&self, pipe: ProgressSender, url: &str, path: &Path);

    /// Revert all applied migrations.
    async fn down(&self, pipe: ProgressSender, url: &str, path: &Path);

    /// Revert the most recent migration, then apply it again.
    async fn redo(&self, pipe: ProgressSender, url: &str, path: &Path);

    /// Revert everything, then apply everything.
    async fn reset(&self, pipe: ProgressSender, url: &str, path: &Path);

    /// Currently applied version.
    async fn version(&self, url: &str, path: &Path) -> Result<u64, MigrationError>;
}

/// Engine shared between the dispatcher and its spawned task.
pub type SharedEngine = Arc<dyn MigrationEngine>;

/// One of the engine calls that streams progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamCommand {
    /// `up`
    Up,
    /// `down`
    Down,
    /// `redo`
    Redo,
    /// `reset`
    Reset,
    /// `migrate <n>`, also used by `goto <v>`.
    Migrate(RelativeOffset),
}

impl StreamCommand {
    /// Run this command against `engine`, handing it the pipe.
    pub async fn run(
        self,
        engine: &dyn MigrationEngine,
        pipe: ProgressSender,
        url: &str,
        path: &Path,
    ) {
        match self {
            StreamCommand::Up => engine.up(pipe, url, path).await,
            StreamCommand::Down => engine.down(pipe, url, path).await,
            StreamCommand::Redo => engine.redo(pipe, url, path).await,
            StreamCommand::Reset => engine.reset(pipe, url, path).await,
            StreamCommand::Migrate(offset) => engine.migrate(pipe, url, path, offset).await,
        }
    }
}

impl fmt::Display for StreamCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamCommand::Up => write!(f, "up"),
            StreamCommand::Down => write!(f, "down"),
            StreamCommand::Redo => write!(f, "redo"),
            StreamCommand::Reset => write!(f, "reset"),
            StreamCommand::Migrate(offset) => write!(f, "migrate {:+}", offset),
        }
    }
}
