//! Command dispatch: one request, at most one streamed engine call.

use std::io::Write;
use std::sync::Arc;

use migrate_core::{
    pipe, MigrationError, ProgressEvent, RelativeOffset, SharedEngine, StreamCommand,
};
use tracing::{debug, info, warn};

use crate::config::{CommandRequest, SHOW_VERSION_COMMAND};
use crate::error::CliError;
use crate::reporter::{Reporter, ReporterConfig};
use crate::timer::Timer;
use crate::usage::write_usage;

/// Version string printed by `showversion`.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commands understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `create <name>`
    Create,
    /// `up`
    Up,
    /// `down`
    Down,
    /// `redo`
    Redo,
    /// `reset`
    Reset,
    /// `migrate <n>`
    Migrate,
    /// `goto <v>`
    Goto,
    /// `version`
    Version,
    /// `showversion` or the version flag
    ShowVersion,
    /// `help`
    Help,
}

impl Command {
    /// Look up a command by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "create" => Some(Command::Create),
            "up" => Some(Command::Up),
            "down" => Some(Command::Down),
            "redo" => Some(Command::Redo),
            "reset" => Some(Command::Reset),
            "migrate" => Some(Command::Migrate),
            "goto" => Some(Command::Goto),
            "version" => Some(Command::Version),
            SHOW_VERSION_COMMAND => Some(Command::ShowVersion),
            "help" => Some(Command::Help),
            _ => None,
        }
    }

    /// Whether the command needs a migrations directory.
    pub fn requires_path(&self) -> bool {
        !matches!(self, Command::ShowVersion | Command::Help)
    }
}

/// How a command ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionOutcome {
    /// `false` if any failure was reported.
    pub success: bool,
    /// Elapsed seconds, for commands that streamed progress.
    pub elapsed_seconds: Option<f64>,
}

impl ExecutionOutcome {
    /// A synchronous command that finished without error.
    pub fn completed() -> Self {
        Self {
            success: true,
            elapsed_seconds: None,
        }
    }

    /// Process exit code.
    pub fn exit_code(&self) -> u8 {
        if self.success {
            0
        } else {
            1
        }
    }
}

/// Parse the `<n>` argument of `migrate`.
pub fn parse_offset(argument: &str) -> Result<RelativeOffset, CliError> {
    argument
        .parse::<RelativeOffset>()
        .map_err(|_| CliError::InvalidOffset {
            value: argument.to_string(),
        })
}

/// Parse the `<v>` argument of `goto`. Negative versions are rejected;
/// `-0` is zero.
pub fn parse_target_version(argument: &str) -> Result<u64, CliError> {
    argument
        .parse::<i64>()
        .ok()
        .and_then(|version| u64::try_from(version).ok())
        .ok_or_else(|| CliError::InvalidTargetVersion {
            value: argument.to_string(),
        })
}

/// Offset that moves the store from `current` to `target`.
pub fn relative_offset(target: u64, current: u64) -> Result<RelativeOffset, CliError> {
    let offset = i128::from(target) - i128::from(current);
    RelativeOffset::try_from(offset).map_err(|_| CliError::OffsetOutOfRange { current, target })
}

/// Turns requests into engine calls and reports their progress.
pub struct Dispatcher {
    engine: SharedEngine,
    reporter: Reporter,
}

impl Dispatcher {
    /// Create a dispatcher for `engine`.
    pub fn new(engine: SharedEngine, config: &ReporterConfig) -> Self {
        Self::with_reporter(engine, Reporter::new(config))
    }

    /// Create a dispatcher with an existing reporter.
    pub fn with_reporter(engine: SharedEngine, reporter: Reporter) -> Self {
        Self { engine, reporter }
    }

    /// Run `request`, writing progress to `out` and usage text to `err`.
    ///
    /// Returns `Err` for problems found before any progress is streamed;
    /// nothing has been sent to the engine's streaming calls in that case.
    pub async fn dispatch<O: Write, E: Write>(
        &self,
        request: &CommandRequest,
        out: &mut O,
        err: &mut E,
    ) -> Result<ExecutionOutcome, CliError> {
        let Some(command) = Command::from_name(&request.name) else {
            debug!(command = %request.name, "unknown command, showing usage");
            write_usage(err)?;
            return Ok(ExecutionOutcome::completed());
        };

        if command.requires_path() && !request.has_migrations_path() {
            return Err(CliError::MissingPath);
        }

        debug!(
            command = %request.name,
            path = %request.migrations_path.display(),
            "dispatching command"
        );

        match command {
            Command::ShowVersion => {
                writeln!(out, "{}", TOOL_VERSION)?;
                Ok(ExecutionOutcome::completed())
            }
            Command::Help => {
                write_usage(err)?;
                Ok(ExecutionOutcome::completed())
            }
            Command::Create => self.create(request, out).await,
            Command::Version => {
                let version = self
                    .engine
                    .version(&request.url, &request.migrations_path)
                    .await?;
                writeln!(out, "{}", version)?;
                Ok(ExecutionOutcome::completed())
            }
            Command::Migrate => {
                let offset = parse_offset(&request.argument)?;
                Ok(self.stream(StreamCommand::Migrate(offset), request, out).await)
            }
            Command::Goto => {
                let offset = self.goto_offset(request).await?;
                Ok(self.stream(StreamCommand::Migrate(offset), request, out).await)
            }
            Command::Up => Ok(self.stream(StreamCommand::Up, request, out).await),
            Command::Down => Ok(self.stream(StreamCommand::Down, request, out).await),
            Command::Redo => Ok(self.stream(StreamCommand::Redo, request, out).await),
            Command::Reset => Ok(self.stream(StreamCommand::Reset, request, out).await),
        }
    }

    async fn create<O: Write>(
        &self,
        request: &CommandRequest,
        out: &mut O,
    ) -> Result<ExecutionOutcome, CliError> {
        let name = request.argument.as_str();
        if name.is_empty() {
            return Err(CliError::MissingName);
        }

        let files = self
            .engine
            .create(&request.url, &request.migrations_path, name)
            .await?;
        info!(version = files.version, migration = name, "created migration files");

        writeln!(
            out,
            "Version {} migration files created in {}:",
            files.version,
            request.migrations_path.display()
        )?;
        writeln!(out, "{}", files.up_file.file_name)?;
        writeln!(out, "{}", files.down_file.file_name)?;
        Ok(ExecutionOutcome::completed())
    }

    /// Resolve `goto <v>` into a relative offset from the applied version.
    async fn goto_offset(&self, request: &CommandRequest) -> Result<RelativeOffset, CliError> {
        let target = parse_target_version(&request.argument)?;
        let current = self
            .engine
            .version(&request.url, &request.migrations_path)
            .await?;
        let offset = relative_offset(target, current)?;
        debug!(
            target_version = target,
            current_version = current,
            offset,
            "resolved goto offset"
        );
        Ok(offset)
    }

    /// Spawn `command` on the engine and drain its progress into `out`.
    pub async fn stream<O: Write>(
        &self,
        command: StreamCommand,
        request: &CommandRequest,
        out: &mut O,
    ) -> ExecutionOutcome {
        let (tx, rx) = pipe::channel();
        let engine = Arc::clone(&self.engine);
        let url = request.url.clone();
        let path = request.migrations_path.clone();

        let timer = Timer::start();
        info!(command = %command, "starting migration task");
        let task = tokio::spawn(async move {
            command.run(engine.as_ref(), tx, &url, &path).await;
        });

        let mut summary = self.reporter.drain(rx, out).await;

        // The pipe closes when the task drops its sender, including on panic.
        if let Err(join_err) = task.await {
            warn!(command = %command, error = %join_err, "migration task ended abnormally");
            let failure = ProgressEvent::Failure(MigrationError::TaskFailed(join_err.to_string()));
            self.reporter.report(&failure, out, &mut summary);
        }

        let elapsed = timer.elapsed();
        self.reporter.report_elapsed(elapsed, out);
        info!(
            command = %command,
            success = summary.success,
            events = summary.events,
            failures = summary.failures,
            elapsed_secs = elapsed,
            "migration task finished"
        );

        ExecutionOutcome {
            success: summary.success,
            elapsed_seconds: Some(elapsed),
        }
    }
}
