//! Command-line arguments and the resolved command request.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::reporter::{OutputFormat, ReporterConfig};

/// Environment variable holding the target store URL.
pub const ENV_URL: &str = "MIGRATE_URL";

/// Environment variable holding the migrations directory.
pub const ENV_PATH: &str = "MIGRATE_PATH";

/// Command name used when the version flag is set.
pub const SHOW_VERSION_COMMAND: &str = "showversion";

/// Long flags that may also be spelled with a single dash (`-url=...`).
const LONG_FLAGS: &[&str] = &["url", "path", "version", "format", "no-color"];

/// Long flags that take a value, either inline (`-url=x`) or as the next
/// argument (`-url x`).
const VALUE_FLAGS: &[&str] = &["url", "path", "format"];

/// migrate - apply and revert schema migrations.
#[derive(Parser, Debug)]
#[command(name = "migrate")]
#[command(about = "Apply and revert schema migrations", long_about = None)]
pub struct Args {
    /// Target store URL
    #[arg(long, env = ENV_URL, default_value = "")]
    pub url: String,

    /// Migrations directory (defaults to the current directory)
    #[arg(long, env = ENV_PATH)]
    pub path: Option<PathBuf>,

    /// Show migrate version
    #[arg(long = "version")]
    pub show_version: bool,

    /// Progress output format
    #[arg(long, default_value = "text", value_enum)]
    pub format: OutputFormat,

    /// Disable coloured output
    #[arg(long)]
    pub no_color: bool,

    /// Command to run
    pub command: Option<String>,

    /// Command argument (<name>, <n> or <v>)
    #[arg(allow_negative_numbers = true)]
    pub argument: Option<String>,
}

impl Args {
    /// Parse process arguments, accepting single-dash long flags.
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Resolve the request for the dispatcher.
    pub fn into_request(self) -> CommandRequest {
        let name = if self.show_version {
            SHOW_VERSION_COMMAND.to_string()
        } else {
            self.command.unwrap_or_default()
        };

        CommandRequest {
            name,
            migrations_path: resolve_migrations_path(self.path),
            url: self.url,
            argument: self.argument.unwrap_or_default(),
        }
    }

    /// Reporter settings selected on the command line.
    pub fn reporter_config(&self) -> ReporterConfig {
        ReporterConfig::default()
            .with_format(self.format)
            .with_color(!self.no_color)
    }
}

/// Fully resolved inputs of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    /// Command name, e.g. `up`.
    pub name: String,
    /// Migrations directory. Empty only if it could not be determined.
    pub migrations_path: PathBuf,
    /// Target store URL, opaque to the CLI.
    pub url: String,
    /// Command argument, empty when absent.
    pub argument: String,
}

impl CommandRequest {
    /// Create a request for `name` with no argument.
    pub fn new(
        name: impl Into<String>,
        migrations_path: impl Into<PathBuf>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            migrations_path: migrations_path.into(),
            url: url.into(),
            argument: String::new(),
        }
    }

    /// Set the command argument.
    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.argument = argument.into();
        self
    }

    /// Check if a migrations directory is known.
    pub fn has_migrations_path(&self) -> bool {
        !self.migrations_path.as_os_str().is_empty()
    }
}

/// Use `path` if given and non-empty, otherwise the working directory.
///
/// Yields an empty path if the working directory cannot be read; the
/// dispatcher rejects that before touching the engine.
pub fn resolve_migrations_path(path: Option<PathBuf>) -> PathBuf {
    match path {
        Some(path) if !path.as_os_str().is_empty() => path,
        _ => std::env::current_dir().unwrap_or_default(),
    }
}

/// Rewrite `-url=x` style flags to `--url=x`.
///
/// Only known long flags are touched, and only before the first positional
/// argument, so `migrate -3` keeps its negative offset. The separate value of
/// a flag such as `-path /m` is not a positional.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut flags_done = false;
    let mut expects_value = false;
    let mut normalized = Vec::new();

    for (index, arg) in args.into_iter().enumerate() {
        let arg: OsString = arg.into();
        // The program name is never a flag.
        if index == 0 || flags_done {
            normalized.push(arg);
            continue;
        }
        if expects_value {
            expects_value = false;
            normalized.push(arg);
            continue;
        }

        let Some(text) = arg.to_str() else {
            normalized.push(arg);
            continue;
        };

        if text == "--" || !text.starts_with('-') {
            flags_done = true;
            normalized.push(arg);
            continue;
        }

        let flag = text.trim_start_matches('-');
        let name = flag.split_once('=').map_or(flag, |(name, _)| name);
        if LONG_FLAGS.contains(&name) {
            expects_value = VALUE_FLAGS.contains(&name) && !flag.contains('=');
            if !text.starts_with("--") {
                normalized.push(OsString::from(format!("-{}", text)));
                continue;
            }
        }
        normalized.push(arg);
    }

    normalized
}
