//! migrate CLI library.
//!
//! Turns a command line into at most one streamed engine call and renders
//! the engine's progress as it arrives. The binary in `main.rs` wires this to
//! the process's stdout, stderr and exit code.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod reporter;
pub mod timer;
pub mod usage;

pub use config::{normalize_args, Args, CommandRequest};
pub use dispatcher::{Command, Dispatcher, ExecutionOutcome, TOOL_VERSION};
pub use error::CliError;
pub use reporter::{DrainSummary, OutputFormat, Renderer, Reporter, ReporterConfig};
pub use timer::{format_elapsed, Timer};
