//! migrate - apply and revert schema migrations from the command line.

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use migrate_cli::{Args, Dispatcher};
use migrate_core::EngineRegistry;

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "migrate_cli=warn,migrate_core=warn";

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so they never mix with progress on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse_normalized();
    let config = args.reporter_config();
    if !config.color {
        colored::control::set_override(false);
    }
    let request = args.into_request();

    let registry = EngineRegistry::new();
    tracing::debug!(schemes = ?registry.schemes(), "engine registry ready");
    let dispatcher = Dispatcher::new(Arc::new(registry), &config);

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    match dispatcher.dispatch(&request, &mut stdout, &mut stderr).await {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
