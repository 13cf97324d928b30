//! Engine lookup by URL scheme.
//!
//! The registry is itself a [`MigrationEngine`]: every call resolves the
//! engine registered for the scheme of `url` and delegates to it. Drivers are
//! plugged in by registering them; the CLI never names one.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::engine::{MigrationEngine, RelativeOffset, SharedEngine, StreamCommand};
use crate::error::MigrationError;
use crate::event::MigrationFiles;
use crate::pipe::ProgressSender;

/// Extract the lowercased scheme from a store URL (`postgres://...` → `postgres`).
pub fn url_scheme(url: &str) -> Result<String, MigrationError> {
    let invalid = |reason: &str| MigrationError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    if url.trim().is_empty() {
        return Err(invalid("url is empty"));
    }

    let (scheme, _) = url
        .split_once("://")
        .ok_or_else(|| invalid("expected <scheme>://..."))?;

    let valid = !scheme.is_empty()
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !valid {
        return Err(invalid("malformed scheme"));
    }

    Ok(scheme.to_ascii_lowercase())
}

/// Registry of engines keyed by URL scheme.
#[derive(Default)]
pub struct EngineRegistry {
    engines: HashMap<String, SharedEngine>,
}

impl EngineRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `engine` for `scheme`, returning any engine it replaces.
    pub fn register(
        &mut self,
        scheme: impl Into<String>,
        engine: SharedEngine,
    ) -> Option<SharedEngine> {
        let scheme = scheme.into().to_ascii_lowercase();
        debug!(scheme = %scheme, "registering migration engine");
        self.engines.insert(scheme, engine)
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_engine(mut self, scheme: impl Into<String>, engine: SharedEngine) -> Self {
        self.register(scheme, engine);
        self
    }

    /// Registered schemes, sorted.
    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.engines.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }

    /// Find the engine responsible for `url`.
    pub fn resolve(&self, url: &str) -> Result<&SharedEngine, MigrationError> {
        let scheme = url_scheme(url)?;
        self.engines
            .get(&scheme)
            .ok_or(MigrationError::UnsupportedScheme { scheme })
    }

    async fn stream(
        &self,
        command: StreamCommand,
        pipe: ProgressSender,
        url: &str,
        path: &Path,
    ) {
        match self.resolve(url) {
            Ok(engine) => command.run(engine.as_ref(), pipe, url, path).await,
            Err(err) => {
                warn!(command = %command, error = %err, "cannot resolve migration engine");
                if pipe.failure(err).await.is_err() {
                    debug!("reporter went away before the resolve failure was delivered");
                }
                pipe.close();
            }
        }
    }
}

impl fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("schemes", &self.schemes())
            .finish()
    }
}

#[async_trait]
impl MigrationEngine for EngineRegistry {
    async fn create(
        &self,
        url: &str,
        path: &Path,
        name: &str,
    ) -> Result<MigrationFiles, MigrationError> {
        self.resolve(url)?.create(url, path, name).await
    }

    async fn migrate(&self, pipe: ProgressSender, url: &str, path: &Path, offset: RelativeOffset) {
        self.stream(StreamCommand::Migrate(offset), pipe, url, path)
            .await
    }

    async fn up(&self, pipe: ProgressSender, url: &str, path: &Path) {
        self.stream(StreamCommand::Up, pipe, url, path).await
    }

    async fn down(&self, pipe: ProgressSender, url: &str, path: &Path) {
        self.stream(StreamCommand::Down, pipe, url, path).await
    }

    async fn redo(&self, pipe: ProgressSender, url: &str, path: &Path) {
        self.stream(StreamCommand::Redo, pipe, url, path).await
    }

    async fn reset(&self, pipe: ProgressSender, url: &str, path: &Path) {
        self.stream(StreamCommand::Reset, pipe, url, path).await
    }

    async fn version(&self, url: &str, path: &Path) -> Result<u64, MigrationError> {
        self.resolve(url)?.version(url, path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Direction, MigrationFile, ProgressEvent};
    use crate::pipe;
    use std::sync::Arc;

    /// Engine that reports which call reached it.
    struct NamedEngine(&'static str);

    #[async_trait]
    impl MigrationEngine for NamedEngine {
        async fn create(
            &self,
            _url: &str,
            path: &Path,
            name: &str,
        ) -> Result<MigrationFiles, MigrationError> {
            Ok(MigrationFiles {
                version: 7,
                up_file: MigrationFile::new(path, format!("7_{}.up.sql", name), 7, name, Direction::Up),
                down_file: MigrationFile::new(
                    path,
                    format!("7_{}.down.sql", name),
                    7,
                    name,
                    Direction::Down,
                ),
            })
        }

        async fn migrate(&self, pipe: ProgressSender, _url: &str, _path: &Path, offset: RelativeOffset) {
            let _ = pipe.message(format!("{} migrate {}", self.0, offset)).await;
        }

        async fn up(&self, pipe: ProgressSender, _url: &str, _path: &Path) {
            let _ = pipe.message(format!("{} up", self.0)).await;
        }

        async fn down(&self, pipe: ProgressSender, _url: &str, _path: &Path) {
            let _ = pipe.message(format!("{} down", self.0)).await;
        }

        async fn redo(&self, pipe: ProgressSender, _url: &str, _path: &Path) {
            let _ = pipe.message(format!("{} redo", self.0)).await;
        }

        async fn reset(&self, pipe: ProgressSender, _url: &str, _path: &Path) {
            let _ = pipe.message(format!("{} reset", self.0)).await;
        }

        async fn version(&self, _url: &str, _path: &Path) -> Result<u64, MigrationError> {
            Ok(42)
        }
    }

    fn registry() -> EngineRegistry {
        EngineRegistry::new()
            .with_engine("postgres", Arc::new(NamedEngine("pg")))
            .with_engine("SQLite3", Arc::new(NamedEngine("sqlite")))
    }

    async fn collect(mut rx: pipe::ProgressReceiver) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_url_scheme() {
        assert_eq!(url_scheme("postgres://localhost/db").unwrap(), "postgres");
        assert_eq!(url_scheme("SQLite3://file.db").unwrap(), "sqlite3");
        assert_eq!(url_scheme("cockroach+tls://h").unwrap(), "cockroach+tls");
        assert!(matches!(
            url_scheme(""),
            Err(MigrationError::InvalidUrl { .. })
        ));
        assert!(url_scheme("localhost:5432").is_err());
        assert!(url_scheme("://nothing").is_err());
        assert!(url_scheme("1pg://x").is_err());
    }

    #[test]
    fn test_schemes_are_sorted_and_lowercased() {
        let registry = registry();
        assert_eq!(registry.schemes(), vec!["postgres", "sqlite3"]);
        assert!(EngineRegistry::new().schemes().is_empty());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = registry();
        let previous = registry.register("postgres", Arc::new(NamedEngine("pg2")));
        assert!(previous.is_some());
        assert!(registry.register("mysql", Arc::new(NamedEngine("my"))).is_none());
    }

    #[tokio::test]
    async fn test_streaming_delegates_by_scheme() {
        let registry = registry();
        let path = Path::new("/migrations");

        let (tx, rx) = pipe::channel();
        let collector = tokio::spawn(collect(rx));
        registry.migrate(tx, "sqlite3://app.db", path, -2).await;
        let events = collector.await.unwrap();

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], ProgressEvent::Message(t) if t == "sqlite migrate -2"));
    }

    #[tokio::test]
    async fn test_unknown_scheme_streams_failure() {
        let registry = registry();

        let (tx, rx) = pipe::channel();
        let collector = tokio::spawn(collect(rx));
        registry.up(tx, "mongodb://localhost", Path::new("/m")).await;
        let events = collector.await.unwrap();

        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            ProgressEvent::Failure(MigrationError::UnsupportedScheme { scheme }) if scheme == "mongodb"
        ));
    }

    #[tokio::test]
    async fn test_sync_calls_delegate_or_fail() {
        let registry = registry();
        let path = Path::new("/m");

        assert_eq!(registry.version("postgres://h/db", path).await.unwrap(), 42);
        let files = registry.create("postgres://h/db", path, "init").await.unwrap();
        assert_eq!(files.up_file.file_name, "7_init.up.sql");
        assert_eq!(files.down_file.direction, Direction::Down);

        let err = registry.version("redis://h", path).await.unwrap_err();
        assert!(matches!(err, MigrationError::UnsupportedScheme { .. }));
        let err = registry.create("not a url", path, "init").await.unwrap_err();
        assert!(matches!(err, MigrationError::InvalidUrl { .. }));
    }
}
