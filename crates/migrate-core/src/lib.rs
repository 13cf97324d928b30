//! migrate core - progress events, the progress pipe and the engine interface.
//!
//! An engine call that streams progress owns the sending half of a
//! [`pipe`](crate::pipe) and runs as its own task; the CLI drains the
//! receiving half and renders each [`ProgressEvent`] as it arrives.
//!
//! # Example
//!
//! ```ignore
//! use migrate_core::{pipe, MigrationEngine, ProgressEvent};
//!
//! let (tx, mut rx) = pipe::channel();
//! let task = tokio::spawn(async move { engine.up(tx, &url, &path).await });
//!
//! while let Some(event) = rx.recv().await {
//!     println!("{:?}", event);
//! }
//! task.await?;
//! ```

pub mod engine;
pub mod error;
pub mod event;
pub mod pipe;
pub mod registry;

pub use engine::{MigrationEngine, RelativeOffset, SharedEngine, StreamCommand};
pub use error::MigrationError;
pub use event::{Direction, MigrationFile, MigrationFiles, ProgressEvent};
pub use pipe::{PipeClosed, ProgressReceiver, ProgressSender};
pub use registry::{url_scheme, EngineRegistry};
