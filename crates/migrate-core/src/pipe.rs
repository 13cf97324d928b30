//! The progress channel between an engine task and the reporter.
//!
//! A pipe has exactly one producer and one consumer. Neither half is
//! `Clone`: the sender moves into the spawned engine task, the receiver stays
//! with the reporter. Closing consumes the sender, so nothing can be sent
//! after completion has been signalled.

use thiserror::Error;
use tokio::sync::mpsc;

use crate::error::MigrationError;
use crate::event::{MigrationFile, ProgressEvent};

/// At most one event waits in the pipe; further sends suspend the producer.
pub const PIPE_CAPACITY: usize = 1;

/// Returned when the consumer is gone. Carries back the undelivered event.
#[derive(Debug, Error)]
#[error("progress pipe closed by the consumer")]
pub struct PipeClosed(pub ProgressEvent);

/// Create a new progress pipe.
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::channel(PIPE_CAPACITY);
    (ProgressSender { tx }, ProgressReceiver { rx })
}

/// Producing half of a progress pipe.
#[derive(Debug)]
pub struct ProgressSender {
    tx: mpsc::Sender<ProgressEvent>,
}

impl ProgressSender {
    /// Send an event, waiting until the consumer has room for it.
    pub async fn send(&self, event: impl Into<ProgressEvent>) -> Result<(), PipeClosed> {
        self.tx
            .send(event.into())
            .await
            .map_err(|mpsc::error::SendError(event)| PipeClosed(event))
    }

    /// Send an informational line.
    pub async fn message(&self, text: impl Into<String>) -> Result<(), PipeClosed> {
        self.send(ProgressEvent::Message(text.into())).await
    }

    /// Send an engine error. The stream stays open.
    pub async fn failure(&self, err: MigrationError) -> Result<(), PipeClosed> {
        self.send(ProgressEvent::Failure(err)).await
    }

    /// Report an applied or reverted migration file.
    pub async fn step(&self, file: MigrationFile) -> Result<(), PipeClosed> {
        self.send(ProgressEvent::MigrationStep(file)).await
    }

    /// Signal that no further events follow.
    ///
    /// Dropping the sender has the same effect.
    pub fn close(self) {
        drop(self);
    }
}

/// Consuming half of a progress pipe.
#[derive(Debug)]
pub struct ProgressReceiver {
    rx: mpsc::Receiver<ProgressEvent>,
}

impl ProgressReceiver {
    /// Wait for the next event.
    ///
    /// Returns `None` once the sender is closed and every event sent before
    /// that has been received.
    pub async fn recv(&mut self) -> Option<ProgressEvent> {
        self.rx.recv().await
    }
}
