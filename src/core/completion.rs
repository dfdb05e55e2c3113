use crate::domain::ports::CompletionCallback;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Holds a callback until the operation finishes.
///
/// Dropping the guard without completing reports failure, so the callback still fires exactly
/// once when a task is dropped by a shut-down runtime or unwinds from a panic.
pub(crate) struct CompletionGuard {
    callback: Option<CompletionCallback>,
}

impl CompletionGuard {
    pub(crate) fn new(callback: CompletionCallback) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    pub(crate) fn complete(mut self, success: bool) {
        if let Some(callback) = self.callback.take() {
            callback(success);
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback(false);
        }
    }
}

/// Future resolving to the outcome delivered through the paired callback.
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<bool>,
}

impl Future for Completion {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<bool> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|outcome| outcome.unwrap_or(false))
    }
}

/// Bridges the callback contract to a future.
pub fn completion_channel() -> (CompletionCallback, Completion) {
    let (tx, rx) = oneshot::channel();
    let callback: CompletionCallback = Box::new(move |success| {
        let _ = tx.send(success);
    });
    (callback, Completion { rx })
}
