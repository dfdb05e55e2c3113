use crate::domain::ports::{Executor, SharedExecutor, Task};
use crate::utils::error::{ObjError, Result};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Runs continuations on a tokio runtime owned by the caller.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Captures the runtime the caller is running on.
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| ObjError::NoExecutor {
                message: format!("no executor supplied and no tokio runtime is running: {}", e),
            })
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl Executor for TokioExecutor {
    fn spawn(&self, task: Task) {
        // Dropping the JoinHandle detaches the task.
        drop(self.handle.spawn(task));
    }
}

/// Uses `executor` when given, otherwise the ambient tokio runtime.
///
/// Fails when neither exists, so a client never accepts work it cannot schedule.
pub fn resolve_executor(executor: Option<SharedExecutor>) -> Result<SharedExecutor> {
    match executor {
        Some(executor) => Ok(executor),
        None => Ok(Arc::new(TokioExecutor::current()?)),
    }
}
