use crate::domain::model::{ClientVariant, ObjectKey, TransferBuffer};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Single-shot completion notification carrying the transfer outcome.
pub type CompletionCallback = Box<dyn FnOnce(bool) + Send + 'static>;

pub type Task = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Scheduling facility that runs asynchronous continuations for the clients.
pub trait Executor: Send + Sync + Debug {
    fn spawn(&self, task: Task);
}

pub type SharedExecutor = Arc<dyn Executor>;

/// Operation set every object client variant provides.
///
/// Holders of `dyn ObjClient` never need to know which variant they hold.
pub trait ObjClient: Send + Sync + Debug {
    fn variant(&self) -> ClientVariant;

    /// Installs the executor used by operations issued after this call. Last call wins.
    fn set_executor(&self, executor: SharedExecutor);

    /// Uploads `buffer` to `key`. Returns immediately; `callback` fires exactly once.
    fn put_object_async(&self, key: &ObjectKey, buffer: &TransferBuffer, callback: CompletionCallback);

    /// Downloads `[buffer.offset(), buffer.offset() + buffer.len())` of `key` into `buffer`.
    fn get_object_async(&self, key: &ObjectKey, buffer: &TransferBuffer, callback: CompletionCallback);

    /// Blocks until the backend answers. Probe failures read as `false`.
    ///
    /// Must not be called from a task running on this client's executor: with a single
    /// threaded executor the check could never be scheduled.
    fn check_object_exists(&self, key: &ObjectKey) -> bool;
}

/// Data plane a client delegates to: the embedded SDK or a local stand-in.
#[async_trait]
pub trait TransferEngine: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    async fn put_object(&self, key: &str, data: Vec<u8>) -> Result<()>;

    async fn get_object(&self, key: &str, offset: u64, len: usize) -> Result<Vec<u8>>;

    /// `Ok(false)` only when the backend positively reports the object missing.
    async fn head_object(&self, key: &str) -> Result<bool>;
}
