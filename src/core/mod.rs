pub mod client;
pub mod completion;
pub mod engine;
pub mod executor;
pub mod vendor;

pub use crate::domain::model::{ClientVariant, ObjectKey, TransferBuffer, VendorId};
pub use crate::domain::ports::{
    CompletionCallback, Executor, ObjClient, SharedExecutor, TransferEngine,
};
pub use crate::utils::error::Result;
