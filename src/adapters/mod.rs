// Adapters layer: transfer engines behind the TransferEngine port.

pub mod memory;
pub mod s3;

pub use memory::InMemoryTransferEngine;
pub use s3::{S3TransferEngine, TransferTier};
