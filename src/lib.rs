//! Pluggable object-storage clients with acceleration-tier selection.
//!
//! An [`ObjEngine`] owns a standard and/or an accelerated [`ObjClient`] and routes every
//! data-path operation through exactly one of them. Clients delegate to a
//! [`TransferEngine`](domain::ports::TransferEngine): `aws-sdk-s3` in production, an
//! in-memory store for local runs. [`utils::sdk_log`] bridges the SDK's diagnostics into the
//! host's log output.

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::{InMemoryTransferEngine, S3TransferEngine, TransferTier};
pub use config::ClientParams;
pub use core::client::{build_client, AcceleratedClient, StandardClient};
pub use core::completion::{completion_channel, Completion};
pub use core::engine::{select_active, ActivePreference, ActiveSlot, EngineClientSet, ObjEngine};
pub use core::executor::{resolve_executor, TokioExecutor};
pub use core::vendor::VendorClient;
pub use domain::model::{ClientVariant, MemoryRegion, ObjectKey, TransferBuffer, VendorId};
pub use domain::ports::{CompletionCallback, Executor, ObjClient, SharedExecutor, TransferEngine};
pub use utils::error::{ObjError, Result};
pub use utils::sdk_log::{LogThreshold, SdkLogBridge, SdkLogLayer, SdkLogLevel, SinkFormat};
