use crate::config::{ClientParams, USE_VIRTUAL_ADDRESSING};
use crate::core::client::AcceleratedClient;
use crate::domain::model::{ClientVariant, ObjectKey, TransferBuffer, VendorId};
use crate::domain::ports::{CompletionCallback, ObjClient, SharedExecutor, TransferEngine};
use crate::utils::error::Result;
use std::sync::Arc;
use tracing::info;

/// Vendor-tuned accelerated client.
///
/// Vendor setup happens once, on the parameters, before the accelerated client is built.
/// Every operation is the accelerated one, unchanged.
#[derive(Debug)]
pub struct VendorClient {
    vendor: VendorId,
    inner: AcceleratedClient,
}

impl VendorClient {
    pub fn new(
        vendor: VendorId,
        params: &ClientParams,
        executor: Option<SharedExecutor>,
    ) -> Result<Self> {
        let params = apply_vendor_profile(vendor, params);
        let inner = AcceleratedClient::new(&params, executor)?;
        info!(vendor = %vendor, "initialized vendor object client");
        Ok(Self { vendor, inner })
    }

    pub fn with_engine(
        vendor: VendorId,
        engine: Arc<dyn TransferEngine>,
        executor: SharedExecutor,
    ) -> Self {
        Self {
            vendor,
            inner: AcceleratedClient::with_engine(engine, executor),
        }
    }

    pub fn vendor(&self) -> VendorId {
        self.vendor
    }

    pub fn engine(&self) -> &Arc<dyn TransferEngine> {
        self.inner.engine()
    }
}

/// Vendor endpoint conventions. Explicit parameters always win over vendor defaults.
pub fn apply_vendor_profile(vendor: VendorId, params: &ClientParams) -> ClientParams {
    let mut params = params.clone();
    match vendor {
        // ObjectScale serves buckets path-style unless DNS is set up for virtual hosts.
        VendorId::DellObs => {
            if !params.contains(USE_VIRTUAL_ADDRESSING) {
                params.set(USE_VIRTUAL_ADDRESSING, "false");
            }
        }
    }
    params
}

impl ObjClient for VendorClient {
    fn variant(&self) -> ClientVariant {
        ClientVariant::Vendor(self.vendor)
    }

    fn set_executor(&self, executor: SharedExecutor) {
        self.inner.set_executor(executor);
    }

    fn put_object_async(&self, key: &ObjectKey, buffer: &TransferBuffer, callback: CompletionCallback) {
        self.inner.put_object_async(key, buffer, callback);
    }

    fn get_object_async(&self, key: &ObjectKey, buffer: &TransferBuffer, callback: CompletionCallback) {
        self.inner.get_object_async(key, buffer, callback);
    }

    fn check_object_exists(&self, key: &ObjectKey) -> bool {
        self.inner.check_object_exists(key)
    }
}
