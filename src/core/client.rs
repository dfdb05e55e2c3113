use crate::adapters::s3::{S3TransferEngine, TransferTier};
use crate::config::ClientParams;
use crate::core::completion::CompletionGuard;
use crate::core::executor::resolve_executor;
use crate::core::vendor::VendorClient;
use crate::domain::model::{ClientVariant, ObjectKey, TransferBuffer};
use crate::domain::ports::{CompletionCallback, ObjClient, SharedExecutor, TransferEngine};
use crate::utils::error::Result;
use std::fmt;
use std::sync::{mpsc, Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Submission logic shared by every variant. Each client owns its own core and engine handle.
pub(crate) struct ClientCore {
    engine: Arc<dyn TransferEngine>,
    executor: RwLock<SharedExecutor>,
}

impl fmt::Debug for ClientCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCore")
            .field("engine", &self.engine.name())
            .finish()
    }
}

impl ClientCore {
    pub(crate) fn new(engine: Arc<dyn TransferEngine>, executor: SharedExecutor) -> Self {
        Self {
            engine,
            executor: RwLock::new(executor),
        }
    }

    pub(crate) fn engine(&self) -> &Arc<dyn TransferEngine> {
        &self.engine
    }

    pub(crate) fn executor(&self) -> SharedExecutor {
        self.executor
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set_executor(&self, executor: SharedExecutor) {
        *self
            .executor
            .write()
            .unwrap_or_else(PoisonError::into_inner) = executor;
    }

    pub(crate) fn put(&self, key: &ObjectKey, buffer: &TransferBuffer, callback: CompletionCallback) {
        let guard = CompletionGuard::new(callback);
        if buffer.offset() != 0 {
            warn!(
                key = %key,
                offset = buffer.offset(),
                "put rejected: objects can only be written from offset 0"
            );
            guard.complete(false);
            return;
        }

        let data = buffer.snapshot();
        let engine = Arc::clone(&self.engine);
        let key = key.clone();
        debug!(key = %key, len = data.len(), engine = engine.name(), "submitting put");

        self.executor().spawn(Box::pin(async move {
            let success = match engine.put_object(key.as_str(), data).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(key = %key, error = %e, "put failed");
                    false
                }
            };
            guard.complete(success);
        }));
    }

    pub(crate) fn get(&self, key: &ObjectKey, buffer: &TransferBuffer, callback: CompletionCallback) {
        let guard = CompletionGuard::new(callback);
        let engine = Arc::clone(&self.engine);
        let key = key.clone();
        let buffer = buffer.clone();
        debug!(
            key = %key,
            offset = buffer.offset(),
            len = buffer.len(),
            engine = engine.name(),
            "submitting get"
        );

        self.executor().spawn(Box::pin(async move {
            let success = match engine
                .get_object(key.as_str(), buffer.offset(), buffer.len())
                .await
            {
                Ok(data) => {
                    let written = buffer.fill(&data);
                    debug!(key = %key, bytes = written, "get complete");
                    true
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "get failed");
                    false
                }
            };
            guard.complete(success);
        }));
    }

    pub(crate) fn exists(&self, key: &ObjectKey) -> bool {
        let (tx, rx) = mpsc::sync_channel(1);
        let engine = Arc::clone(&self.engine);
        let key = key.clone();

        self.executor().spawn(Box::pin(async move {
            let found = match engine.head_object(key.as_str()).await {
                Ok(found) => found,
                Err(e) => {
                    warn!(key = %key, error = %e, "existence check failed, reporting absent");
                    false
                }
            };
            let _ = tx.send(found);
        }));

        // A dropped task closes the channel, which also reads as absent.
        rx.recv().unwrap_or(false)
    }
}

/// Client on the SDK's conventional transfer path.
#[derive(Debug)]
pub struct StandardClient {
    core: ClientCore,
}

impl StandardClient {
    pub fn new(params: &ClientParams, executor: Option<SharedExecutor>) -> Result<Self> {
        let executor = resolve_executor(executor)?;
        let engine = S3TransferEngine::from_params(params, TransferTier::Standard)?;
        info!(
            bucket = engine.bucket(),
            "object storage client initialized with standard transfer engine"
        );
        Ok(Self::with_engine(Arc::new(engine), executor))
    }

    pub fn with_engine(engine: Arc<dyn TransferEngine>, executor: SharedExecutor) -> Self {
        Self {
            core: ClientCore::new(engine, executor),
        }
    }

    pub fn engine(&self) -> &Arc<dyn TransferEngine> {
        self.core.engine()
    }
}

impl ObjClient for StandardClient {
    fn variant(&self) -> ClientVariant {
        ClientVariant::Standard
    }

    fn set_executor(&self, executor: SharedExecutor) {
        self.core.set_executor(executor);
    }

    fn put_object_async(&self, key: &ObjectKey, buffer: &TransferBuffer, callback: CompletionCallback) {
        self.core.put(key, buffer, callback);
    }

    fn get_object_async(&self, key: &ObjectKey, buffer: &TransferBuffer, callback: CompletionCallback) {
        self.core.get(key, buffer, callback);
    }

    fn check_object_exists(&self, key: &ObjectKey) -> bool {
        self.core.exists(key)
    }
}

/// Client backed by the high-throughput transfer engine.
///
/// Built from the same parameters as [`StandardClient`] but owns a separate SDK handle.
/// Without an explicit executor it schedules on the tokio runtime that constructs it, and
/// construction fails outside of one.
#[derive(Debug)]
pub struct AcceleratedClient {
    core: ClientCore,
}

impl AcceleratedClient {
    pub fn new(params: &ClientParams, executor: Option<SharedExecutor>) -> Result<Self> {
        let executor = resolve_executor(executor)?;
        let engine = S3TransferEngine::from_params(params, TransferTier::Accelerated)?;
        info!(
            bucket = engine.bucket(),
            part_size = engine.part_size(),
            max_concurrency = engine.max_concurrency(),
            "object storage client initialized with accelerated transfer engine"
        );
        Ok(Self::with_engine(Arc::new(engine), executor))
    }

    pub fn with_engine(engine: Arc<dyn TransferEngine>, executor: SharedExecutor) -> Self {
        Self {
            core: ClientCore::new(engine, executor),
        }
    }

    pub fn engine(&self) -> &Arc<dyn TransferEngine> {
        self.core.engine()
    }
}

impl ObjClient for AcceleratedClient {
    fn variant(&self) -> ClientVariant {
        ClientVariant::Accelerated
    }

    fn set_executor(&self, executor: SharedExecutor) {
        self.core.set_executor(executor);
    }

    fn put_object_async(&self, key: &ObjectKey, buffer: &TransferBuffer, callback: CompletionCallback) {
        self.core.put(key, buffer, callback);
    }

    fn get_object_async(&self, key: &ObjectKey, buffer: &TransferBuffer, callback: CompletionCallback) {
        self.core.get(key, buffer, callback);
    }

    fn check_object_exists(&self, key: &ObjectKey) -> bool {
        self.core.exists(key)
    }
}

/// Constructs the client for `variant` from `params`.
pub fn build_client(
    variant: ClientVariant,
    params: &ClientParams,
    executor: Option<SharedExecutor>,
) -> Result<Arc<dyn ObjClient>> {
    let client: Arc<dyn ObjClient> = match variant {
        ClientVariant::Standard => Arc::new(StandardClient::new(params, executor)?),
        ClientVariant::Accelerated => Arc::new(AcceleratedClient::new(params, executor)?),
        ClientVariant::Vendor(vendor) => Arc::new(VendorClient::new(vendor, params, executor)?),
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryTransferEngine;
    use crate::core::completion::completion_channel;
    use crate::core::executor::TokioExecutor;
    use crate::utils::error::ObjError;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct BrokenEngine;

    #[async_trait]
    impl TransferEngine for BrokenEngine {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn put_object(&self, _key: &str, _data: Vec<u8>) -> Result<()> {
            Err(ObjError::transfer("access denied"))
        }

        async fn get_object(&self, _key: &str, _offset: u64, _len: usize) -> Result<Vec<u8>> {
            Err(ObjError::transfer("access denied"))
        }

        async fn head_object(&self, _key: &str) -> Result<bool> {
            Err(ObjError::transfer("connection refused"))
        }
    }

    fn key(name: &str) -> ObjectKey {
        ObjectKey::new(name).unwrap()
    }

    fn current_executor() -> SharedExecutor {
        Arc::new(TokioExecutor::current().unwrap())
    }

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let engine = Arc::new(InMemoryTransferEngine::new());
        let client = StandardClient::with_engine(engine.clone(), current_executor());

        let source = TransferBuffer::from_vec(b"hello object".to_vec(), 0).unwrap();
        let (callback, done) = completion_channel();
        client.put_object_async(&key("greeting"), &source, callback);
        assert!(done.await);
        assert_eq!(engine.object("greeting"), Some(b"hello object".to_vec()));

        let target = TransferBuffer::zeroed(6, 6).unwrap();
        let (callback, done) = completion_channel();
        client.get_object_async(&key("greeting"), &target, callback);
        assert!(done.await);
        assert_eq!(target.snapshot(), b"object".to_vec());
    }

    #[tokio::test]
    async fn test_put_with_offset_fails_at_submission() {
        let engine = Arc::new(InMemoryTransferEngine::new());
        let client = AcceleratedClient::with_engine(engine.clone(), current_executor());
        let source = TransferBuffer::from_vec(vec![1, 2, 3], 5).unwrap();

        let (callback, done) = completion_channel();
        client.put_object_async(&key("k"), &source, callback);
        assert!(!done.await);
        assert!(engine.is_empty());
    }

    #[tokio::test]
    async fn test_engine_errors_collapse_to_false() {
        let client = StandardClient::with_engine(Arc::new(BrokenEngine), current_executor());
        let buffer = TransferBuffer::zeroed(16, 0).unwrap();

        let (callback, done) = completion_channel();
        client.put_object_async(&key("k"), &buffer, callback);
        assert!(!done.await);

        let (callback, done) = completion_channel();
        client.get_object_async(&key("k"), &buffer, callback);
        assert!(!done.await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_exists_maps_engine_errors_to_absent() {
        let broken = Arc::new(StandardClient::with_engine(
            Arc::new(BrokenEngine),
            current_executor(),
        ));
        let found = tokio::task::spawn_blocking(move || broken.check_object_exists(&key("k")))
            .await
            .unwrap();
        assert!(!found);

        let engine = Arc::new(InMemoryTransferEngine::new());
        engine.insert("present", b"x".to_vec());
        let client = Arc::new(AcceleratedClient::with_engine(engine, current_executor()));
        let checker = client.clone();
        assert!(
            tokio::task::spawn_blocking(move || checker.check_object_exists(&key("present")))
                .await
                .unwrap()
        );
        assert!(
            !tokio::task::spawn_blocking(move || client.check_object_exists(&key("absent")))
                .await
                .unwrap()
        );
    }

    #[test]
    fn test_accelerated_without_runtime_fails_fast() {
        let params = ClientParams::new()
            .with_option("bucket", "test-bucket")
            .with_option("access_key", "AKIA")
            .with_option("secret_key", "secret");
        let result = AcceleratedClient::new(&params, None);
        assert!(matches!(result, Err(ObjError::NoExecutor { .. })));
    }

    #[test]
    fn test_build_client_propagates_config_errors() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let executor: SharedExecutor = Arc::new(TokioExecutor::new(runtime.handle().clone()));
        let result = build_client(
            ClientVariant::Accelerated,
            &ClientParams::new(),
            Some(executor),
        );
        assert!(matches!(result, Err(ObjError::MissingConfigError { .. })));
    }
}
