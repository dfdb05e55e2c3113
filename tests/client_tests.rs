mod common;

use common::{counted, current_executor, CountingExecutor, FailingEngine, JitterEngine};
use obj_accel::{
    completion_channel, AcceleratedClient, ClientParams, ClientVariant, InMemoryTransferEngine,
    ObjClient, ObjError, ObjectKey, SharedExecutor, StandardClient, TransferBuffer, VendorClient,
    VendorId,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn key(name: &str) -> ObjectKey {
    ObjectKey::new(name).unwrap()
}

fn aws_params() -> ClientParams {
    ClientParams::new()
        .with_option("bucket", "test-bucket")
        .with_option("access_key", "AKIAEXAMPLE")
        .with_option("secret_key", "secret")
        .with_option("endpoint_override", "http://127.0.0.1:1")
        .with_option("accelerated", "true")
}

#[tokio::test]
async fn test_put_success_invokes_callback_once_with_true() {
    let engine = Arc::new(InMemoryTransferEngine::new());
    let client = AcceleratedClient::with_engine(engine.clone(), current_executor());
    let calls = Arc::new(AtomicUsize::new(0));

    let buffer = TransferBuffer::from_vec(vec![7u8; 1024], 0).unwrap();
    let (callback, done) = counted(&calls);
    client.put_object_async(&key("k1"), &buffer, callback);

    assert!(done.await);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(engine.object("k1").map(|data| data.len()), Some(1024));
}

#[tokio::test]
async fn test_put_failure_invokes_callback_once_with_false() {
    let client = AcceleratedClient::with_engine(Arc::new(FailingEngine), current_executor());
    let calls = Arc::new(AtomicUsize::new(0));

    let buffer = TransferBuffer::from_vec(vec![7u8; 1024], 0).unwrap();
    let (callback, done) = counted(&calls);
    client.put_object_async(&key("k1"), &buffer, callback);

    assert!(!done.await);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_interleaved_operations_each_complete_exactly_once() {
    let client = Arc::new(StandardClient::with_engine(
        Arc::new(JitterEngine::default()),
        current_executor(),
    ));
    let calls = Arc::new(AtomicUsize::new(0));
    let mut pending = Vec::new();

    for i in 0..40 {
        let buffer = TransferBuffer::zeroed(64, 0).unwrap();
        let (callback, done) = counted(&calls);
        let name = format!("obj-{}", i);
        if i % 2 == 0 {
            client.put_object_async(&key(&name), &buffer, callback);
        } else {
            client.get_object_async(&key(&name), &buffer, callback);
        }
        pending.push(done);
    }

    for done in pending {
        assert!(done.await);
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 40);
}

#[tokio::test]
async fn test_set_executor_applies_to_later_operations() {
    let engine = Arc::new(InMemoryTransferEngine::new());
    let first = CountingExecutor::current();
    let client = StandardClient::with_engine(engine, first.clone());

    let buffer = TransferBuffer::from_vec(b"abc".to_vec(), 0).unwrap();
    let (callback, done) = completion_channel();
    client.put_object_async(&key("a"), &buffer, callback);
    assert!(done.await);

    let second = CountingExecutor::current();
    client.set_executor(second.clone());
    for name in ["b", "c"] {
        let (callback, done) = completion_channel();
        client.put_object_async(&key(name), &buffer, callback);
        assert!(done.await);
    }

    assert_eq!(first.count(), 1);
    assert_eq!(second.count(), 2);
}

#[test]
fn test_accelerated_without_executor_outside_runtime_fails() {
    let result = AcceleratedClient::new(&aws_params(), None);
    assert!(matches!(result, Err(ObjError::NoExecutor { .. })));
}

#[tokio::test]
async fn test_accelerated_without_executor_uses_current_runtime() {
    let client = AcceleratedClient::new(&aws_params(), None).unwrap();
    assert_eq!(client.variant(), ClientVariant::Accelerated);
    assert_eq!(client.engine().name(), "s3-accel");

    // The client accepts work; the in-memory engine stands in for the network here.
    let local = AcceleratedClient::with_engine(
        Arc::new(InMemoryTransferEngine::new()),
        obj_accel::resolve_executor(None).unwrap(),
    );
    let buffer = TransferBuffer::from_vec(vec![1; 8], 0).unwrap();
    let (callback, done) = completion_channel();
    local.put_object_async(&key("k"), &buffer, callback);
    assert!(done.await);
}

#[tokio::test]
async fn test_vendor_client_construction_carries_identity() {
    let client = VendorClient::new(VendorId::DellObs, &aws_params(), None).unwrap();
    assert_eq!(client.variant(), ClientVariant::Vendor(VendorId::DellObs));
    assert_eq!(client.vendor(), VendorId::DellObs);
    assert_eq!(client.engine().name(), "s3-accel");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_vendor_matches_accelerated_behaviour() {
    let executor: SharedExecutor = current_executor();
    let accel_engine = Arc::new(InMemoryTransferEngine::new());
    let vendor_engine = Arc::new(InMemoryTransferEngine::new());
    for engine in [&accel_engine, &vendor_engine] {
        engine.insert("present", b"payload".to_vec());
    }

    let accelerated: Arc<dyn ObjClient> =
        Arc::new(AcceleratedClient::with_engine(accel_engine, executor.clone()));
    let vendor: Arc<dyn ObjClient> = Arc::new(VendorClient::with_engine(
        VendorId::DellObs,
        vendor_engine,
        executor.clone(),
    ));

    for client in [accelerated.clone(), vendor.clone()] {
        let buffer = TransferBuffer::from_vec(vec![9; 32], 0).unwrap();
        let (callback, done) = completion_channel();
        client.put_object_async(&key("new"), &buffer, callback);
        assert!(done.await);

        let rejected = TransferBuffer::from_vec(vec![9; 32], 4).unwrap();
        let (callback, done) = completion_channel();
        client.put_object_async(&key("new"), &rejected, callback);
        assert!(!done.await);
    }

    for name in ["present", "new", "absent"] {
        let a = accelerated.clone();
        let v = vendor.clone();
        let target = key(name);
        let (from_accel, from_vendor) = tokio::task::spawn_blocking(move || {
            (a.check_object_exists(&target), v.check_object_exists(&target))
        })
        .await
        .unwrap();
        assert_eq!(from_accel, from_vendor, "mismatch for {}", name);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_exists_engine_failure_reads_as_absent() {
    let client = Arc::new(StandardClient::with_engine(
        Arc::new(FailingEngine),
        current_executor(),
    ));
    let found = tokio::task::spawn_blocking(move || client.check_object_exists(&key("k1")))
        .await
        .unwrap();
    assert!(!found);
}

#[test]
fn test_exists_from_plain_thread_with_runtime_executor() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let executor: SharedExecutor =
        Arc::new(obj_accel::TokioExecutor::new(runtime.handle().clone()));
    let engine = Arc::new(InMemoryTransferEngine::new());
    engine.insert("k1", vec![1]);
    let client = StandardClient::with_engine(engine, executor);

    assert!(client.check_object_exists(&key("k1")));
    assert!(!client.check_object_exists(&key("k2")));
}

#[tokio::test]
async fn test_get_reads_requested_range() {
    let engine = Arc::new(InMemoryTransferEngine::new());
    engine.insert("k1", (0u8..100).collect());
    let client = StandardClient::with_engine(engine, current_executor());

    let buffer = TransferBuffer::zeroed(10, 50).unwrap();
    let (callback, done) = completion_channel();
    client.get_object_async(&key("k1"), &buffer, callback);
    assert!(done.await);
    assert_eq!(buffer.snapshot(), (50u8..60).collect::<Vec<_>>());

    let missing = TransferBuffer::zeroed(10, 0).unwrap();
    let (callback, done) = completion_channel();
    client.get_object_async(&key("nope"), &missing, callback);
    assert!(!done.await);
}

#[tokio::test]
async fn test_short_read_reports_filled_prefix() {
    let engine = Arc::new(InMemoryTransferEngine::new());
    engine.insert("k1", (0u8..100).collect());
    let client = StandardClient::with_engine(engine, current_executor());

    let buffer = TransferBuffer::zeroed(10, 95).unwrap();
    let (callback, done) = completion_channel();
    client.get_object_async(&key("k1"), &buffer, callback);

    assert!(done.await);
    assert_eq!(buffer.filled(), 5);
    assert_eq!(buffer.filled_bytes(), (95u8..100).collect::<Vec<_>>());
}
