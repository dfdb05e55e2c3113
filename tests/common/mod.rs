#![allow(dead_code)]

use async_trait::async_trait;
use obj_accel::{
    completion_channel, Completion, CompletionCallback, Executor, ObjError, Result,
    SharedExecutor, TokioExecutor, TransferEngine,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Engine that rejects every request, like a backend denying access.
#[derive(Debug, Default)]
pub struct FailingEngine;

#[async_trait]
impl TransferEngine for FailingEngine {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn put_object(&self, key: &str, _data: Vec<u8>) -> Result<()> {
        Err(ObjError::transfer(format!("access denied for {}", key)))
    }

    async fn get_object(&self, key: &str, _offset: u64, _len: usize) -> Result<Vec<u8>> {
        Err(ObjError::transfer(format!("access denied for {}", key)))
    }

    async fn head_object(&self, _key: &str) -> Result<bool> {
        Err(ObjError::transfer("connection refused"))
    }
}

/// Engine that accepts everything after a per-call delay, so completions interleave.
#[derive(Debug, Default)]
pub struct JitterEngine {
    calls: AtomicUsize,
}

#[async_trait]
impl TransferEngine for JitterEngine {
    fn name(&self) -> &'static str {
        "jitter"
    }

    async fn put_object(&self, _key: &str, _data: Vec<u8>) -> Result<()> {
        self.pause().await;
        Ok(())
    }

    async fn get_object(&self, _key: &str, _offset: u64, len: usize) -> Result<Vec<u8>> {
        self.pause().await;
        Ok(vec![0xAB; len])
    }

    async fn head_object(&self, _key: &str) -> Result<bool> {
        Ok(true)
    }
}

impl JitterEngine {
    async fn pause(&self) {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        // Later calls finish first.
        let delay = 20u64.saturating_sub((n % 10) as u64 * 2);
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}

/// Tokio executor that counts how many tasks it scheduled.
#[derive(Debug)]
pub struct CountingExecutor {
    inner: TokioExecutor,
    pub spawned: AtomicUsize,
}

impl CountingExecutor {
    pub fn current() -> Arc<Self> {
        Arc::new(Self {
            inner: TokioExecutor::current().unwrap(),
            spawned: AtomicUsize::new(0),
        })
    }

    pub fn count(&self) -> usize {
        self.spawned.load(Ordering::SeqCst)
    }
}

impl Executor for CountingExecutor {
    fn spawn(&self, task: obj_accel::domain::ports::Task) {
        self.spawned.fetch_add(1, Ordering::SeqCst);
        self.inner.spawn(task);
    }
}

pub fn current_executor() -> SharedExecutor {
    Arc::new(TokioExecutor::current().unwrap())
}

/// Callback that bumps `counter` on every invocation before resolving the completion.
pub fn counted(counter: &Arc<AtomicUsize>) -> (CompletionCallback, Completion) {
    let (callback, completion) = completion_channel();
    let counter = counter.clone();
    let callback: CompletionCallback = Box::new(move |success| {
        counter.fetch_add(1, Ordering::SeqCst);
        callback(success);
    });
    (callback, completion)
}
