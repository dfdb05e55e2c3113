use crate::domain::ports::TransferEngine;
use crate::utils::error::{ObjError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Process-local object store, for local runs and tests.
#[derive(Debug, Default)]
pub struct InMemoryTransferEngine {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryTransferEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, data: Vec<u8>) {
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), data);
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TransferEngine for InMemoryTransferEngine {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn put_object(&self, key: &str, data: Vec<u8>) -> Result<()> {
        self.insert(key, data);
        Ok(())
    }

    async fn get_object(&self, key: &str, offset: u64, len: usize) -> Result<Vec<u8>> {
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        let data = objects.get(key).ok_or_else(|| ObjError::NotFound {
            key: key.to_string(),
        })?;

        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        if start >= data.len() {
            return Err(ObjError::transfer(format!(
                "range start {} is beyond the end of {} ({} bytes)",
                offset,
                key,
                data.len()
            )));
        }
        let end = start.saturating_add(len).min(data.len());
        Ok(data[start..end].to_vec())
    }

    async fn head_object(&self, key: &str) -> Result<bool> {
        Ok(self
            .objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key))
    }
}
