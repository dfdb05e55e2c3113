use crate::utils::error::{ObjError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Name of one stored object. Opaque to the clients; only required to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(Arc<str>);

impl ObjectKey {
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(ObjError::invalid_argument("object key cannot be empty"));
        }
        Ok(Self(Arc::from(key)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for ObjectKey {
    type Error = ObjError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for ObjectKey {
    type Error = ObjError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

/// Caller-owned memory shared with in-flight transfers.
pub type MemoryRegion = Arc<Mutex<Vec<u8>>>;

/// The first `len` bytes of `region`, transferred to or from the object starting at `offset`.
///
/// The region stays alive for as long as any clone of the buffer (including one held by an
/// in-flight operation) exists, so the caller cannot free it before the callback fires.
#[derive(Debug, Clone)]
pub struct TransferBuffer {
    region: MemoryRegion,
    len: usize,
    offset: u64,
    filled: Arc<AtomicUsize>,
}

impl TransferBuffer {
    pub fn new(region: MemoryRegion, len: usize, offset: u64) -> Result<Self> {
        if len == 0 {
            return Err(ObjError::invalid_argument(
                "transfer buffer length must be greater than zero",
            ));
        }
        let capacity = region.lock().unwrap_or_else(PoisonError::into_inner).len();
        if len > capacity {
            return Err(ObjError::invalid_argument(format!(
                "transfer length {} exceeds region size {}",
                len, capacity
            )));
        }
        Ok(Self {
            region,
            len,
            offset,
            filled: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Wraps `data` as a put source covering all of it.
    pub fn from_vec(data: Vec<u8>, offset: u64) -> Result<Self> {
        let len = data.len();
        Self::new(Arc::new(Mutex::new(data)), len, offset)
    }

    /// Allocates a zero-filled get destination of `len` bytes.
    pub fn zeroed(len: usize, offset: u64) -> Result<Self> {
        Self::new(Arc::new(Mutex::new(vec![0; len])), len, offset)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: construction rejects zero-length buffers.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn region(&self) -> &MemoryRegion {
        &self.region
    }

    /// Copies out the `len` bytes covered by this buffer.
    pub fn snapshot(&self) -> Vec<u8> {
        let region = self.region.lock().unwrap_or_else(PoisonError::into_inner);
        region[..self.len.min(region.len())].to_vec()
    }

    /// Writes `data` into the front of the region, capped at `len`. Returns the bytes written.
    pub fn fill(&self, data: &[u8]) -> usize {
        let mut region = self.region.lock().unwrap_or_else(PoisonError::into_inner);
        let count = data.len().min(self.len).min(region.len());
        region[..count].copy_from_slice(&data[..count]);
        self.filled.store(count, Ordering::Release);
        count
    }

    /// Bytes written by the last fill, seen by every clone. Less than `len` after a short read.
    pub fn filled(&self) -> usize {
        self.filled.load(Ordering::Acquire)
    }

    /// Copies out the bytes written by the last fill.
    pub fn filled_bytes(&self) -> Vec<u8> {
        let region = self.region.lock().unwrap_or_else(PoisonError::into_inner);
        region[..self.filled().min(region.len())].to_vec()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorId {
    /// Dell ObjectScale.
    DellObs,
}

impl VendorId {
    pub fn as_str(&self) -> &'static str {
        match self {
            VendorId::DellObs => "dell",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dell" | "dell_obs" | "dell-obs" | "objectscale" => Some(VendorId::DellObs),
            _ => None,
        }
    }
}

impl fmt::Display for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transfer tier of a client. Vendor refines Accelerated, which refines Standard's contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientVariant {
    Standard,
    Accelerated,
    Vendor(VendorId),
}

impl ClientVariant {
    pub fn is_accelerated(&self) -> bool {
        !matches!(self, ClientVariant::Standard)
    }

    pub fn vendor(&self) -> Option<VendorId> {
        match self {
            ClientVariant::Vendor(vendor) => Some(*vendor),
            _ => None,
        }
    }
}

impl fmt::Display for ClientVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientVariant::Standard => f.write_str("standard"),
            ClientVariant::Accelerated => f.write_str("accelerated"),
            ClientVariant::Vendor(vendor) => write!(f, "accelerated:{}", vendor),
        }
    }
}
