use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::{ObjectStore, StorageError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Process-local object store for development and tests
pub struct MemoryObjectStore {
    public_prefix: String,
    objects: RwLock<HashMap<String, StoredObject>>,
    failing: AtomicBool,
}

impl MemoryObjectStore {
    pub fn new(public_prefix: impl Into<String>) -> Self {
        Self {
            public_prefix: public_prefix.into(),
            objects: RwLock::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every subsequent upload fail, simulating an outage
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn get(&self, path: &str) -> Option<StoredObject> {
        self.objects.read().await.get(path).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_public(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("simulated outage".to_string()));
        }
        let object = StoredObject {
            content_type: content_type.to_string(),
            bytes,
        };
        self.objects.write().await.insert(path.to_string(), object);
        Ok(format!("{}{}", self.public_prefix, path))
    }
}
