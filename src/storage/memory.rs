use super::ObjectStore;
use crate::StorageError;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

const DEFAULT_MAX_OBJECTS: usize = 1000;

type ObjectId = (String, String);

/// Process-local store for development, emptied when the process exits.
///
/// Holds at most `max_objects` objects; storing one more evicts the oldest.
pub struct MemoryStore {
    max_objects: usize,
    inner: Mutex<Objects>,
}

#[derive(Default)]
struct Objects {
    by_id: BTreeMap<ObjectId, Vec<u8>>,
    /// Insertion order, oldest first
    order: VecDeque<ObjectId>,
}

impl MemoryStore {
    pub fn with_capacity(max_objects: usize) -> Self {
        MemoryStore {
            max_objects: max_objects.max(1),
            inner: Mutex::new(Objects::default()),
        }
    }

    fn objects(&self) -> std::sync::MutexGuard<'_, Objects> {
        // A panic while holding the lock can't leave a map entry half-written
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::with_capacity(DEFAULT_MAX_OBJECTS)
    }
}

impl ObjectStore for MemoryStore {
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        log::info!("Stored {}/{} ({} bytes)", bucket, key, bytes.len());
        let id = (bucket.to_owned(), key.to_owned());
        let mut objects = self.objects();
        if objects.by_id.insert(id.clone(), bytes).is_none() {
            objects.order.push_back(id);
        }
        while objects.order.len() > self.max_objects {
            if let Some(oldest) = objects.order.pop_front() {
                log::info!("Evicted {}/{}", oldest.0, oldest.1);
                objects.by_id.remove(&oldest);
            }
        }
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        self.objects()
            .by_id
            .get(&(bucket.to_owned(), key.to_owned()))
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
            })
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .objects()
            .by_id
            .keys()
            .filter(|(b, k)| b == bucket && k.starts_with(prefix))
            .map(|(_, k)| k.clone())
            .collect())
    }
}
