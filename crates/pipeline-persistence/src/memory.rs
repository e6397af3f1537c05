use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::debug;

use crate::store::{validate_bucket, validate_key};
use crate::{ObjectStore, PersistenceError};

/// Backend en memoria. `put_if_absent` es atómico por clave.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: DashMap<(String, String), Vec<u8>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn check(bucket: &str, key: &str) -> Result<(String, String), PersistenceError> {
        validate_bucket(bucket)?;
        validate_key(key)?;
        Ok((bucket.to_string(), key.to_string()))
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), PersistenceError> {
        let k = Self::check(bucket, key)?;
        debug!("memory put {bucket}/{key} ({} bytes)", bytes.len());
        self.objects.insert(k, bytes);
        Ok(())
    }

    async fn put_if_absent(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), PersistenceError> {
        let k = Self::check(bucket, key)?;
        match self.objects.entry(k) {
            Entry::Occupied(_) => Err(PersistenceError::AlreadyExists { bucket: bucket.to_string(),
                                                                        key: key.to_string() }),
            Entry::Vacant(v) => {
                debug!("memory put_if_absent {bucket}/{key} ({} bytes)", bytes.len());
                v.insert(bytes);
                Ok(())
            }
        }
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, PersistenceError> {
        let k = Self::check(bucket, key)?;
        self.objects
            .get(&k)
            .map(|v| v.value().clone())
            .ok_or_else(|| PersistenceError::NotFound { bucket: bucket.to_string(),
                                                        key: key.to_string() })
    }

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, PersistenceError> {
        let k = Self::check(bucket, key)?;
        Ok(self.objects.contains_key(&k))
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, PersistenceError> {
        validate_bucket(bucket)?;
        let mut keys: Vec<String> = self.objects
                                        .iter()
                                        .filter(|e| e.key().0 == bucket && e.key().1.starts_with(prefix))
                                        .map(|e| e.key().1.clone())
                                        .collect();
        keys.sort();
        Ok(keys)
    }
}
