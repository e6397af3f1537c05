//! Contrato del object store.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::PersistenceError;

/// Store de objetos direccionable por `(bucket, key)`.
///
/// `put` sobrescribe; `put_if_absent` es write-once y falla con
/// `AlreadyExists` si la clave ya existe.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug {
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), PersistenceError>;
    async fn put_if_absent(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), PersistenceError>;
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, PersistenceError>;
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, PersistenceError>;
    /// Claves del bucket que empiezan con `prefix`, en orden lexicográfico.
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, PersistenceError>;
}

/// Reglas de clave: no vacía, sin `/` inicial ni final, sin segmentos vacíos,
/// `.` o `..`, sin `\`.
pub fn validate_key(key: &str) -> Result<(), PersistenceError> {
    if key.is_empty() || key.contains('\\') {
        return Err(PersistenceError::InvalidKey(key.to_string()));
    }
    if key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
        return Err(PersistenceError::InvalidKey(key.to_string()));
    }
    Ok(())
}

pub(crate) fn validate_bucket(bucket: &str) -> Result<(), PersistenceError> {
    if bucket.is_empty() || bucket.contains('/') || bucket.contains('\\') || bucket.starts_with('.') {
        return Err(PersistenceError::InvalidKey(format!("bucket '{bucket}'")));
    }
    Ok(())
}

pub async fn put_json<T: Serialize + Sync>(store: &dyn ObjectStore,
                                           bucket: &str,
                                           key: &str,
                                           value: &T)
                                           -> Result<(), PersistenceError> {
    store.put(bucket, key, serde_json::to_vec(value)?).await
}

pub async fn put_json_if_absent<T: Serialize + Sync>(store: &dyn ObjectStore,
                                                     bucket: &str,
                                                     key: &str,
                                                     value: &T)
                                                     -> Result<(), PersistenceError> {
    store.put_if_absent(bucket, key, serde_json::to_vec(value)?).await
}

pub async fn get_json<T: DeserializeOwned>(store: &dyn ObjectStore, bucket: &str, key: &str) -> Result<T, PersistenceError> {
    let bytes = store.get(bucket, key).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
