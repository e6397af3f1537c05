//! Backend de archivos: cada objeto es `{root}/{bucket}/{key}`.
//!
//! Las escrituras se preparan en `{root}/.staging` y se publican de una vez
//! (rename para `put`, hard link para `put_if_absent`): una clave nunca queda
//! con contenido parcial. Ningún bucket puede empezar con `.`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::store::{validate_bucket, validate_key};
use crate::{ObjectStore, PersistenceError};

const STAGING_DIR: &str = ".staging";

#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, bucket: &str, key: &str) -> Result<PathBuf, PersistenceError> {
        validate_bucket(bucket)?;
        validate_key(key)?;
        let mut path = self.root.join(bucket);
        path.extend(key.split('/'));
        Ok(path)
    }

    /// Escribe `bytes` completos en un archivo temporal y devuelve su ruta.
    async fn stage(&self, bytes: &[u8]) -> Result<PathBuf, PersistenceError> {
        let dir = self.root.join(STAGING_DIR);
        tokio::fs::create_dir_all(&dir).await?;
        let tmp = dir.join(Uuid::new_v4().to_string());
        let written = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(bytes).await?;
            file.sync_all().await
        }.await;
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(tmp)
    }

    fn not_found(bucket: &str, key: &str) -> PersistenceError {
        PersistenceError::NotFound { bucket: bucket.to_string(),
                                     key: key.to_string() }
    }
}

async fn ensure_parent(path: &Path) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), PersistenceError> {
        let path = self.path_for(bucket, key)?;
        ensure_parent(&path).await?;
        debug!("fs put {}", path.display());
        let tmp = self.stage(&bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn put_if_absent(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), PersistenceError> {
        let path = self.path_for(bucket, key)?;
        ensure_parent(&path).await?;
        let tmp = self.stage(&bytes).await?;
        // El link falla si la clave ya existe: publicación atómica y única.
        let linked = tokio::fs::hard_link(&tmp, &path).await;
        let _ = tokio::fs::remove_file(&tmp).await;
        match linked {
            Ok(()) => {
                debug!("fs put_if_absent {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(PersistenceError::AlreadyExists { bucket: bucket.to_string(),
                                                      key: key.to_string() })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, PersistenceError> {
        let path = self.path_for(bucket, key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Self::not_found(bucket, key)),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, PersistenceError> {
        let path = self.path_for(bucket, key)?;
        Ok(tokio::fs::try_exists(&path).await? && !tokio::fs::metadata(&path).await?.is_dir())
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, PersistenceError> {
        validate_bucket(bucket)?;
        let base = self.root.join(bucket);
        let mut keys = Vec::new();
        let mut pending = vec![(base.clone(), String::new())];
        while let Some((dir, rel)) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(e) => e,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name().to_string_lossy().to_string();
                let key = if rel.is_empty() { name } else { format!("{rel}/{name}") };
                if entry.file_type().await?.is_dir() {
                    pending.push((entry.path(), key));
                } else if key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}
