//! Selección del backend del object store desde variables de entorno.
//! `PIPELINE_STORE_BACKEND` (`memory` | `fs`, default `memory`) y
//! `PIPELINE_ARTIFACT_ROOT` (default `./artifacts`).

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

use crate::{FsObjectStore, InMemoryObjectStore, ObjectStore, PersistenceError};

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Fs,
}

impl FromStr for StoreBackend {
    type Err = PersistenceError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(StoreBackend::Memory),
            "fs" | "file" => Ok(StoreBackend::Fs),
            other => Err(PersistenceError::Config(format!("unknown store backend '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub root: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { backend: StoreBackend::Memory,
               root: PathBuf::from("./artifacts") }
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, PersistenceError> {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        let defaults = Self::default();
        let backend = match env::var("PIPELINE_STORE_BACKEND") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.backend,
        };
        let root = env::var("PIPELINE_ARTIFACT_ROOT").map(PathBuf::from).unwrap_or(defaults.root);
        Ok(Self { backend, root })
    }
}

/// Construye el backend configurado.
pub fn build_store(config: &StoreConfig) -> Arc<dyn ObjectStore> {
    match config.backend {
        StoreBackend::Memory => Arc::new(InMemoryObjectStore::new()),
        StoreBackend::Fs => Arc::new(FsObjectStore::new(config.root.clone())),
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names() {
        assert_eq!("fs".parse::<StoreBackend>().unwrap(), StoreBackend::Fs);
        assert_eq!(" Memory ".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!(matches!("s3".parse::<StoreBackend>(), Err(PersistenceError::Config(_))));
    }
}
