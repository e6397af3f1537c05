//! pipeline-persistence
//!
//! Object store direccionable por `(bucket, key)` donde viven los datasets,
//! el modelo serializado y el score del champion.
//!
//! Módulos:
//! - `store`: contrato `ObjectStore` y validación de claves.
//! - `memory`: backend en memoria (DashMap), seguro entre ejecuciones concurrentes.
//! - `fs`: backend sobre el sistema de archivos (`{root}/{bucket}/{key}`).
//! - `config`: selección de backend desde .env / variables de entorno.

pub mod config;
pub mod error;
pub mod fs;
pub mod memory;
pub mod store;

pub use config::{build_store, init_dotenv, StoreBackend, StoreConfig};
pub use error::PersistenceError;
pub use fs::FsObjectStore;
pub use memory::InMemoryObjectStore;
pub use store::{get_json, put_json, put_json_if_absent, validate_key, ObjectStore};
