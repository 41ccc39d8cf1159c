//! services/api/src/adapters/local_store.rs
//!
//! File-backed implementation of the `KeyValueStorage` port: one UTF-8 file
//! per key under a data directory. This is the service's stand-in for the
//! mobile app's on-device storage, holding the anonymous notes array, the
//! plan progress array and the versions cache.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use biblia_core::ports::{KeyValueStorage, PortError, PortResult};

pub struct JsonFileStorage {
    root: PathBuf,
}

impl JsonFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Keys contain `:` separators; flatten them into a safe file name.
    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
            .collect();
        self.root.join(format!("{name}.json"))
    }
}

fn storage_error(e: std::io::Error) -> PortError {
    PortError::Storage(e.to_string())
}

#[async_trait]
impl KeyValueStorage for JsonFileStorage {
    async fn get_item(&self, key: &str) -> PortResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error(e)),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> PortResult<()> {
        fs::create_dir_all(&self.root).await.map_err(storage_error)?;
        fs::write(self.path_for(key), value)
            .await
            .map_err(storage_error)
    }

    async fn remove_item(&self, key: &str) -> PortResult<()> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(e)),
        }
    }
}
