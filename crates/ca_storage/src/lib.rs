use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use ca_core::{Error, Result, UpdateStorage};
use tracing::info;

pub mod backends;

pub use backends::*;

/// A storage implementation that can be opened by name from configuration.
#[async_trait]
pub trait StorageBackend: UpdateStorage + Sized + 'static {
    fn get_error_message() -> &'static str;

    async fn connect(url: Option<&str>) -> Result<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    SQLite,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Memory => f.write_str("memory"),
            StorageKind::SQLite => f.write_str("sqlite"),
        }
    }
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "sqlite" => Ok(StorageKind::SQLite),
            other => Err(Error::Config(format!(
                "Unknown storage backend '{}'. Available backends: memory, sqlite",
                other
            ))),
        }
    }
}

async fn open<T: StorageBackend>(url: Option<&str>) -> Result<Arc<dyn UpdateStorage>> {
    let storage = T::connect(url)
        .await
        .map_err(|e| Error::Storage(format!("{} ({})", T::get_error_message(), e)))?;
    Ok(Arc::new(storage))
}

pub async fn create_storage(kind: StorageKind, url: Option<&str>) -> Result<Arc<dyn UpdateStorage>> {
    info!(backend = %kind, "opening update storage");
    match kind {
        StorageKind::Memory => open::<InMemoryStorage>(url).await,
        #[cfg(feature = "sqlite")]
        StorageKind::SQLite => open::<SQLiteStorage>(url).await,
        #[cfg(not(feature = "sqlite"))]
        StorageKind::SQLite => Err(Error::Config(
            "SQLite storage requires the `sqlite` feature".to_string(),
        )),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageBackend, StorageKind};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_kind_parses_known_backends() {
        assert_eq!("memory".parse::<StorageKind>().unwrap(), StorageKind::Memory);
        assert_eq!("SQLite".parse::<StorageKind>().unwrap(), StorageKind::SQLite);
        assert!("qdrant".parse::<StorageKind>().is_err());
    }

    #[tokio::test]
    async fn create_storage_opens_memory_backend() {
        let storage = create_storage(StorageKind::Memory, None).await.unwrap();
        assert!(!storage.exists("https://unilag.edu.ng/news/1", None).await.unwrap());
    }
}
