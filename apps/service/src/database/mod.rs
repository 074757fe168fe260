/// Storage layer
///
/// Users, monitored websites and the global check history behind one
/// [`Storage`] trait, backed either by process memory or by a local libsql
/// database.
pub mod error;
pub mod locks;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod persistent;
pub mod repository;

use std::sync::Arc;

use tracing::info;

pub use error::{Result, StorageError};
pub use memory::MemoryStorage;
pub use models::{MonitoredWebsite, User, WebsiteStatus};
pub use persistent::LibsqlStorage;
pub use repository::Storage;

use crate::config::{StorageBackend, StorageConfig};
use crate::pool::open_pool;

/// Build the backend selected in the configuration
pub async fn open_storage(config: &StorageConfig) -> Result<Arc<dyn Storage>> {
    match config.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            Ok(Arc::new(MemoryStorage::new()))
        }
        StorageBackend::Libsql => {
            info!("Using libsql storage at {}", config.path);
            let pool = open_pool(&config.path, config.pool_size).await?;
            Ok(Arc::new(LibsqlStorage::new_from_pool(pool).await?))
        }
    }
}
