//! Thread store adapters
//!
//! - [`FileThreadStore`]: one JSON document per thread, shared safely
//!   between processes
//! - [`InMemoryThreadStore`]: process-local, for tests and `store = "memory"`

mod file;
mod memory;

pub use file::FileThreadStore;
pub use memory::InMemoryThreadStore;

use crate::config::{ConfigError, FileConversationConfig, FileStoreKind};
use gateway_application::ThreadStore;
use std::sync::Arc;

/// Open the store selected by `[conversation]`.
pub fn open_thread_store(
    config: &FileConversationConfig,
) -> Result<Arc<dyn ThreadStore>, ConfigError> {
    match config.store {
        FileStoreKind::Memory => Ok(Arc::new(InMemoryThreadStore::new())),
        FileStoreKind::File => {
            let dir = config.store_dir();
            let store = FileThreadStore::open(&dir).map_err(|e| ConfigError::Store {
                path: dir.display().to_string(),
                message: e.to_string(),
            })?;
            Ok(Arc::new(store))
        }
    }
}
