pub mod migrate;
pub mod record;
pub mod rehydrate;
pub mod storage;
pub mod writer;

pub use migrate::migrate;
pub use record::{serialize, StateRecord};
pub use rehydrate::{load_initial_state, rehydrate};
pub use storage::{FileStorage, MemoryStorage, StorageBackend, StorageError};
pub use writer::{DebouncedWriter, WriterHandle, DEFAULT_DEBOUNCE};
