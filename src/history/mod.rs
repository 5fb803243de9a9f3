pub mod storage;
pub mod store;
pub mod types;

pub use storage::{load, read_history, save, write_history, HistoryLog, HISTORY_KEY};
pub use store::{get_store_path, CacheStore, FileStore, KeyValueStore, MemoryStore};
pub use types::{record, record_at, HistoryEntry, HISTORY_CAPACITY};
