pub mod cached;
pub mod sqlite;
pub mod trait_def;

pub use cached::CachedStorage;
pub use sqlite::{SqliteStorage, MAX_TRIES};
pub use trait_def::{Storage, StorageError, StorageResult};
