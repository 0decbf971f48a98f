//! 本地缓存层
//!
//! - `store` - 键值存储后端（内存 / 文件）
//! - `clock` - 可注入的时钟
//! - `local_cache` - 带有效期判断的缓存

pub mod clock;
pub mod local_cache;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use local_cache::{CacheEntry, LocalCache, DEFAULT_MAX_AGE_MS};
pub use store::{FileStore, KeyValueStore, MemoryStore};
