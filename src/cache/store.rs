//! 键值存储后端
//!
//! 只存取序列化后的文本，不关心内容结构

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::CacheError;

/// 持久化键值存储接口
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

impl<S: KeyValueStore> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        (**self).remove(key)
    }
}

/// 内存存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

/// 十六进制文件名的最大长度，超过时截断并追加 SHA-256 摘要
const MAX_ENCODED_LEN: usize = 128;

/// 文件存储，每个键一个文件
///
/// 文件名是键的十六进制编码，任意键都能安全落盘且互不冲突。
/// 长键的文件名为 `<前缀>-<sha256>.json`，长度不超过 200 字节。
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// 创建文件存储，目录在第一次写入时创建
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }
}

fn file_stem(key: &str) -> String {
    let encoded: String = key.bytes().map(|b| format!("{:02x}", b)).collect();
    if encoded.len() <= MAX_ENCODED_LEN {
        return encoded;
    }
    // 十六进制编码里不会出现 '-'，不会和短键的文件名冲突
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{}-{:x}", &encoded[..MAX_ENCODED_LEN], hasher.finalize())
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let io_err = |source| CacheError::Io {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let path = self.path_for(key);
        fs::write(&path, value).map_err(io_err)?;
        debug!("缓存已写入: {}", path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.get("grades:student:s1").unwrap(), None);
        store.set("grades:student:s1", "{\"a\":1}").unwrap();
        store.set("grades/student/s1", "other").unwrap();

        assert_eq!(store.get("grades:student:s1").unwrap().as_deref(), Some("{\"a\":1}"));
        assert_eq!(store.get("grades/student/s1").unwrap().as_deref(), Some("other"));

        store.remove("grades:student:s1").unwrap();
        store.remove("grades:student:s1").unwrap();
        assert_eq!(store.get("grades:student:s1").unwrap(), None);
    }

    #[test]
    fn test_file_store_long_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let prefix = format!("grades:list?studentId={}", "s".repeat(300));
        let first = format!("{}&status=failed", prefix);
        let second = format!("{}&status=completed", prefix);

        store.set(&first, "1").unwrap();
        store.set(&second, "2").unwrap();
        assert_eq!(store.get(&first).unwrap().as_deref(), Some("1"));
        assert_eq!(store.get(&second).unwrap().as_deref(), Some("2"));

        for entry in std::fs::read_dir(dir.path()).unwrap() {
            let name = entry.unwrap().file_name();
            assert!(name.len() <= 200, "{:?}", name);
        }

        store.remove(&first).unwrap();
        assert_eq!(store.get(&first).unwrap(), None);
        assert_eq!(store.get(&second).unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_short_key_file_name_is_plain_hex() {
        assert_eq!(file_stem("ab"), "6162");
        let stem = file_stem(&"k".repeat(64));
        assert_eq!(stem.len(), 128);
        assert!(!stem.contains('-'));
        let stem = file_stem(&"k".repeat(65));
        assert_eq!(stem.len(), 128 + 1 + 64);
    }
}
