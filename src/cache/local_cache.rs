//! 带写入时间戳的本地缓存
//!
//! - 写入失败只记日志，不影响调用方的主流程
//! - 读取时才判断是否过期，不做后台清理，也不限制条目数量
//! - 读取或反序列化失败一律视为未命中

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};
use super::store::KeyValueStore;
use crate::error::CacheError;

/// 默认有效期：一小时
pub const DEFAULT_MAX_AGE_MS: i64 = 3_600_000;

/// 缓存条目，总是整体替换
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub key: String,
    pub payload: Value,
    pub written_at: i64,
}

/// 本地缓存
pub struct LocalCache<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: KeyValueStore> LocalCache<S> {
    /// 使用系统时钟创建缓存
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: SystemClock,
        }
    }
}

impl<S: KeyValueStore, C: Clock> LocalCache<S, C> {
    /// 使用指定时钟创建缓存
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 写入缓存，失败时只记录警告
    pub fn put<T: Serialize>(&self, key: &str, payload: &T) {
        if let Err(e) = self.try_put(key, payload) {
            warn!("⚠️ 缓存写入失败，已忽略: {}", e);
        }
    }

    /// 写入缓存并返回错误
    pub fn try_put<T: Serialize>(&self, key: &str, payload: &T) -> Result<(), CacheError> {
        let serialize_err = |source| CacheError::Serialize {
            key: key.to_string(),
            source,
        };
        let entry = CacheEntry {
            key: key.to_string(),
            payload: serde_json::to_value(payload).map_err(serialize_err)?,
            written_at: self.clock.now_ms(),
        };
        let text = serde_json::to_string(&entry).map_err(serialize_err)?;
        self.store.set(key, &text)
    }

    /// 读取缓存
    ///
    /// # 参数
    /// - `key`: 缓存键
    /// - `max_age_ms`: 最大有效期，`None` 时使用 [`DEFAULT_MAX_AGE_MS`]
    ///
    /// # 返回
    /// 不存在、无法反序列化或 `now - written_at >= max_age_ms` 时返回 `None`
    pub fn get<T: DeserializeOwned>(&self, key: &str, max_age_ms: Option<i64>) -> Option<T> {
        let max_age_ms = max_age_ms.unwrap_or(DEFAULT_MAX_AGE_MS);

        let text = match self.store.get(key) {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!("缓存未命中: {}", key);
                return None;
            }
            Err(e) => {
                debug!("缓存读取失败，视为未命中: {}", e);
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&text) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("缓存条目损坏，视为未命中 ({}): {}", key, e);
                return None;
            }
        };

        let age = self.clock.now_ms() - entry.written_at;
        if age >= max_age_ms {
            debug!("缓存已过期: {} (已存在 {} ms)", key, age);
            return None;
        }

        match serde_json::from_value(entry.payload) {
            Ok(payload) => {
                debug!("缓存命中: {}", key);
                Some(payload)
            }
            Err(e) => {
                debug!("缓存内容类型不符，视为未命中 ({}): {}", key, e);
                None
            }
        }
    }

    /// 删除缓存条目，失败时只记录警告
    pub fn invalidate(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            warn!("⚠️ 缓存删除失败，已忽略: {}", e);
        }
    }
}
