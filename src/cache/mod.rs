//! 对象缓存
//!
//! 用于缓存 JWT 对应的用户信息以及已注销的访问令牌。

pub mod moka;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

pub use self::moka::MokaObjectCache;

#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    /// 读取原始字符串值
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    /// 写入原始字符串值，ttl 为秒，0 表示使用默认过期时间
    async fn insert_raw(&self, key: String, value: String, ttl: u64);
    async fn remove(&self, key: &str);
}

impl dyn ObjectCache {
    /// 读取并反序列化；反序列化失败时移除脏数据
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<T> {
        match self.get_raw(key).await {
            CacheResult::Found(json) => match serde_json::from_str::<T>(&json) {
                Ok(value) => CacheResult::Found(value),
                Err(e) => {
                    tracing::debug!("Dropping undecodable cache entry {}: {}", key, e);
                    self.remove(key).await;
                    CacheResult::NotFound
                }
            },
            CacheResult::NotFound => CacheResult::NotFound,
        }
    }

    pub async fn insert<T: Serialize + Sync>(&self, key: String, value: &T, ttl: u64) {
        match serde_json::to_string(value) {
            Ok(json) => self.insert_raw(key, json, ttl).await,
            Err(e) => tracing::warn!("Failed to serialize cache entry {}: {}", key, e),
        }
    }
}
