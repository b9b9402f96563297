use async_trait::async_trait;
use moka::{Expiry, future::Cache};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;

/// 缓存值：(内容, 过期秒数)
type Entry = (String, u64);

/// 按条目 TTL 过期
struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(Duration::from_secs(value.1))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(Duration::from_secs(value.1))
    }
}

pub struct MokaObjectCache {
    inner: Cache<String, Entry>,
    default_ttl: u64,
}

impl MokaObjectCache {
    pub fn new(max_capacity: u64, default_ttl: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry)
            .build();

        debug!(
            "MokaObjectCache initialized with max capacity: {}, default ttl: {}s",
            max_capacity, default_ttl
        );
        Self { inner, default_ttl }
    }

    pub fn from_config() -> Self {
        let config = AppConfig::get();
        Self::new(config.cache.max_capacity, config.cache.default_ttl)
    }
}

#[async_trait]
impl ObjectCache for MokaObjectCache {
    async fn get_raw(&self, key: &str) -> CacheResult<String> {
        if let Some((value, _)) = self.inner.get(key).await {
            debug!("Successfully retrieved key: {}", key);
            CacheResult::Found(value)
        } else {
            debug!("Key not found in cache: {}", key);
            CacheResult::NotFound
        }
    }

    async fn insert_raw(&self, key: String, value: String, ttl: u64) {
        let ttl = if ttl == 0 { self.default_ttl } else { ttl };
        self.inner.insert(key, (value, ttl)).await;
    }

    async fn remove(&self, key: &str) {
        self.inner.invalidate(key).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_insert_get_remove() {
        let cache = MokaObjectCache::new(100, 60);
        cache.insert_raw("k".into(), "v".into(), 0).await;
        assert_eq!(cache.get_raw("k").await, CacheResult::Found("v".to_string()));

        cache.remove("k").await;
        assert_eq!(cache.get_raw("k").await, CacheResult::NotFound);
    }

    #[tokio::test]
    async fn test_typed_access_through_trait_object() {
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaObjectCache::new(100, 60));
        cache.insert("n".into(), &42_i64, 0).await;
        assert_eq!(cache.get::<i64>("n").await, CacheResult::Found(42));

        cache.insert_raw("bad".into(), "not json".into(), 0).await;
        assert_eq!(cache.get::<i64>("bad").await, CacheResult::NotFound);
        assert_eq!(cache.get_raw("bad").await, CacheResult::NotFound);
    }
}
