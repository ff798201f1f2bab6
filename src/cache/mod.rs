//! 缓存层
//!
//! `ObjectCache` 只处理字符串值，结构化数据由调用方序列化。
//! 后端通过名称注册，启动时按配置选择，找不到时退回内存缓存。

pub mod object_cache;
pub mod register;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

pub use register::{create_object_cache, register_builtin_caches};

/// 缓存查询结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
    /// 后端出错或值无法读取
    ExistsButNoValue,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    /// `ttl` 为 0 时使用默认 TTL（秒）
    async fn insert_raw(&self, key: String, value: String, ttl: u64);
    async fn remove(&self, key: &str);
    async fn invalidate_all(&self);
}

impl dyn ObjectCache + '_ {
    /// 读取并反序列化，损坏的值会被删除
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.get_raw(key).await {
            CacheResult::Found(raw) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::debug!("缓存值反序列化失败 {}: {}", key, e);
                    self.remove(key).await;
                    None
                }
            },
            _ => None,
        }
    }

    pub async fn insert_json<T: Serialize + ?Sized>(&self, key: String, value: &T, ttl: u64) {
        match serde_json::to_string(value) {
            Ok(raw) => self.insert_raw(key, raw, ttl).await,
            Err(e) => tracing::debug!("缓存值序列化失败 {}: {}", key, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::object_cache::moka::MokaCacheWrapper;
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_json_helpers() {
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(100, 60));

        cache
            .insert_json("k".to_string(), &vec![1, 2, 3], 0)
            .await;
        assert_eq!(cache.get_json::<Vec<i32>>("k").await, Some(vec![1, 2, 3]));

        cache
            .insert_raw("bad".to_string(), "not json".to_string(), 0)
            .await;
        assert_eq!(cache.get_json::<Vec<i32>>("bad").await, None);
        // 损坏的值已被删除
        assert_eq!(cache.get_raw("bad").await, CacheResult::NotFound);
    }
}
