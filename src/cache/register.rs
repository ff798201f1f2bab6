use crate::cache::ObjectCache;
use crate::cache::object_cache::{moka::MokaCacheWrapper, redis::RedisObjectCache};
use crate::config::AppConfig;
use crate::errors::{EduSystemError, Result};
use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::{Arc, PoisonError, RwLock},
};
use tracing::{debug, warn};

pub type BoxedObjectCacheFuture =
    Pin<Box<dyn Future<Output = Result<Arc<dyn ObjectCache>>> + Send>>;
pub type ObjectCacheConstructor = Arc<dyn Fn() -> BoxedObjectCacheFuture + Send + Sync>;

static OBJECT_CACHE_REGISTRY: Lazy<RwLock<HashMap<String, ObjectCacheConstructor>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

pub fn register_object_cache_plugin<S: Into<String>>(name: S, constructor: ObjectCacheConstructor) {
    let mut registry = OBJECT_CACHE_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    registry.insert(name.into(), constructor);
}

pub fn get_object_cache_plugin(name: &str) -> Option<ObjectCacheConstructor> {
    OBJECT_CACHE_REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned()
}

/// 注册内置的缓存后端
pub fn register_builtin_caches() {
    register_object_cache_plugin(
        "moka",
        Arc::new(|| {
            Box::pin(async {
                let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::new());
                Ok(cache)
            }) as BoxedObjectCacheFuture
        }),
    );
    register_object_cache_plugin(
        "redis",
        Arc::new(|| {
            Box::pin(async {
                let cache = RedisObjectCache::new()
                    .await
                    .map_err(EduSystemError::cache_connection)?;
                let cache: Arc<dyn ObjectCache> = Arc::new(cache);
                Ok(cache)
            }) as BoxedObjectCacheFuture
        }),
    );

    let registry = OBJECT_CACHE_REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner);
    for key in registry.keys() {
        debug!("Registered object cache plugin: {}", key);
    }
}

/// 按配置创建缓存实例，失败时退回内存缓存
pub async fn create_object_cache() -> Arc<dyn ObjectCache> {
    let cache_type = AppConfig::get().cache.cache_type.as_str();

    let constructed = match get_object_cache_plugin(cache_type) {
        Some(constructor) => constructor().await,
        None => Err(EduSystemError::cache_plugin_not_found(cache_type)),
    };

    match constructed {
        Ok(cache) => {
            debug!("Using object cache backend: {}", cache_type);
            cache
        }
        Err(e) => {
            warn!("{}，回退到内存缓存", e.format_simple());
            Arc::new(MokaCacheWrapper::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_builtin_registration() {
        register_builtin_caches();
        assert!(get_object_cache_plugin("moka").is_some());
        assert!(get_object_cache_plugin("redis").is_some());
        assert!(get_object_cache_plugin("memcached").is_none());

        let constructor = get_object_cache_plugin("moka").unwrap();
        assert!(constructor().await.is_ok());
    }
}
