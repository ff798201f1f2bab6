use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::ai::{GeminiClient, SharedCompletionClient};
use crate::cache::{ObjectCache, create_object_cache, register_builtin_caches};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::services::auth::seed_admin;
use crate::storage::{Storage, sea_orm_storage::SeaOrmStorage};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub ai_client: SharedCompletionClient,
}

/// 准备服务器启动的上下文
/// 包括存储、缓存与 AI 客户端
pub async fn prepare_server_startup() -> Result<StartupContext> {
    // reqwest 与 redis 共用 rustls；重复安装时忽略
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_async().await?);
    warn!("Storage backend initialized and migrations completed");

    // 初始化默认管理员账号（如果需要）
    match seed_admin(storage.as_ref()).await {
        Ok(true) => info!("Default admin account created"),
        Ok(false) => debug!("Users already exist, skipping admin seed"),
        Err(e) => warn!("Failed to seed admin account: {}", e),
    }

    register_builtin_caches();
    let cache = create_object_cache().await;
    warn!("Cache backend initialized");

    let config = AppConfig::get();
    let ai_client: SharedCompletionClient = Arc::new(GeminiClient::new(&config.ai)?);
    if config.ai_enabled() {
        warn!("AI generation enabled with model {}", config.ai.model);
    } else {
        warn!("AI API key not configured, generation endpoints will return 503");
    }

    Ok(StartupContext {
        storage,
        cache,
        ai_client,
    })
}
