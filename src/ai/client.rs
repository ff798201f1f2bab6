use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::Result;

/// 一次补全请求
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    /// 要求模型直接输出 JSON
    pub json_mode: bool,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            json_mode: false,
        }
    }

    pub fn json_mode(mut self, enabled: bool) -> Self {
        self.json_mode = enabled;
        self
    }
}

/// 文本补全服务
///
/// 返回模型输出的原始文本；拒答返回 `AiRefusal`，传输失败返回 `AiRequest`。
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// 模型名称，用于缓存键与审计
    fn model_name(&self) -> &str;
}

pub type SharedCompletionClient = Arc<dyn CompletionClient>;
