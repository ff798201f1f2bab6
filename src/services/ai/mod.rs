//! AI 生成接口
//!
//! 三个端点共用 [`generate::run_generation`]：构造提示词、查缓存、调用模型、
//! 解析并规范化输出，可恢复的失败退回静态兜底内容。

pub mod assignment;
pub mod generate;
pub mod quiz;
pub mod study_plan;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::ai::SharedCompletionClient;
use crate::cache::ObjectCache;
use crate::models::{
    ApiError, ApiResult, ErrorCode,
    ai::requests::{GenerateAssignmentRequest, GenerateQuizRequest, GenerateStudyPlanRequest},
};
use crate::storage::Storage;

pub struct AiService {
    storage: Option<Arc<dyn Storage>>,
}

impl AiService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ApiResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub(crate) fn get_client(&self, request: &HttpRequest) -> ApiResult<SharedCompletionClient> {
        request
            .app_data::<web::Data<SharedCompletionClient>>()
            .map(|data| data.get_ref().clone())
            .ok_or_else(|| {
                ApiError::new(
                    actix_web::http::StatusCode::SERVICE_UNAVAILABLE,
                    ErrorCode::AiNotConfigured,
                    "AI generation is not available",
                )
            })
    }

    /// 缓存不可用时直接跳过
    pub(crate) fn get_cache(&self, request: &HttpRequest) -> Option<Arc<dyn ObjectCache>> {
        request
            .app_data::<web::Data<Arc<dyn ObjectCache>>>()
            .map(|data| data.get_ref().clone())
    }

    pub async fn generate_study_plan(
        &self,
        course_id: i64,
        data: GenerateStudyPlanRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        study_plan::generate_study_plan(self, course_id, data, request).await
    }

    pub async fn generate_quiz(
        &self,
        course_id: i64,
        data: GenerateQuizRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        quiz::generate_quiz(self, course_id, data, request).await
    }

    pub async fn generate_assignment(
        &self,
        course_id: i64,
        data: GenerateAssignmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assignment::generate_assignment(self, course_id, data, request).await
    }
}

#[cfg(test)]
pub(crate) mod test_client {
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::ai::{CompletionClient, CompletionRequest};
    use crate::errors::{EduSystemError, Result};

    /// 按顺序返回预设结果的补全客户端
    pub struct ScriptedClient {
        replies: Mutex<Vec<Result<String>>>,
        pub calls: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedClient {
        pub fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().rev().collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn reply(text: &str) -> Self {
            Self::new(vec![Ok(text.to_string())])
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.calls.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(EduSystemError::ai_request("no scripted reply left")))
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }
}
