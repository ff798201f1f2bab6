pub mod attempts;
pub mod create;
pub mod get;
pub mod publish;
pub mod scoring;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ApiResult,
    quizzes::requests::{CreateQuizRequest, QuizListParams, SubmitAttemptRequest},
};
use crate::storage::Storage;

pub struct QuizService {
    storage: Option<Arc<dyn Storage>>,
}

impl QuizService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ApiResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn create_quiz(
        &self,
        data: CreateQuizRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_quiz(self, data, request).await
    }

    pub async fn list_quizzes(
        &self,
        params: QuizListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::list_quizzes(self, params, request).await
    }

    pub async fn get_quiz(&self, quiz_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_quiz(self, quiz_id, request).await
    }

    pub async fn publish_quiz(
        &self,
        quiz_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        publish::publish_quiz(self, quiz_id, request).await
    }

    pub async fn submit_attempt(
        &self,
        quiz_id: i64,
        data: SubmitAttemptRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        attempts::submit_attempt(self, quiz_id, data, request).await
    }

    pub async fn list_attempts(
        &self,
        quiz_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        attempts::list_attempts(self, quiz_id, request).await
    }
}
