pub mod create;
pub mod grade;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ApiResult,
    submissions::requests::{CreateSubmissionRequest, GradeSubmissionRequest},
};
use crate::storage::Storage;

pub struct SubmissionService {
    storage: Option<Arc<dyn Storage>>,
}

impl SubmissionService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ApiResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    // 学生提交作业
    pub async fn submit(
        &self,
        assignment_id: i64,
        data: CreateSubmissionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_submission(self, assignment_id, data, request).await
    }

    pub async fn list_submissions(
        &self,
        assignment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_submissions(self, assignment_id, request).await
    }

    // 批改
    pub async fn grade_submission(
        &self,
        submission_id: i64,
        data: GradeSubmissionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        grade::grade_submission(self, submission_id, data, request).await
    }
}
