pub mod course;
pub mod gpa;
pub mod record;
pub mod student;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{ApiResult, grades::requests::RecordGradeRequest};
use crate::storage::Storage;

pub struct GradeService {
    storage: Option<Arc<dyn Storage>>,
}

impl GradeService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ApiResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn record_grade(
        &self,
        data: RecordGradeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        record::record_grade(self, data, request).await
    }

    pub async fn student_grades(
        &self,
        student_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        student::student_grades(self, student_id, request).await
    }

    pub async fn course_grades(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        course::course_grades(self, course_id, request).await
    }
}
