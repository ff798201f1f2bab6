pub mod create;
pub mod get;
pub mod list;
pub mod study_plan;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ApiResult,
    courses::requests::{CourseListParams, CreateCourseRequest, UpdateStudyPlanRequest},
};
use crate::storage::Storage;

pub struct CourseService {
    storage: Option<Arc<dyn Storage>>,
}

impl CourseService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ApiResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn create_course(
        &self,
        data: CreateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_course(self, data, request).await
    }

    pub async fn list_courses(
        &self,
        params: CourseListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_courses(self, params, request).await
    }

    pub async fn get_course(&self, course_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_course(self, course_id, request).await
    }

    pub async fn get_study_plan(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        study_plan::get_study_plan(self, course_id, request).await
    }

    pub async fn update_study_plan(
        &self,
        course_id: i64,
        data: UpdateStudyPlanRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        study_plan::update_study_plan(self, course_id, data, request).await
    }
}
