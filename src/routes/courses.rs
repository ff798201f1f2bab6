use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::courses::requests::{
    CourseListParams, CreateCourseRequest, UpdateStudyPlanRequest,
};
use crate::models::enrollments::requests::{CreateEnrollmentRequest, UpdateEnrollmentRequest};
use crate::services::{CourseService, EnrollmentService};
use crate::utils::{SafeCourseIdI64, SafeEnrollmentIdI64};

static COURSE_SERVICE: Lazy<CourseService> = Lazy::new(CourseService::new_lazy);
static ENROLLMENT_SERVICE: Lazy<EnrollmentService> = Lazy::new(EnrollmentService::new_lazy);

pub async fn list_courses(
    req: HttpRequest,
    query: web::Query<CourseListParams>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_courses(query.into_inner(), &req).await
}

pub async fn create_course(
    req: HttpRequest,
    data: web::Json<CreateCourseRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.create_course(data.into_inner(), &req).await
}

pub async fn get_course(req: HttpRequest, course_id: SafeCourseIdI64) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.get_course(course_id.0, &req).await
}

pub async fn get_study_plan(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.get_study_plan(course_id.0, &req).await
}

pub async fn update_study_plan(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    data: web::Json<UpdateStudyPlanRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .update_study_plan(course_id.0, data.into_inner(), &req)
        .await
}

// 选课
pub async fn enroll_student(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    data: web::Json<CreateEnrollmentRequest>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .enroll_student(course_id.0, data.into_inner(), &req)
        .await
}

pub async fn list_enrollments(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE.list_enrollments(course_id.0, &req).await
}

pub async fn update_enrollment(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    enrollment_id: SafeEnrollmentIdI64,
    data: web::Json<UpdateEnrollmentRequest>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .update_enrollment(course_id.0, enrollment_id.0, data.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_course_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/courses")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_courses))
            .route("", web::post().to(create_course))
            .route("/{course_id}", web::get().to(get_course))
            .route("/{course_id}/study-plan", web::get().to(get_study_plan))
            .route("/{course_id}/study-plan", web::put().to(update_study_plan))
            .route("/{course_id}/enrollments", web::post().to(enroll_student))
            .route("/{course_id}/enrollments", web::get().to(list_enrollments))
            .route(
                "/{course_id}/enrollments/{enrollment_id}",
                web::put().to(update_enrollment),
            ),
    );
}
