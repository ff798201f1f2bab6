use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::grades::requests::RecordGradeRequest;
use crate::models::users::entities::UserRole;
use crate::services::GradeService;
use crate::utils::{SafeCourseIdI64, SafeStudentIdI64};

static GRADE_SERVICE: Lazy<GradeService> = Lazy::new(GradeService::new_lazy);

pub async fn record_grade(
    req: HttpRequest,
    data: web::Json<RecordGradeRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.record_grade(data.into_inner(), &req).await
}

pub async fn student_grades(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.student_grades(student_id.0, &req).await
}

pub async fn course_grades(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.course_grades(course_id.0, &req).await
}

// 配置路由
pub fn configure_grade_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/grades")
            .wrap(middlewares::RequireJWT)
            .route("/student/{student_id}", web::get().to(student_grades))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles()))
                    .route("", web::post().to(record_grade))
                    .route("/course/{course_id}", web::get().to(course_grades)),
            ),
    );
}
