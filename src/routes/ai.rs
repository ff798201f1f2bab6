use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RateLimit};
use crate::models::ai::requests::{
    GenerateAssignmentRequest, GenerateQuizRequest, GenerateStudyPlanRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::AiService;
use crate::utils::SafeCourseIdI64;

static AI_SERVICE: Lazy<AiService> = Lazy::new(AiService::new_lazy);

pub async fn generate_study_plan(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    data: web::Json<GenerateStudyPlanRequest>,
) -> ActixResult<HttpResponse> {
    AI_SERVICE
        .generate_study_plan(course_id.0, data.into_inner(), &req)
        .await
}

pub async fn generate_quiz(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    data: web::Json<GenerateQuizRequest>,
) -> ActixResult<HttpResponse> {
    AI_SERVICE
        .generate_quiz(course_id.0, data.into_inner(), &req)
        .await
}

pub async fn generate_assignment(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    data: web::Json<GenerateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    AI_SERVICE
        .generate_assignment(course_id.0, data.into_inner(), &req)
        .await
}

// 配置路由（限流按用户计数，需在 RequireJWT 内层）
pub fn configure_ai_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/gemini/{course_id}")
            .wrap(RateLimit::ai_generation())
            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles()))
            .wrap(middlewares::RequireJWT)
            .route("/study-plan", web::post().to(generate_study_plan))
            .route("/quiz", web::post().to(generate_quiz))
            .route("/assignment", web::post().to(generate_assignment)),
    );
}
