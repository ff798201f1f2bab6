use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::quizzes::requests::{CreateQuizRequest, QuizListParams, SubmitAttemptRequest};
use crate::services::QuizService;
use crate::utils::SafeQuizIdI64;

static QUIZ_SERVICE: Lazy<QuizService> = Lazy::new(QuizService::new_lazy);

pub async fn list_quizzes(
    req: HttpRequest,
    query: web::Query<QuizListParams>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.list_quizzes(query.into_inner(), &req).await
}

pub async fn create_quiz(
    req: HttpRequest,
    data: web::Json<CreateQuizRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.create_quiz(data.into_inner(), &req).await
}

pub async fn get_quiz(req: HttpRequest, quiz_id: SafeQuizIdI64) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.get_quiz(quiz_id.0, &req).await
}

pub async fn publish_quiz(req: HttpRequest, quiz_id: SafeQuizIdI64) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.publish_quiz(quiz_id.0, &req).await
}

pub async fn submit_attempt(
    req: HttpRequest,
    quiz_id: SafeQuizIdI64,
    data: web::Json<SubmitAttemptRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE
        .submit_attempt(quiz_id.0, data.into_inner(), &req)
        .await
}

pub async fn list_attempts(req: HttpRequest, quiz_id: SafeQuizIdI64) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.list_attempts(quiz_id.0, &req).await
}

// 配置路由
pub fn configure_quiz_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/quizzes")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_quizzes))
            .route("", web::post().to(create_quiz))
            .route("/{quiz_id}", web::get().to(get_quiz))
            .route("/{quiz_id}/publish", web::put().to(publish_quiz))
            .route("/{quiz_id}/attempts", web::post().to(submit_attempt))
            .route("/{quiz_id}/attempts", web::get().to(list_attempts)),
    );
}
