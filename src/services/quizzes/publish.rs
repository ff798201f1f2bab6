use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::QuizService;
use super::get::load_quiz;
use crate::models::{
    ApiError, ApiResult, ErrorCode, quizzes::entities::Quiz, users::entities::User,
};
use crate::services::{current_user, ensure_course_staff, load_course, respond};
use crate::storage::Storage;

pub(crate) async fn publish_quiz_inner(
    storage: &dyn Storage,
    actor: &User,
    quiz_id: i64,
) -> ApiResult<Quiz> {
    let quiz = load_quiz(storage, quiz_id).await?;
    let course = load_course(storage, quiz.course_id).await?;
    ensure_course_staff(actor, &course)?;

    // AI 生成的题目可能缺少标准答案，发布前再校验一次
    super::create::validate_questions(&quiz.questions)?;

    storage
        .set_quiz_published(quiz.id, true)
        .await?
        .ok_or_else(|| ApiError::not_found(ErrorCode::QuizNotFound, "Quiz not found"))
}

pub async fn publish_quiz(
    service: &QuizService,
    quiz_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        publish_quiz_inner(storage.as_ref(), &actor, quiz_id).await
    }
    .await;
    Ok(respond(result, "Quiz published successfully"))
}
