use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::QuizService;
use crate::models::{
    ApiError, ApiResult, ErrorCode,
    quizzes::{entities::Quiz, requests::QuizListParams},
    users::entities::User,
};
use crate::services::{current_user, ensure_course_member, is_course_staff, load_course, respond};
use crate::storage::Storage;

pub(crate) async fn load_quiz(storage: &dyn Storage, quiz_id: i64) -> ApiResult<Quiz> {
    storage
        .get_quiz_by_id(quiz_id)
        .await?
        .ok_or_else(|| ApiError::not_found(ErrorCode::QuizNotFound, "Quiz not found"))
}

pub(crate) async fn list_quizzes_inner(
    storage: &dyn Storage,
    actor: &User,
    params: QuizListParams,
) -> ApiResult<Vec<Quiz>> {
    let course_id = params
        .course_id
        .ok_or_else(|| ApiError::bad_request(ErrorCode::BadRequest, "course_id is required"))?;
    let course = load_course(storage, course_id).await?;
    ensure_course_member(storage, actor, &course).await?;

    let staff = is_course_staff(actor, &course);
    let quizzes = storage.list_course_quizzes(course.id, !staff).await?;
    Ok(if staff {
        quizzes
    } else {
        quizzes.into_iter().map(Quiz::redacted).collect()
    })
}

/// 学生只能看到已发布的测验，且不含答案
pub(crate) async fn get_quiz_inner(
    storage: &dyn Storage,
    actor: &User,
    quiz_id: i64,
) -> ApiResult<Quiz> {
    let quiz = load_quiz(storage, quiz_id).await?;
    let course = load_course(storage, quiz.course_id).await?;
    ensure_course_member(storage, actor, &course).await?;

    if is_course_staff(actor, &course) {
        return Ok(quiz);
    }
    if !quiz.published {
        return Err(ApiError::not_found(ErrorCode::QuizNotFound, "Quiz not found"));
    }
    Ok(quiz.redacted())
}

pub async fn list_quizzes(
    service: &QuizService,
    params: QuizListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        list_quizzes_inner(storage.as_ref(), &actor, params).await
    }
    .await;
    Ok(respond(result, "Quizzes retrieved successfully"))
}

pub async fn get_quiz(
    service: &QuizService,
    quiz_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        get_quiz_inner(storage.as_ref(), &actor, quiz_id).await
    }
    .await;
    Ok(respond(result, "Quiz retrieved successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quizzes::{entities::QuizQuestion, requests::NewQuiz};
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support;

    #[tokio::test]
    async fn test_students_see_published_redacted_quizzes() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "CS").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let student = test_support::user(&storage, "s1", UserRole::Student, None).await;
        let course = test_support::course(&storage, "CS101", dept.id, teacher.id, 3).await;
        storage.create_enrollment(course.id, student.id).await.unwrap();

        let quiz = storage
            .create_quiz(NewQuiz {
                course_id: course.id,
                created_by: teacher.id,
                title: "Quiz 1".into(),
                description: None,
                questions: vec![QuizQuestion {
                    question: "1+1?".into(),
                    options: vec!["1".into(), "2".into()],
                    correct_answer: "B".into(),
                    points: 1.0,
                    explanation: Some("sum".into()),
                }],
                time_limit_minutes: None,
                ai_generated: false,
            })
            .await
            .unwrap();

        let params = || QuizListParams {
            course_id: Some(course.id),
        };
        assert_eq!(list_quizzes_inner(&storage, &teacher, params()).await.unwrap().len(), 1);
        assert!(list_quizzes_inner(&storage, &student, params()).await.unwrap().is_empty());
        let err = get_quiz_inner(&storage, &student, quiz.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::QuizNotFound);

        storage.set_quiz_published(quiz.id, true).await.unwrap();
        let seen = get_quiz_inner(&storage, &student, quiz.id).await.unwrap();
        assert!(seen.questions[0].correct_answer.is_empty());
        assert!(seen.questions[0].explanation.is_none());

        let full = get_quiz_inner(&storage, &teacher, quiz.id).await.unwrap();
        assert_eq!(full.questions[0].correct_answer, "B");
    }
}
