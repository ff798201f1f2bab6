use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::QuizService;
use super::get::load_quiz;
use super::scoring::score_attempt;
use crate::models::{
    ApiError, ApiResult, ErrorCode,
    quizzes::{entities::QuizAttempt, requests::SubmitAttemptRequest},
    users::entities::User,
};
use crate::services::{
    current_user, is_course_staff, is_enrolled, load_course, respond, respond_created,
};
use crate::storage::Storage;

/// 在读学生作答已发布的测验，服务端判分并保存原始作答
pub(crate) async fn submit_attempt_inner(
    storage: &dyn Storage,
    actor: &User,
    quiz_id: i64,
    request: SubmitAttemptRequest,
) -> ApiResult<QuizAttempt> {
    let quiz = load_quiz(storage, quiz_id).await?;

    if !actor.is_student() || !is_enrolled(storage, quiz.course_id, actor.id, true).await? {
        return Err(ApiError::forbidden(
            ErrorCode::NotEnrolled,
            "Only students enrolled in the course can take this quiz",
        ));
    }
    if !quiz.published {
        return Err(ApiError::bad_request(
            ErrorCode::QuizNotPublished,
            "Quiz is not published",
        ));
    }
    if !(request.answers.is_array() || request.answers.is_object()) {
        return Err(ApiError::bad_request(
            ErrorCode::BadRequest,
            "Answers must be a list or an object keyed by question index",
        ));
    }

    let (score, max_score) = score_attempt(&quiz.questions, &request.answers);
    Ok(storage
        .create_quiz_attempt(quiz.id, actor.id, &request.answers, score, max_score)
        .await?)
}

pub(crate) async fn list_attempts_inner(
    storage: &dyn Storage,
    actor: &User,
    quiz_id: i64,
) -> ApiResult<Vec<QuizAttempt>> {
    let quiz = load_quiz(storage, quiz_id).await?;
    let course = load_course(storage, quiz.course_id).await?;

    let student_filter = if is_course_staff(actor, &course) {
        None
    } else if actor.is_student() && is_enrolled(storage, course.id, actor.id, false).await? {
        Some(actor.id)
    } else {
        return Err(ApiError::forbidden(
            ErrorCode::CoursePermissionDenied,
            "You are not a member of this course",
        ));
    };
    Ok(storage.list_quiz_attempts(quiz.id, student_filter).await?)
}

pub async fn submit_attempt(
    service: &QuizService,
    quiz_id: i64,
    data: SubmitAttemptRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        submit_attempt_inner(storage.as_ref(), &actor, quiz_id, data).await
    }
    .await;
    Ok(respond_created(result, "Quiz attempt submitted"))
}

pub async fn list_attempts(
    service: &QuizService,
    quiz_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        list_attempts_inner(storage.as_ref(), &actor, quiz_id).await
    }
    .await;
    Ok(respond(result, "Quiz attempts retrieved successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quizzes::{entities::QuizQuestion, requests::NewQuiz};
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support;
    use serde_json::json;

    #[tokio::test]
    async fn test_attempt_scoring_flow() {
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
                title: "Capitals".into(),
                description: None,
                questions: vec![
                    QuizQuestion {
                        question: "Capital of France?".into(),
                        options: vec!["Paris".into(), "Lyon".into()],
                        correct_answer: "A".into(),
                        points: 2.0,
                        explanation: None,
                    },
                    QuizQuestion {
                        question: "Capital of Italy?".into(),
                        options: vec!["Milan".into(), "Rome".into()],
                        correct_answer: "B".into(),
                        points: 3.0,
                        explanation: None,
                    },
                ],
                time_limit_minutes: Some(10),
                ai_generated: false,
            })
            .await
            .unwrap();

        let answers = || SubmitAttemptRequest {
            answers: json!(["paris", "A"]),
        };
        let err = submit_attempt_inner(&storage, &student, quiz.id, answers())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::QuizNotPublished);

        storage.set_quiz_published(quiz.id, true).await.unwrap();
        let attempt = submit_attempt_inner(&storage, &student, quiz.id, answers())
            .await
            .unwrap();
        assert_eq!(attempt.score, 2.0);
        assert_eq!(attempt.max_score, 5.0);
        assert_eq!(attempt.answers, json!(["paris", "A"]));

        let err = submit_attempt_inner(&storage, &teacher, quiz.id, answers())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotEnrolled);

        let mine = list_attempts_inner(&storage, &student, quiz.id).await.unwrap();
        assert_eq!(mine.len(), 1);
        let all = list_attempts_inner(&storage, &teacher, quiz.id).await.unwrap();
        assert_eq!(all.len(), 1);
    }
}
