use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::QuizService;
use super::scoring::option_index;
use crate::models::{
    ApiError, ApiResult, ErrorCode,
    quizzes::{
        entities::{Quiz, QuizQuestion},
        requests::{CreateQuizRequest, NewQuiz},
    },
    users::entities::User,
};
use crate::services::{current_user, ensure_course_staff, load_course, respond_created};
use crate::storage::Storage;

fn invalid(message: String) -> ApiError {
    ApiError::bad_request(ErrorCode::QuizInvalid, message)
}

/// 校验题目：题干非空、选择题至少两个选项、有标准答案、分值为正
pub(crate) fn validate_questions(questions: &[QuizQuestion]) -> ApiResult<()> {
    if questions.is_empty() {
        return Err(invalid("A quiz needs at least one question".to_string()));
    }
    for (index, question) in questions.iter().enumerate() {
        let number = index + 1;
        if question.question.trim().is_empty() {
            return Err(invalid(format!("Question {number} has no text")));
        }
        if question.options.len() == 1 {
            return Err(invalid(format!(
                "Question {number} needs at least two options"
            )));
        }
        if question.options.iter().any(|o| o.trim().is_empty()) {
            return Err(invalid(format!("Question {number} has an empty option")));
        }
        if question.correct_answer.trim().is_empty() {
            return Err(invalid(format!("Question {number} has no correct answer")));
        }
        // 标准答案必须能对应到某个选项
        if !question.options.is_empty()
            && option_index(question, &question.correct_answer).is_none()
        {
            return Err(invalid(format!(
                "Question {number} has a correct answer that matches no option"
            )));
        }
        if !question.points.is_finite() || question.points <= 0.0 {
            return Err(invalid(format!(
                "Question {number} must be worth more than 0 points"
            )));
        }
    }
    Ok(())
}

pub(crate) async fn create_quiz_inner(
    storage: &dyn Storage,
    actor: &User,
    request: CreateQuizRequest,
) -> ApiResult<Quiz> {
    let course = load_course(storage, request.course_id).await?;
    ensure_course_staff(actor, &course)?;

    let title = request.title.trim().to_string();
    if title.is_empty() {
        return Err(invalid("Quiz title is required".to_string()));
    }
    validate_questions(&request.questions)?;
    if request.time_limit_minutes.is_some_and(|m| m <= 0) {
        return Err(invalid("Time limit must be positive".to_string()));
    }

    Ok(storage
        .create_quiz(NewQuiz {
            course_id: course.id,
            created_by: actor.id,
            title,
            description: request.description,
            questions: request.questions,
            time_limit_minutes: request.time_limit_minutes,
            ai_generated: false,
        })
        .await?)
}

pub async fn create_quiz(
    service: &QuizService,
    data: CreateQuizRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        create_quiz_inner(storage.as_ref(), &actor, data).await
    }
    .await;
    Ok(respond_created(result, "Quiz created successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(options: &[&str], correct: &str, points: f64) -> QuizQuestion {
        QuizQuestion {
            question: "Pick one".into(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_answer: correct.into(),
            points,
            explanation: None,
        }
    }

    #[test]
    fn test_question_validation() {
        assert!(validate_questions(&[question(&["a", "b"], "B", 1.0)]).is_ok());
        assert!(validate_questions(&[question(&[], "free text", 1.0)]).is_ok());

        assert!(validate_questions(&[]).is_err());
        assert!(validate_questions(&[question(&["only"], "A", 1.0)]).is_err());
        assert!(validate_questions(&[question(&["a", "b"], "", 1.0)]).is_err());
        assert!(validate_questions(&[question(&["a", "b"], "E", 1.0)]).is_err());
        assert!(validate_questions(&[question(&["a", "b"], "A", 0.0)]).is_err());

        let mut blank = question(&["a", "b"], "A", 1.0);
        blank.question = "  ".into();
        let err = validate_questions(&[blank]).unwrap_err();
        assert_eq!(err.code, ErrorCode::QuizInvalid);
    }
}
