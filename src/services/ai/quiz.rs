use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AiService;
use super::generate::{finish, run_generation};
use crate::ai::{CompletionClient, fallback, normalize::normalize_quiz, prompts};
use crate::cache::ObjectCache;
use crate::config::AppConfig;
use crate::models::{
    ApiResult,
    ai::{
        entities::{GeneratedQuiz, GenerationKind},
        requests::GenerateQuizRequest,
        responses::GenerationResponse,
    },
    quizzes::requests::NewQuiz,
    users::entities::User,
};
use crate::services::{current_user, ensure_course_staff, load_course, respond};
use crate::storage::Storage;

const DEFAULT_QUESTION_COUNT: u32 = 5;
const DEFAULT_DIFFICULTY: &str = "medium";

fn clamp_count(requested: Option<u32>) -> u32 {
    let max = AppConfig::get().ai.max_quiz_questions.max(1);
    requested.unwrap_or(DEFAULT_QUESTION_COUNT).clamp(1, max)
}

/// 生成测验；保存时以未发布状态入库，发布前由教师审核
pub(crate) async fn generate_quiz_inner(
    storage: &dyn Storage,
    client: &dyn CompletionClient,
    cache: Option<&dyn ObjectCache>,
    actor: &User,
    course_id: i64,
    request: GenerateQuizRequest,
) -> ApiResult<GenerationResponse<GeneratedQuiz>> {
    let course = load_course(storage, course_id).await?;
    ensure_course_staff(actor, &course)?;

    let count = clamp_count(request.count);
    let difficulty = request
        .difficulty
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(DEFAULT_DIFFICULTY);
    let topic = request.topic.as_deref();
    let default_title = format!("{} quiz", course.code);

    let prompt = prompts::quiz_prompt(&course, count, difficulty, topic);
    let mut generation = run_generation(
        client,
        cache,
        GenerationKind::Quiz,
        prompt,
        |value| normalize_quiz(value, &default_title),
        || fallback::quiz(&course, topic),
    )
    .await?;

    generation.result.questions.truncate(count as usize);
    if let Some(title) = request.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        generation.result.title = title.to_string();
    }

    let saved_id = if request.save && !generation.is_fallback() {
        let quiz = storage
            .create_quiz(NewQuiz {
                course_id: course.id,
                created_by: actor.id,
                title: generation.result.title.clone(),
                description: topic.map(|t| format!("Topic: {}", t.trim())),
                questions: generation.result.questions.clone(),
                time_limit_minutes: None,
                ai_generated: true,
            })
            .await?;
        Some(quiz.id)
    } else {
        None
    };

    Ok(finish(
        storage,
        actor,
        course.id,
        GenerationKind::Quiz,
        client.model_name(),
        generation,
        saved_id,
    )
    .await)
}

pub async fn generate_quiz(
    service: &AiService,
    course_id: i64,
    data: GenerateQuizRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        let client = service.get_client(request)?;
        let cache = service.get_cache(request);
        generate_quiz_inner(
            storage.as_ref(),
            client.as_ref(),
            cache.as_deref(),
            &actor,
            course_id,
            data,
        )
        .await
    }
    .await;
    Ok(respond(result, "Quiz generated"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::services::ai::test_client::ScriptedClient;
    use crate::storage::sea_orm_storage::test_support;

    const QUIZ: &str = r#"{"title": "Cells", "questions": [
        {"text": "Powerhouse of the cell?", "choices": ["A) Nucleus", "B) Mitochondria"], "answer": "B"},
        {"question": "", "options": ["x", "y"], "correct_answer": "A"},
        {"question": "Site of protein synthesis?", "options": ["Ribosome", "Golgi"], "correctAnswer": "A", "points": 2}
    ]}"#;

    #[tokio::test]
    async fn test_generated_quiz_saved_unpublished() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "BIO").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let course = test_support::course(&storage, "BIO110", dept.id, teacher.id, 4).await;

        let client = ScriptedClient::reply(QUIZ);
        let request = GenerateQuizRequest {
            count: Some(5),
            save: true,
            ..Default::default()
        };
        let response = generate_quiz_inner(&storage, &client, None, &teacher, course.id, request)
            .await
            .unwrap();

        assert!(!response.fallback);
        assert_eq!(response.result.title, "Cells");
        // 空题干被丢弃
        assert_eq!(response.result.questions.len(), 2);
        assert_eq!(response.result.questions[0].options[1], "Mitochondria");
        assert_eq!(response.result.questions[1].points, 2.0);

        let quiz = storage
            .get_quiz_by_id(response.saved_id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(quiz.ai_generated);
        assert!(!quiz.published);
        assert!(client.calls.lock().unwrap()[0].prompt.contains("5 multiple-choice"));
    }

    #[tokio::test]
    async fn test_count_is_clamped() {
        assert_eq!(clamp_count(Some(0)), 1);
        assert_eq!(clamp_count(None), DEFAULT_QUESTION_COUNT);
        let max = AppConfig::get().ai.max_quiz_questions;
        assert_eq!(clamp_count(Some(max + 50)), max);
    }
}
