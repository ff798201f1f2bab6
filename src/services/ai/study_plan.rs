use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AiService;
use super::generate::{finish, run_generation};
use crate::ai::{CompletionClient, fallback, normalize::normalize_study_plan, prompts};
use crate::cache::ObjectCache;
use crate::config::AppConfig;
use crate::models::{
    ApiResult,
    ai::{
        entities::GenerationKind, requests::GenerateStudyPlanRequest,
        responses::GenerationResponse,
    },
    courses::entities::StudyPlanWeek,
    users::entities::User,
};
use crate::services::courses::study_plan::publish_study_plan;
use crate::services::{current_user, ensure_course_staff, load_course, respond};
use crate::storage::Storage;

/// 周数取配置范围内的值
pub(crate) fn clamp_weeks(requested: Option<u32>) -> u32 {
    let config = &AppConfig::get().ai;
    requested
        .unwrap_or(config.default_weeks)
        .clamp(config.min_weeks, config.max_weeks)
}

pub(crate) async fn generate_study_plan_inner(
    storage: &dyn Storage,
    client: &dyn CompletionClient,
    cache: Option<&dyn ObjectCache>,
    actor: &User,
    course_id: i64,
    request: GenerateStudyPlanRequest,
) -> ApiResult<GenerationResponse<Vec<StudyPlanWeek>>> {
    let course = load_course(storage, course_id).await?;
    ensure_course_staff(actor, &course)?;

    let weeks = clamp_weeks(request.weeks);
    let prompt = prompts::study_plan_prompt(&course, weeks, request.focus.as_deref());
    let mut generation = run_generation(
        client,
        cache,
        GenerationKind::StudyPlan,
        prompt,
        |value| normalize_study_plan(value).filter(|weeks| !weeks.is_empty()),
        || fallback::study_plan(&course, weeks),
    )
    .await?;
    generation.result.truncate(weeks as usize);

    let should_save = request.save && (!generation.is_fallback() || request.save_fallback);
    let saved_id = if should_save {
        let source = if generation.is_fallback() { "fallback" } else { "ai" };
        Some(
            publish_study_plan(storage, actor, &course, &generation.result, source)
                .await?
                .id,
        )
    } else {
        None
    };

    Ok(finish(
        storage,
        actor,
        course.id,
        GenerationKind::StudyPlan,
        client.model_name(),
        generation,
        saved_id,
    )
    .await)
}

pub async fn generate_study_plan(
    service: &AiService,
    course_id: i64,
    data: GenerateStudyPlanRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        let client = service.get_client(request)?;
        let cache = service.get_cache(request);
        generate_study_plan_inner(
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
    Ok(respond(result, "Study plan generated"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EduSystemError;
    use crate::models::users::entities::UserRole;
    use crate::services::ai::test_client::ScriptedClient;
    use crate::storage::sea_orm_storage::test_support;

    const PLAN: &str = r#"Sure! Here is the plan:
```json
{"studyPlan": [
  {"weekNumber": 2, "title": "Membranes", "topics": "Lipid bilayer"},
  {"weekNumber": 1, "title": "The cell", "learningObjectives": ["Name organelles"]}
]}
```
Let me know if you need changes."#;

    #[tokio::test]
    async fn test_generate_and_save_plan() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "BIO").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let student = test_support::user(&storage, "s1", UserRole::Student, None).await;
        let course = test_support::course(&storage, "BIO110", dept.id, teacher.id, 4).await;
        storage.create_enrollment(course.id, student.id).await.unwrap();

        let client = ScriptedClient::reply(PLAN);
        let request = GenerateStudyPlanRequest {
            weeks: Some(2),
            save: true,
            ..Default::default()
        };
        let response =
            generate_study_plan_inner(&storage, &client, None, &teacher, course.id, request)
                .await
                .unwrap();

        assert!(!response.fallback);
        assert_eq!(response.saved_id, Some(course.id));
        assert_eq!(response.result[0].week, 1);
        assert_eq!(response.result[0].objectives, vec!["Name organelles"]);
        assert_eq!(response.result[1].topics, vec!["Lipid bilayer"]);
        assert!(response.result[1].readings.is_empty());

        let saved = storage.get_course_by_id(course.id).await.unwrap().unwrap();
        assert_eq!(saved.study_plan.len(), 2);
        assert_eq!(storage.count_unread_notifications(student.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_fallback_plan_not_saved() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "BIO").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let course = test_support::course(&storage, "BIO110", dept.id, teacher.id, 4).await;

        let client = ScriptedClient::new(vec![Err(EduSystemError::ai_request("timeout"))]);
        let request = GenerateStudyPlanRequest {
            weeks: Some(3),
            save: true,
            ..Default::default()
        };
        let response =
            generate_study_plan_inner(&storage, &client, None, &teacher, course.id, request)
                .await
                .unwrap();

        assert!(response.fallback);
        assert!(response.fallback_reason.is_some());
        assert_eq!(response.result.len(), 3);
        assert_eq!(response.saved_id, None);
        let saved = storage.get_course_by_id(course.id).await.unwrap().unwrap();
        assert!(saved.study_plan.is_empty());
    }

    #[tokio::test]
    async fn test_students_cannot_generate() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "BIO").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let student = test_support::user(&storage, "s1", UserRole::Student, None).await;
        let course = test_support::course(&storage, "BIO110", dept.id, teacher.id, 4).await;

        let client = ScriptedClient::reply(PLAN);
        let result = generate_study_plan_inner(
            &storage,
            &client,
            None,
            &student,
            course.id,
            GenerateStudyPlanRequest::default(),
        )
        .await;
        assert!(result.is_err());
        assert_eq!(client.call_count(), 0);
    }
}
