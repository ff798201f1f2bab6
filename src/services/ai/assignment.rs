use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AiService;
use super::generate::{finish, run_generation};
use crate::ai::{CompletionClient, fallback, normalize::normalize_assignment, prompts};
use crate::cache::ObjectCache;
use crate::models::{
    ApiError, ApiResult, ErrorCode,
    ai::{
        entities::{GeneratedAssignment, GenerationKind},
        requests::GenerateAssignmentRequest,
        responses::GenerationResponse,
    },
    assignments::requests::NewAssignment,
    users::entities::User,
};
use crate::services::assignments::create::publish_assignment;
use crate::services::{current_user, ensure_course_staff, load_course, respond};
use crate::storage::Storage;

pub(crate) async fn generate_assignment_inner(
    storage: &dyn Storage,
    client: &dyn CompletionClient,
    cache: Option<&dyn ObjectCache>,
    actor: &User,
    course_id: i64,
    request: GenerateAssignmentRequest,
) -> ApiResult<GenerationResponse<GeneratedAssignment>> {
    let course = load_course(storage, course_id).await?;
    ensure_course_staff(actor, &course)?;

    let topic = request.topic.trim();
    if topic.is_empty() {
        return Err(ApiError::bad_request(
            ErrorCode::AssignmentInvalid,
            "Assignment topic is required",
        ));
    }

    let prompt = prompts::assignment_prompt(&course, topic, request.week);
    let generation = run_generation(
        client,
        cache,
        GenerationKind::Assignment,
        prompt,
        |value| normalize_assignment(value, topic),
        || fallback::assignment(&course, topic),
    )
    .await?;

    let saved_id = if request.save && !generation.is_fallback() {
        let assignment = publish_assignment(
            storage,
            &course,
            NewAssignment {
                course_id: course.id,
                created_by: actor.id,
                title: generation.result.title.clone(),
                description: Some(generation.result.full_description()),
                max_score: generation.result.max_score,
                deadline: request.deadline,
                ai_generated: true,
            },
        )
        .await?;
        Some(assignment.id)
    } else {
        None
    };

    Ok(finish(
        storage,
        actor,
        course.id,
        GenerationKind::Assignment,
        client.model_name(),
        generation,
        saved_id,
    )
    .await)
}

pub async fn generate_assignment(
    service: &AiService,
    course_id: i64,
    data: GenerateAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        let client = service.get_client(request)?;
        let cache = service.get_cache(request);
        generate_assignment_inner(
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
    Ok(respond(result, "Assignment generated"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::audit_logs::{entities::actions, requests::AuditLogListQuery};
    use crate::models::users::entities::UserRole;
    use crate::services::ai::test_client::ScriptedClient;
    use crate::storage::sea_orm_storage::test_support;

    fn request(topic: &str, save: bool) -> GenerateAssignmentRequest {
        GenerateAssignmentRequest {
            topic: topic.to_string(),
            week: Some(3),
            deadline: Some(chrono::Utc::now() + chrono::Duration::days(7)),
            save,
        }
    }

    #[tokio::test]
    async fn test_generate_and_publish_assignment() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "BIO").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let course = test_support::course(&storage, "BIO110", dept.id, teacher.id, 4).await;

        let client = ScriptedClient::reply(
            r#"[{"instructions": "Describe osmosis.", "points": 50,
                 "rubric": [{"criterion": "Accuracy", "points": 30}, "Clarity"],
                 "deliverables": "Two-page essay"}]"#,
        );
        let response = generate_assignment_inner(
            &storage,
            &client,
            None,
            &teacher,
            course.id,
            request("Osmosis", true),
        )
        .await
        .unwrap();

        assert_eq!(response.result.title, "Assignment: Osmosis");
        assert_eq!(response.result.max_score, 50.0);
        assert_eq!(response.result.rubric, vec!["Accuracy (30 pts)", "Clarity"]);

        let saved = storage
            .get_assignment_by_id(response.saved_id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(saved.ai_generated);
        assert!(saved.description.unwrap().contains("Two-page essay"));

        let logs = storage
            .list_audit_logs(AuditLogListQuery {
                action: Some(actions::AI_GENERATE.to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(logs.pagination.total, 1);
        let details = logs.items[0].details.clone().unwrap();
        assert_eq!(details["generation_id"], serde_json::json!(response.generation_id));
    }

    #[tokio::test]
    async fn test_blank_topic_rejected() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "BIO").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let course = test_support::course(&storage, "BIO110", dept.id, teacher.id, 4).await;

        let client = ScriptedClient::reply("{}");
        let err = generate_assignment_inner(
            &storage,
            &client,
            None,
            &teacher,
            course.id,
            request("  ", false),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::AssignmentInvalid);
        assert_eq!(client.call_count(), 0);
    }
}
