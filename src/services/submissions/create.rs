use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{DateTime, Utc};

use super::SubmissionService;
use crate::errors::EduSystemError;
use crate::models::{
    ApiError, ApiResult, ErrorCode,
    submissions::{entities::Submission, requests::CreateSubmissionRequest},
    users::entities::User,
};
use crate::services::assignments::get::load_assignment;
use crate::services::{current_user, is_enrolled, respond_created};
use crate::storage::Storage;

fn already_submitted() -> ApiError {
    ApiError::conflict(
        ErrorCode::SubmissionAlreadyExists,
        "You have already submitted this assignment",
    )
}

/// 提交作业
///
/// 只有在读学生可以提交；截止后拒绝；每人只能提交一次。
pub(crate) async fn create_submission_inner(
    storage: &dyn Storage,
    actor: &User,
    assignment_id: i64,
    request: CreateSubmissionRequest,
    now: DateTime<Utc>,
) -> ApiResult<Submission> {
    let assignment = load_assignment(storage, assignment_id).await?;

    if !actor.is_student() || !is_enrolled(storage, assignment.course_id, actor.id, true).await? {
        return Err(ApiError::forbidden(
            ErrorCode::NotEnrolled,
            "Only students enrolled in the course can submit",
        ));
    }

    if assignment.is_past_deadline(now) {
        return Err(ApiError::bad_request(
            ErrorCode::AssignmentDeadlinePassed,
            "The deadline for this assignment has passed",
        ));
    }

    let content = request.content.trim();
    if content.is_empty() {
        return Err(ApiError::bad_request(
            ErrorCode::BadRequest,
            "Submission content is required",
        ));
    }

    if storage
        .get_student_submission(assignment.id, actor.id)
        .await?
        .is_some()
    {
        return Err(already_submitted());
    }

    storage
        .create_submission(assignment.id, actor.id, content)
        .await
        .map_err(|e| match e {
            EduSystemError::Conflict(_) => already_submitted(),
            other => ApiError::from(other),
        })
}

pub async fn create_submission(
    service: &SubmissionService,
    assignment_id: i64,
    data: CreateSubmissionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        create_submission_inner(storage.as_ref(), &actor, assignment_id, data, Utc::now()).await
    }
    .await;
    Ok(respond_created(result, "Submission received"))
}
