use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AssignmentService;
use crate::models::{
    ApiError, ApiResult, ErrorCode, assignments::entities::Assignment, users::entities::User,
};
use crate::services::{current_user, ensure_course_member, load_course, respond};
use crate::storage::Storage;

pub(crate) async fn load_assignment(
    storage: &dyn Storage,
    assignment_id: i64,
) -> ApiResult<Assignment> {
    storage
        .get_assignment_by_id(assignment_id)
        .await?
        .ok_or_else(|| ApiError::not_found(ErrorCode::AssignmentNotFound, "Assignment not found"))
}

pub(crate) async fn get_assignment_inner(
    storage: &dyn Storage,
    actor: &User,
    assignment_id: i64,
) -> ApiResult<Assignment> {
    let assignment = load_assignment(storage, assignment_id).await?;
    let course = load_course(storage, assignment.course_id).await?;
    ensure_course_member(storage, actor, &course).await?;
    Ok(assignment)
}

pub async fn get_assignment(
    service: &AssignmentService,
    assignment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        get_assignment_inner(storage.as_ref(), &actor, assignment_id).await
    }
    .await;
    Ok(respond(result, "Assignment retrieved successfully"))
}
