use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AssignmentService;
use crate::models::{
    ApiError, ApiResult, ErrorCode,
    assignments::{entities::Assignment, requests::AssignmentListParams},
    users::entities::User,
};
use crate::services::{current_user, ensure_course_member, load_course, respond};
use crate::storage::Storage;

pub(crate) async fn list_assignments_inner(
    storage: &dyn Storage,
    actor: &User,
    params: AssignmentListParams,
) -> ApiResult<Vec<Assignment>> {
    let course_id = params
        .course_id
        .ok_or_else(|| ApiError::bad_request(ErrorCode::BadRequest, "course_id is required"))?;
    let course = load_course(storage, course_id).await?;
    ensure_course_member(storage, actor, &course).await?;
    Ok(storage.list_course_assignments(course.id).await?)
}

pub async fn list_assignments(
    service: &AssignmentService,
    params: AssignmentListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        list_assignments_inner(storage.as_ref(), &actor, params).await
    }
    .await;
    Ok(respond(result, "Assignments retrieved successfully"))
}
