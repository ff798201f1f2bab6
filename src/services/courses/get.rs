use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::{ApiResult, courses::entities::Course, users::entities::User};
use crate::services::{current_user, ensure_course_member, load_course, respond};
use crate::storage::Storage;

pub(crate) async fn get_course_inner(
    storage: &dyn Storage,
    actor: &User,
    course_id: i64,
) -> ApiResult<Course> {
    let course = load_course(storage, course_id).await?;
    ensure_course_member(storage, actor, &course).await?;
    Ok(course)
}

pub async fn get_course(
    service: &CourseService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        get_course_inner(storage.as_ref(), &actor, course_id).await
    }
    .await;
    Ok(respond(result, "Course retrieved successfully"))
}
