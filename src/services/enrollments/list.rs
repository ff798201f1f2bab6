use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EnrollmentService;
use crate::models::{ApiResult, enrollments::entities::Enrollment, users::entities::User};
use crate::services::{current_user, ensure_course_staff, load_course, respond};
use crate::storage::Storage;

pub(crate) async fn list_enrollments_inner(
    storage: &dyn Storage,
    actor: &User,
    course_id: i64,
) -> ApiResult<Vec<Enrollment>> {
    let course = load_course(storage, course_id).await?;
    ensure_course_staff(actor, &course)?;
    Ok(storage.list_course_enrollments(course.id).await?)
}

pub async fn list_enrollments(
    service: &EnrollmentService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        list_enrollments_inner(storage.as_ref(), &actor, course_id).await
    }
    .await;
    Ok(respond(result, "Enrollments retrieved successfully"))
}
