use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradeService;
use crate::models::{ApiResult, grades::responses::CourseGradesResponse, users::entities::User};
use crate::services::{current_user, ensure_course_staff, load_course, respond};
use crate::storage::Storage;

pub(crate) async fn course_grades_inner(
    storage: &dyn Storage,
    actor: &User,
    course_id: i64,
) -> ApiResult<CourseGradesResponse> {
    let course = load_course(storage, course_id).await?;
    ensure_course_staff(actor, &course)?;
    Ok(CourseGradesResponse {
        course_id: course.id,
        items: storage.list_course_grades(course.id).await?,
    })
}

pub async fn course_grades(
    service: &GradeService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        course_grades_inner(storage.as_ref(), &actor, course_id).await
    }
    .await;
    Ok(respond(result, "Course grades retrieved successfully"))
}
