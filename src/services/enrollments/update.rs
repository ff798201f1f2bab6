use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EnrollmentService;
use crate::models::{
    ApiError, ApiResult, ErrorCode,
    enrollments::{entities::Enrollment, requests::UpdateEnrollmentRequest},
    users::entities::User,
};
use crate::services::{current_user, ensure_course_staff, load_course, respond};
use crate::storage::Storage;

pub(crate) async fn update_enrollment_inner(
    storage: &dyn Storage,
    actor: &User,
    course_id: i64,
    enrollment_id: i64,
    request: UpdateEnrollmentRequest,
) -> ApiResult<Enrollment> {
    let course = load_course(storage, course_id).await?;
    ensure_course_staff(actor, &course)?;

    let not_found =
        || ApiError::not_found(ErrorCode::EnrollmentNotFound, "Enrollment not found");

    // 路径中的课程与选课记录必须一致
    storage
        .get_enrollment_by_id(enrollment_id)
        .await?
        .filter(|e| e.course_id == course.id)
        .ok_or_else(not_found)?;

    storage
        .update_enrollment_status(enrollment_id, request.status)
        .await?
        .ok_or_else(not_found)
}

pub async fn update_enrollment(
    service: &EnrollmentService,
    course_id: i64,
    enrollment_id: i64,
    data: UpdateEnrollmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        update_enrollment_inner(storage.as_ref(), &actor, course_id, enrollment_id, data).await
    }
    .await;
    Ok(respond(result, "Enrollment updated successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enrollments::entities::EnrollmentStatus;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support;

    #[tokio::test]
    async fn test_update_checks_course_match() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "CS").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let student = test_support::user(&storage, "s1", UserRole::Student, None).await;
        let course = test_support::course(&storage, "CS101", dept.id, teacher.id, 3).await;
        let other = test_support::course(&storage, "CS102", dept.id, teacher.id, 3).await;
        let enrollment = storage.create_enrollment(course.id, student.id).await.unwrap();

        let updated = update_enrollment_inner(
            &storage,
            &teacher,
            course.id,
            enrollment.id,
            UpdateEnrollmentRequest {
                status: EnrollmentStatus::Completed,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.status, EnrollmentStatus::Completed);

        let err = update_enrollment_inner(
            &storage,
            &teacher,
            other.id,
            enrollment.id,
            UpdateEnrollmentRequest {
                status: EnrollmentStatus::Dropped,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::EnrollmentNotFound);
    }
}
