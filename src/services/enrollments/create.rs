use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EnrollmentService;
use crate::errors::EduSystemError;
use crate::models::{
    ApiError, ApiResult, ErrorCode,
    enrollments::{entities::Enrollment, requests::CreateEnrollmentRequest},
    notifications::entities::{NewNotification, NotificationKind},
    users::entities::User,
};
use crate::services::{current_user, ensure_course_staff, load_course, notify, respond_created};
use crate::storage::Storage;

pub(crate) async fn enroll_student_inner(
    storage: &dyn Storage,
    actor: &User,
    course_id: i64,
    request: CreateEnrollmentRequest,
) -> ApiResult<Enrollment> {
    let course = load_course(storage, course_id).await?;
    ensure_course_staff(actor, &course)?;

    let student = storage
        .get_user_by_id(request.student_id)
        .await?
        .ok_or_else(|| ApiError::not_found(ErrorCode::UserNotFound, "Student not found"))?;
    if !student.is_student() {
        return Err(ApiError::bad_request(
            ErrorCode::UserRoleNotAllowed,
            "Only students can be enrolled",
        ));
    }

    let enrollment = storage
        .create_enrollment(course.id, student.id)
        .await
        .map_err(|e| match e {
            EduSystemError::Conflict(_) => ApiError::conflict(
                ErrorCode::EnrollmentAlreadyExists,
                "Student is already enrolled in this course",
            ),
            other => ApiError::from(other),
        })?;

    notify(
        storage,
        vec![
            NewNotification::new(
                student.id,
                NotificationKind::Enrollment,
                format!("Enrolled in {}", course.code),
            )
            .content(format!("You have been enrolled in {}.", course.title))
            .reference("course", course.id),
        ],
    )
    .await;

    Ok(enrollment)
}

pub async fn enroll_student(
    service: &EnrollmentService,
    course_id: i64,
    data: CreateEnrollmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        enroll_student_inner(storage.as_ref(), &actor, course_id, data).await
    }
    .await;
    Ok(respond_created(result, "Student enrolled successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support;

    #[tokio::test]
    async fn test_enrollment_rules() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "CS").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let other = test_support::user(&storage, "t2", UserRole::Teacher, Some(dept.id)).await;
        let student = test_support::user(&storage, "s1", UserRole::Student, None).await;
        let course = test_support::course(&storage, "CS101", dept.id, teacher.id, 3).await;

        let enrollment = enroll_student_inner(
            &storage,
            &teacher,
            course.id,
            CreateEnrollmentRequest {
                student_id: student.id,
            },
        )
        .await
        .unwrap();
        assert_eq!(enrollment.student_id, student.id);
        assert_eq!(storage.count_unread_notifications(student.id).await.unwrap(), 1);

        let err = enroll_student_inner(
            &storage,
            &teacher,
            course.id,
            CreateEnrollmentRequest {
                student_id: student.id,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::EnrollmentAlreadyExists);

        // 非本课程教师
        let err = enroll_student_inner(
            &storage,
            &other,
            course.id,
            CreateEnrollmentRequest {
                student_id: student.id,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::CoursePermissionDenied);

        // 教师不能被选课
        let err = enroll_student_inner(
            &storage,
            &teacher,
            course.id,
            CreateEnrollmentRequest {
                student_id: other.id,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::UserRoleNotAllowed);
    }
}
