use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;

use super::AssignmentService;
use crate::models::{
    ApiError, ApiResult, ErrorCode,
    assignments::{
        entities::Assignment,
        requests::{CreateAssignmentRequest, NewAssignment},
    },
    courses::entities::Course,
    notifications::entities::{NewNotification, NotificationKind},
    users::entities::User,
};
use crate::services::{current_user, ensure_course_staff, load_course, notify, respond_created};
use crate::storage::Storage;

/// 校验作业字段
pub(crate) fn validate_assignment(assignment: &NewAssignment) -> ApiResult<()> {
    if assignment.title.trim().is_empty() {
        return Err(ApiError::bad_request(
            ErrorCode::AssignmentInvalid,
            "Assignment title is required",
        ));
    }
    if !assignment.max_score.is_finite() || assignment.max_score <= 0.0 {
        return Err(ApiError::bad_request(
            ErrorCode::AssignmentInvalid,
            "Max score must be greater than 0",
        ));
    }
    if let Some(deadline) = assignment.deadline
        && deadline <= Utc::now()
    {
        return Err(ApiError::bad_request(
            ErrorCode::AssignmentInvalid,
            "Deadline must be in the future",
        ));
    }
    Ok(())
}

/// 创建作业并通知在读学生
pub(crate) async fn publish_assignment(
    storage: &dyn Storage,
    course: &Course,
    assignment: NewAssignment,
) -> ApiResult<Assignment> {
    validate_assignment(&assignment)?;
    let assignment = storage.create_assignment(assignment).await?;

    let notifications = storage
        .list_active_student_ids(course.id)
        .await?
        .into_iter()
        .map(|student_id| {
            let mut notification = NewNotification::new(
                student_id,
                NotificationKind::AssignmentPublished,
                format!("New assignment in {}: {}", course.code, assignment.title),
            )
            .reference("assignment", assignment.id);
            if let Some(deadline) = assignment.deadline {
                notification =
                    notification.content(format!("Due {}", deadline.format("%Y-%m-%d %H:%M UTC")));
            }
            notification
        })
        .collect();
    notify(storage, notifications).await;

    Ok(assignment)
}

pub(crate) async fn create_assignment_inner(
    storage: &dyn Storage,
    actor: &User,
    request: CreateAssignmentRequest,
) -> ApiResult<Assignment> {
    let course = load_course(storage, request.course_id).await?;
    ensure_course_staff(actor, &course)?;

    publish_assignment(
        storage,
        &course,
        NewAssignment {
            course_id: course.id,
            created_by: actor.id,
            title: request.title.trim().to_string(),
            description: request.description,
            max_score: request.max_score,
            deadline: request.deadline,
            ai_generated: false,
        },
    )
    .await
}

pub async fn create_assignment(
    service: &AssignmentService,
    data: CreateAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        create_assignment_inner(storage.as_ref(), &actor, data).await
    }
    .await;
    Ok(respond_created(result, "Assignment created successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support;
    use chrono::Duration;

    fn request(course_id: i64, max_score: f64, deadline_in: Option<Duration>) -> CreateAssignmentRequest {
        CreateAssignmentRequest {
            course_id,
            title: "Homework 1".to_string(),
            description: None,
            max_score,
            deadline: deadline_in.map(|d| Utc::now() + d),
        }
    }

    #[tokio::test]
    async fn test_create_assignment_notifies_students() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "CS").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let student = test_support::user(&storage, "s1", UserRole::Student, None).await;
        let course = test_support::course(&storage, "CS101", dept.id, teacher.id, 3).await;
        storage.create_enrollment(course.id, student.id).await.unwrap();

        let assignment =
            create_assignment_inner(&storage, &teacher, request(course.id, 50.0, Some(Duration::days(7))))
                .await
                .unwrap();
        assert!(!assignment.ai_generated);
        assert_eq!(storage.count_unread_notifications(student.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_assignment_validation() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "CS").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let student = test_support::user(&storage, "s1", UserRole::Student, None).await;
        let course = test_support::course(&storage, "CS101", dept.id, teacher.id, 3).await;

        let err = create_assignment_inner(&storage, &teacher, request(course.id, 0.0, None))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AssignmentInvalid);

        let err = create_assignment_inner(
            &storage,
            &teacher,
            request(course.id, 10.0, Some(Duration::hours(-1))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::AssignmentInvalid);

        let err = create_assignment_inner(&storage, &student, request(course.id, 10.0, None))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CoursePermissionDenied);
    }
}
