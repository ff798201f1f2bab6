pub mod ai;
pub mod assignments;
pub mod audit_logs;
pub mod auth;
pub mod courses;
pub mod departments;
pub mod enrollments;
pub mod grades;
pub mod notifications;
pub mod quizzes;
pub mod submissions;
pub mod system;
pub mod users;

pub use ai::AiService;
pub use assignments::AssignmentService;
pub use audit_logs::AuditLogService;
pub use auth::AuthService;
pub use courses::CourseService;
pub use departments::DepartmentService;
pub use enrollments::EnrollmentService;
pub use grades::GradeService;
pub use notifications::NotificationService;
pub use quizzes::QuizService;
pub use submissions::SubmissionService;
pub use system::SystemService;
pub use users::UserService;

use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use ts_rs::TS;

use crate::models::{
    ApiError, ApiResponse, ApiResult, ErrorCode,
    audit_logs::entities::NewAuditLog,
    courses::entities::Course,
    enrollments::entities::EnrollmentStatus,
    notifications::entities::NewNotification,
    users::entities::User,
};
use crate::middlewares::RequireJWT;
use crate::storage::Storage;

/// 从应用数据中取出存储
pub(crate) fn storage_from_request(request: &HttpRequest) -> ApiResult<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| ApiError::internal("Storage not found in app data"))
}

/// 当前登录用户（由 RequireJWT 写入）
pub(crate) fn current_user(request: &HttpRequest) -> ApiResult<User> {
    RequireJWT::extract_user_claims(request)
        .ok_or_else(|| ApiError::unauthorized(ErrorCode::Unauthorized, "Authentication required"))
}

/// 统一的成功/失败响应
pub(crate) fn respond<T: Serialize + TS>(result: ApiResult<T>, message: &str) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(ApiResponse::success(data, message)),
        Err(err) => err.into_response(),
    }
}

pub(crate) fn respond_created<T: Serialize + TS>(
    result: ApiResult<T>,
    message: &str,
) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Created().json(ApiResponse::success(data, message)),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn load_course(storage: &dyn Storage, course_id: i64) -> ApiResult<Course> {
    storage
        .get_course_by_id(course_id)
        .await?
        .ok_or_else(|| ApiError::not_found(ErrorCode::CourseNotFound, "Course not found"))
}

/// 课程负责人：授课教师、所在院系的主管教师或管理员
pub(crate) fn is_course_staff(user: &User, course: &Course) -> bool {
    user.is_admin() || course.instructor_id == user.id || user.supervises(course.department_id)
}

pub(crate) fn ensure_course_staff(user: &User, course: &Course) -> ApiResult<()> {
    if is_course_staff(user, course) {
        Ok(())
    } else {
        Err(ApiError::forbidden(
            ErrorCode::CoursePermissionDenied,
            "Only course staff can perform this action",
        ))
    }
}

/// 学生是否在读（退课不算）
pub(crate) async fn is_enrolled(
    storage: &dyn Storage,
    course_id: i64,
    student_id: i64,
    active_only: bool,
) -> ApiResult<bool> {
    let enrollment = storage.get_enrollment(course_id, student_id).await?;
    Ok(enrollment.is_some_and(|e| match e.status {
        EnrollmentStatus::Active => true,
        EnrollmentStatus::Completed => !active_only,
        EnrollmentStatus::Dropped => false,
    }))
}

/// 课程成员：课程负责人或选了这门课的学生
pub(crate) async fn ensure_course_member(
    storage: &dyn Storage,
    user: &User,
    course: &Course,
) -> ApiResult<()> {
    if is_course_staff(user, course) {
        return Ok(());
    }
    if user.is_student() && is_enrolled(storage, course.id, user.id, false).await? {
        return Ok(());
    }
    Err(ApiError::forbidden(
        ErrorCode::CoursePermissionDenied,
        "You are not a member of this course",
    ))
}

/// 写通知，失败不影响主流程
pub(crate) async fn notify(storage: &dyn Storage, notifications: Vec<NewNotification>) {
    if notifications.is_empty() {
        return;
    }
    if let Err(e) = storage.create_notifications(notifications).await {
        warn!("Failed to create notifications: {}", e);
    }
}

/// 写审计日志，失败不影响主流程
pub(crate) async fn audit(storage: &dyn Storage, log: NewAuditLog) {
    let action = log.action.clone();
    if let Err(e) = storage.create_audit_log(log).await {
        warn!("Failed to write audit log {}: {}", action, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support;

    #[tokio::test]
    async fn test_course_staff_and_membership() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "CS").await;
        let other = test_support::department(&storage, "MATH").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let head = test_support::user(&storage, "head", UserRole::Supervisor, Some(dept.id)).await;
        let foreign_head =
            test_support::user(&storage, "head2", UserRole::Supervisor, Some(other.id)).await;
        let admin = test_support::user(&storage, "root", UserRole::Admin, None).await;
        let student = test_support::user(&storage, "s1", UserRole::Student, None).await;
        let outsider = test_support::user(&storage, "s2", UserRole::Student, None).await;
        let course = test_support::course(&storage, "CS101", dept.id, teacher.id, 3).await;

        assert!(is_course_staff(&teacher, &course));
        assert!(is_course_staff(&head, &course));
        assert!(is_course_staff(&admin, &course));
        assert!(!is_course_staff(&foreign_head, &course));
        assert!(!is_course_staff(&student, &course));

        let enrollment = storage.create_enrollment(course.id, student.id).await.unwrap();
        assert!(ensure_course_member(&storage, &student, &course).await.is_ok());
        let err = ensure_course_member(&storage, &outsider, &course)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CoursePermissionDenied);

        storage
            .update_enrollment_status(enrollment.id, EnrollmentStatus::Dropped)
            .await
            .unwrap();
        assert!(ensure_course_member(&storage, &student, &course).await.is_err());
    }
}
