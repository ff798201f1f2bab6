use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::errors::EduSystemError;
use crate::models::{
    ApiError, ApiResult, ErrorCode,
    audit_logs::entities::{NewAuditLog, actions},
    courses::{
        entities::Course,
        requests::{CreateCourseRequest, NewCourse},
    },
    users::entities::User,
};
use crate::services::{audit, current_user, respond_created};
use crate::storage::Storage;
use crate::utils::validate::validate_course_code;

const MAX_CREDITS: i32 = 20;

fn duplicate_code(code: &str) -> ApiError {
    ApiError::conflict(
        ErrorCode::CourseAlreadyExists,
        format!("Course code {code} already exists"),
    )
}

pub(crate) async fn create_course_inner(
    storage: &dyn Storage,
    actor: &User,
    request: CreateCourseRequest,
) -> ApiResult<Course> {
    // 管理员或本院系主管教师
    if !(actor.is_admin() || actor.supervises(request.department_id)) {
        return Err(ApiError::forbidden(
            ErrorCode::CoursePermissionDenied,
            "Only administrators or the department supervisor can create courses",
        ));
    }

    let code = request.code.trim().to_uppercase();
    validate_course_code(&code).map_err(|msg| ApiError::bad_request(ErrorCode::BadRequest, msg))?;

    let title = request.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::bad_request(
            ErrorCode::BadRequest,
            "Course title is required",
        ));
    }
    if !(1..=MAX_CREDITS).contains(&request.credits) {
        return Err(ApiError::bad_request(
            ErrorCode::BadRequest,
            format!("Credits must be between 1 and {MAX_CREDITS}"),
        ));
    }

    if storage
        .get_department_by_id(request.department_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found(
            ErrorCode::DepartmentNotFound,
            "Department not found",
        ));
    }

    let instructor = storage
        .get_user_by_id(request.instructor_id)
        .await?
        .ok_or_else(|| ApiError::not_found(ErrorCode::UserNotFound, "Instructor not found"))?;
    if !instructor.role.can_instruct() {
        return Err(ApiError::bad_request(
            ErrorCode::UserRoleNotAllowed,
            "Instructor must be a teacher or supervisor",
        ));
    }

    if storage.get_course_by_code(&code).await?.is_some() {
        return Err(duplicate_code(&code));
    }

    let course = storage
        .create_course(NewCourse {
            department_id: request.department_id,
            instructor_id: instructor.id,
            code: code.clone(),
            title,
            description: request
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            credits: request.credits,
        })
        .await
        .map_err(|e| match e {
            EduSystemError::Conflict(_) => duplicate_code(&code),
            other => ApiError::from(other),
        })?;

    audit(
        storage,
        NewAuditLog::new(actor.id, actions::COURSE_CREATE, "course", Some(course.id)).details(
            serde_json::json!({
                "code": course.code,
                "instructor_id": course.instructor_id,
            }),
        ),
    )
    .await;
    tracing::info!("Course {} created by {}", course.code, actor.username);

    Ok(course)
}

pub async fn create_course(
    service: &CourseService,
    data: CreateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        create_course_inner(storage.as_ref(), &actor, data).await
    }
    .await;
    Ok(respond_created(result, "Course created successfully"))
}
