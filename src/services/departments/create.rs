use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use super::DepartmentService;
use crate::cache::ObjectCache;
use crate::errors::EduSystemError;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiError, ApiResult, ErrorCode,
    audit_logs::entities::{NewAuditLog, actions},
    departments::{entities::Department, requests::CreateDepartmentRequest},
    users::entities::{User, UserRole},
};
use crate::services::{audit, current_user, respond_created};
use crate::storage::Storage;
use crate::utils::validate::validate_department_code;

pub(crate) async fn create_department_inner(
    storage: &dyn Storage,
    actor: &User,
    request: CreateDepartmentRequest,
) -> ApiResult<Department> {
    if !actor.is_admin() {
        return Err(ApiError::forbidden(
            ErrorCode::Forbidden,
            "Only administrators can create departments",
        ));
    }

    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request(
            ErrorCode::BadRequest,
            "Department name is required",
        ));
    }
    let code = request.code.trim().to_uppercase();
    validate_department_code(&code).map_err(|msg| ApiError::bad_request(ErrorCode::BadRequest, msg))?;

    // 负责人必须是主管教师，且不能已隶属其他院系
    if let Some(head_id) = request.head_id {
        let head = storage
            .get_user_by_id(head_id)
            .await?
            .ok_or_else(|| ApiError::not_found(ErrorCode::UserNotFound, "Head user not found"))?;
        if head.role != UserRole::Supervisor {
            return Err(ApiError::bad_request(
                ErrorCode::UserRoleNotAllowed,
                "Department head must be a supervisor",
            ));
        }
        if head.department_id.is_some() {
            return Err(ApiError::bad_request(
                ErrorCode::UserRoleNotAllowed,
                "Department head already belongs to another department",
            ));
        }
    }

    let department = storage
        .create_department(name, &code, request.head_id)
        .await
        .map_err(|e| match e {
            EduSystemError::Conflict(_) => ApiError::conflict(
                ErrorCode::DepartmentAlreadyExists,
                format!("Department code {code} already exists"),
            ),
            other => ApiError::from(other),
        })?;

    // 负责人归入新院系，院系权限随之生效
    if let Some(head_id) = department.head_id {
        storage
            .update_user_department(head_id, Some(department.id))
            .await?;
    }

    audit(
        storage,
        NewAuditLog::new(
            actor.id,
            actions::DEPARTMENT_CREATE,
            "department",
            Some(department.id),
        )
        .details(serde_json::json!({ "code": department.code })),
    )
    .await;

    Ok(department)
}

pub async fn create_department(
    service: &DepartmentService,
    data: CreateDepartmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        create_department_inner(storage.as_ref(), &actor, data).await
    }
    .await;

    // 负责人的院系变了，清掉认证缓存里的旧用户信息
    let head_id = result.as_ref().ok().and_then(|department| department.head_id);
    if let (Some(head_id), Some(cache)) = (
        head_id,
        request.app_data::<web::Data<Arc<dyn ObjectCache>>>(),
    ) {
        RequireJWT::invalidate_user(cache.get_ref().as_ref(), head_id).await;
    }
    Ok(respond_created(result, "Department created successfully"))
}
