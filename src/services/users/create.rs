use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::errors::EduSystemError;
use crate::models::{
    ApiError, ApiResult, ErrorCode,
    audit_logs::entities::{NewAuditLog, actions},
    users::{
        entities::{User, UserRole},
        requests::{CreateUserRequest, NewUser},
        responses::UserResponse,
    },
};
use crate::services::{audit, current_user, respond_created};
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password, validate_username};

/// 确定新用户所属院系
///
/// 管理员可以创建任意角色；主管教师只能在本院系创建教师和学生。
fn resolve_department(actor: &User, request: &CreateUserRequest) -> ApiResult<Option<i64>> {
    match actor.role {
        UserRole::Admin => Ok(request.department_id),
        UserRole::Supervisor => {
            if !matches!(request.role, UserRole::Teacher | UserRole::Student) {
                return Err(ApiError::forbidden(
                    ErrorCode::UserRoleNotAllowed,
                    "Supervisors can only create teachers and students",
                ));
            }
            let own = actor.department_id.ok_or_else(|| {
                ApiError::forbidden(
                    ErrorCode::Forbidden,
                    "Supervisor is not assigned to a department",
                )
            })?;
            match request.department_id {
                Some(id) if id != own => Err(ApiError::forbidden(
                    ErrorCode::Forbidden,
                    "Supervisors can only create users in their own department",
                )),
                _ => Ok(Some(own)),
            }
        }
        _ => Err(ApiError::forbidden(
            ErrorCode::Forbidden,
            "You are not allowed to create users",
        )),
    }
}

pub(crate) async fn create_user_inner(
    storage: &dyn Storage,
    actor: &User,
    request: CreateUserRequest,
) -> ApiResult<User> {
    let department_id = resolve_department(actor, &request)?;

    let username = request.username.trim().to_string();
    let email = request.email.trim().to_lowercase();

    validate_username(&username)
        .map_err(|msg| ApiError::bad_request(ErrorCode::UserNameInvalid, msg))?;
    validate_email(&email).map_err(|msg| ApiError::bad_request(ErrorCode::UserEmailInvalid, msg))?;
    let policy = validate_password(&request.password);
    if !policy.is_valid {
        return Err(ApiError::bad_request(
            ErrorCode::UserPasswordInvalid,
            policy.error_message(),
        ));
    }

    if let Some(id) = department_id
        && storage.get_department_by_id(id).await?.is_none()
    {
        return Err(ApiError::not_found(
            ErrorCode::DepartmentNotFound,
            "Department not found",
        ));
    }

    if storage.username_exists(&username).await? {
        return Err(ApiError::conflict(
            ErrorCode::UserNameAlreadyExists,
            "Username already exists",
        ));
    }
    if storage.email_exists(&email).await? {
        return Err(ApiError::conflict(
            ErrorCode::UserEmailAlreadyExists,
            "Email already exists",
        ));
    }

    let password_hash = hash_password(&request.password)?;
    let display_name = Some(request.profile.display_name.trim().to_string())
        .filter(|name| !name.is_empty());

    let user = storage
        .create_user(NewUser {
            username,
            email,
            password_hash,
            role: request.role,
            display_name,
            avatar_url: request.profile.avatar_url,
            department_id,
        })
        .await
        .map_err(|e| match e {
            // 并发创建时由唯一约束兜底
            EduSystemError::Conflict(_) => ApiError::conflict(
                ErrorCode::UserNameAlreadyExists,
                "Username or email already exists",
            ),
            other => ApiError::from(other),
        })?;

    audit(
        storage,
        NewAuditLog::new(actor.id, actions::USER_CREATE, "user", Some(user.id))
            .details(serde_json::json!({ "role": user.role.to_string() })),
    )
    .await;
    tracing::info!("User {} created by {}", user.username, actor.username);

    Ok(user)
}

pub async fn create_user(
    service: &UserService,
    user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        create_user_inner(storage.as_ref(), &actor, user_data).await
    }
    .await;
    Ok(respond_created(
        result.map(|user| UserResponse { user }),
        "User created successfully",
    ))
}
