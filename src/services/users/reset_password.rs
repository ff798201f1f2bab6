use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use super::UserService;
use crate::cache::ObjectCache;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiError, ApiResponse, ApiResult, ErrorCode,
    audit_logs::entities::{NewAuditLog, actions},
    users::{entities::User, entities::UserRole, requests::ResetPasswordRequest},
};
use crate::services::{audit, current_user};
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::validate::validate_password;

/// 管理员可以重置任何人；主管教师只能重置本院系的教师和学生
fn can_reset(actor: &User, target: &User) -> bool {
    if actor.is_admin() {
        return true;
    }
    matches!(target.role, UserRole::Teacher | UserRole::Student)
        && target
            .department_id
            .is_some_and(|dept| actor.supervises(dept))
}

pub(crate) async fn reset_password_inner(
    storage: &dyn Storage,
    actor: &User,
    user_id: i64,
    new_password: &str,
) -> ApiResult<()> {
    let target = storage
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(ErrorCode::UserNotFound, "User not found"))?;

    if !can_reset(actor, &target) {
        return Err(ApiError::forbidden(
            ErrorCode::Forbidden,
            "You are not allowed to reset this user's password",
        ));
    }

    let policy = validate_password(new_password);
    if !policy.is_valid {
        return Err(ApiError::bad_request(
            ErrorCode::UserPasswordInvalid,
            policy.error_message(),
        ));
    }

    let hash = hash_password(new_password)?;
    if !storage.update_user_password(target.id, &hash).await? {
        return Err(ApiError::not_found(ErrorCode::UserNotFound, "User not found"));
    }

    audit(
        storage,
        NewAuditLog::new(actor.id, actions::USER_RESET_PASSWORD, "user", Some(target.id)),
    )
    .await;
    tracing::info!(
        "Password of user {} reset by {}",
        target.username,
        actor.username
    );
    Ok(())
}

pub async fn reset_password(
    service: &UserService,
    user_id: i64,
    reset_data: ResetPasswordRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        reset_password_inner(storage.as_ref(), &actor, user_id, &reset_data.new_password).await
    }
    .await;

    match result {
        Ok(()) => {
            if let Some(cache) = request.app_data::<web::Data<Arc<dyn ObjectCache>>>() {
                RequireJWT::invalidate_user(cache.get_ref().as_ref(), user_id).await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Password reset successfully")))
        }
        Err(err) => Ok(err.into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_support;
    use crate::utils::password::verify_password;

    #[tokio::test]
    async fn test_supervisor_reset_scope() {
        let storage = test_support::storage().await;
        let cs = test_support::department(&storage, "CS").await;
        let head = test_support::user(&storage, "head", UserRole::Supervisor, Some(cs.id)).await;
        let teacher = test_support::user(&storage, "teach", UserRole::Teacher, Some(cs.id)).await;
        let outsider = test_support::user(&storage, "out", UserRole::Teacher, None).await;
        let admin = test_support::user(&storage, "root", UserRole::Admin, None).await;

        reset_password_inner(&storage, &head, teacher.id, "N3wPassword")
            .await
            .unwrap();
        let stored = storage.get_user_by_id(teacher.id).await.unwrap().unwrap();
        assert!(verify_password("N3wPassword", &stored.password_hash));

        assert!(
            reset_password_inner(&storage, &head, outsider.id, "N3wPassword")
                .await
                .is_err()
        );
        // 管理员账号只能由管理员重置
        assert!(
            reset_password_inner(&storage, &head, admin.id, "N3wPassword")
                .await
                .is_err()
        );
        assert!(
            reset_password_inner(&storage, &admin, admin.id, "N3wPassword")
                .await
                .is_ok()
        );

        let err = reset_password_inner(&storage, &admin, teacher.id, "weak")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UserPasswordInvalid);
    }
}
