use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::models::{
    ApiError, ApiResult, ErrorCode,
    users::{entities::User, responses::UserResponse},
};
use crate::services::{current_user, respond};
use crate::storage::Storage;

/// 本人、管理员或该用户所在院系的主管教师可以查看
pub(crate) fn can_view_user(actor: &User, target: &User) -> bool {
    actor.id == target.id
        || actor.is_admin()
        || target
            .department_id
            .is_some_and(|dept| actor.supervises(dept))
}

pub(crate) async fn get_user_inner(
    storage: &dyn Storage,
    actor: &User,
    user_id: i64,
) -> ApiResult<User> {
    let user = storage
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(ErrorCode::UserNotFound, "User not found"))?;

    if !can_view_user(actor, &user) {
        return Err(ApiError::forbidden(
            ErrorCode::Forbidden,
            "You are not allowed to view this user",
        ));
    }
    Ok(user)
}

pub async fn get_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        get_user_inner(storage.as_ref(), &actor, user_id).await
    }
    .await;
    Ok(respond(
        result.map(|user| UserResponse { user }),
        "User information retrieved successfully",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support;

    #[tokio::test]
    async fn test_user_visibility() {
        let storage = test_support::storage().await;
        let cs = test_support::department(&storage, "CS").await;
        let math = test_support::department(&storage, "MATH").await;
        let head = test_support::user(&storage, "head", UserRole::Supervisor, Some(cs.id)).await;
        let other_head =
            test_support::user(&storage, "mhead", UserRole::Supervisor, Some(math.id)).await;
        let student = test_support::user(&storage, "stud", UserRole::Student, Some(cs.id)).await;
        let peer = test_support::user(&storage, "peer", UserRole::Student, Some(cs.id)).await;

        assert!(get_user_inner(&storage, &student, student.id).await.is_ok());
        assert!(get_user_inner(&storage, &head, student.id).await.is_ok());
        assert!(get_user_inner(&storage, &other_head, student.id).await.is_err());
        assert!(get_user_inner(&storage, &peer, student.id).await.is_err());

        let err = get_user_inner(&storage, &head, 9999).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }
}
