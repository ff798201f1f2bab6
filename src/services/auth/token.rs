use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{
    ApiError, ApiResponse, ApiResult, ErrorCode,
    auth::responses::{CurrentUserResponse, RefreshTokenResponse},
    users::entities::UserStatus,
};
use crate::storage::Storage;
use crate::utils::jwt;

use super::AuthService;

/// 用 refresh token 换取新的 access token
///
/// 用户被删除或停用后 refresh token 随之失效。
pub(crate) async fn exchange_refresh_token(
    storage: &dyn Storage,
    refresh_token: &str,
) -> ApiResult<String> {
    let invalid = || {
        ApiError::unauthorized(
            ErrorCode::RefreshTokenInvalid,
            "Login expired or invalid, please login again",
        )
    };

    let claims = jwt::JwtUtils::verify_refresh_token(refresh_token).map_err(|e| {
        tracing::info!("Refresh token rejected: {}", e);
        invalid()
    })?;
    let user_id = claims.sub.parse::<i64>().map_err(|_| invalid())?;

    let user = storage
        .get_user_by_id(user_id)
        .await?
        .filter(|user| user.status == UserStatus::Active)
        .ok_or_else(invalid)?;

    jwt::JwtUtils::generate_access_token(user.id, &user.role.to_string()).map_err(|e| {
        tracing::error!("Failed to generate access token: {}", e);
        ApiError::internal("Unable to generate token")
    })
}

pub async fn handle_refresh_token(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let config = service.get_config();
    // 从 cookie 中提取 refresh token
    let Some(refresh_token) = jwt::JwtUtils::extract_refresh_token_from_cookie(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        )));
    };

    let storage = match service.get_storage(request) {
        Ok(storage) => storage,
        Err(err) => return Ok(err.into_response()),
    };

    match exchange_refresh_token(storage.as_ref(), &refresh_token).await {
        Ok(access_token) => {
            let response = RefreshTokenResponse {
                access_token,
                expires_in: config.jwt.access_token_expiry * 60,
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Token refreshed successfully",
            )))
        }
        Err(err) => {
            // 清除无效的 refresh token cookie
            let mut response = err.into_response();
            if response.status() == actix_web::http::StatusCode::UNAUTHORIZED {
                let _ = response.add_cookie(&jwt::JwtUtils::create_empty_refresh_token_cookie());
            }
            Ok(response)
        }
    }
}

pub async fn handle_get_user(
    _service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    Ok(super::super::respond(
        super::super::current_user(request).map(|user| CurrentUserResponse { user }),
        "User information retrieved successfully",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support;

    #[tokio::test]
    async fn test_refresh_requires_refresh_token_and_live_user() {
        let storage = test_support::storage().await;
        let user = test_support::user(&storage, "bob", UserRole::Teacher, None).await;
        let pair = user.generate_token_pair(None).unwrap();

        let access = exchange_refresh_token(&storage, &pair.refresh_token)
            .await
            .unwrap();
        let claims = jwt::JwtUtils::verify_access_token(&access).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.role, "teacher");

        // access token 不能用来刷新
        let err = exchange_refresh_token(&storage, &pair.access_token)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RefreshTokenInvalid);

        // 不存在的用户
        let orphan = jwt::JwtUtils::generate_refresh_token(9999, "teacher", None).unwrap();
        assert!(exchange_refresh_token(&storage, &orphan).await.is_err());
    }
}
