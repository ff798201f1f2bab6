use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{
    ApiError, ApiResponse, ApiResult, ErrorCode,
    auth::{requests::LoginRequest, responses::LoginResponse},
    users::entities::UserStatus,
};
use crate::storage::Storage;
use crate::utils::jwt;
use crate::utils::password::verify_password;

use super::AuthService;

/// 登录成功的结果：响应体与 refresh token
pub(crate) struct LoginOutcome {
    pub response: LoginResponse,
    pub refresh_token: String,
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized(ErrorCode::AuthFailed, "Username or password is incorrect")
}

pub(crate) async fn authenticate(
    storage: &dyn Storage,
    login_request: &LoginRequest,
    access_token_minutes: i64,
) -> ApiResult<LoginOutcome> {
    // 1. 根据用户名或邮箱获取用户信息
    let user = storage
        .get_user_by_username_or_email(login_request.username.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    // 2. 验证密码
    if !verify_password(&login_request.password, &user.password_hash) {
        return Err(invalid_credentials());
    }

    if user.status != UserStatus::Active {
        return Err(ApiError::forbidden(
            ErrorCode::AccountDisabled,
            "Account is not active",
        ));
    }

    // 3. 更新最后登录时间
    if let Err(e) = storage.update_last_login(user.id).await {
        tracing::warn!("Failed to update last login for {}: {}", user.id, e);
    }

    // 4. 生成令牌对
    let token_pair = user.generate_token_pair(None).map_err(|e| {
        tracing::error!("Failed to generate JWT token: {}", e);
        ApiError::internal("Login failed, unable to generate token")
    })?;

    tracing::info!("User {} logged in successfully", user.username);

    Ok(LoginOutcome {
        response: LoginResponse {
            access_token: token_pair.access_token,
            expires_in: access_token_minutes * 60,
            user,
        },
        refresh_token: token_pair.refresh_token,
    })
}

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = match service.get_storage(request) {
        Ok(storage) => storage,
        Err(err) => return Ok(err.into_response()),
    };
    let expiry = service.get_config().jwt.access_token_expiry;

    match authenticate(storage.as_ref(), &login_request, expiry).await {
        Ok(outcome) => {
            let refresh_cookie =
                jwt::JwtUtils::create_refresh_token_cookie(&outcome.refresh_token);
            Ok(HttpResponse::Ok()
                .cookie(refresh_cookie)
                .json(ApiResponse::success(outcome.response, "Login successful")))
        }
        Err(err) => Ok(err.into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::{entities::UserRole, requests::NewUser};
    use crate::storage::sea_orm_storage::test_support;
    use crate::utils::password::hash_password;

    async fn seeded_user(storage: &crate::storage::sea_orm_storage::SeaOrmStorage) {
        storage
            .create_user(NewUser {
                username: "alice".to_string(),
                email: "alice@example.edu".to_string(),
                password_hash: hash_password("Secret123").unwrap(),
                role: UserRole::Student,
                display_name: None,
                avatar_url: None,
                department_id: None,
            })
            .await
            .unwrap();
    }

    fn request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_by_username_or_email() {
        let storage = test_support::storage().await;
        seeded_user(&storage).await;

        let outcome = authenticate(&storage, &request("alice", "Secret123"), 15)
            .await
            .unwrap();
        assert_eq!(outcome.response.user.username, "alice");
        assert_eq!(outcome.response.expires_in, 900);
        assert!(jwt::JwtUtils::verify_access_token(&outcome.response.access_token).is_ok());
        assert!(jwt::JwtUtils::verify_refresh_token(&outcome.refresh_token).is_ok());

        let outcome = authenticate(&storage, &request("alice@example.edu", "Secret123"), 15)
            .await
            .unwrap();
        let stored = storage
            .get_user_by_id(outcome.response.user.id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.last_login.is_some());
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password_and_unknown_user() {
        let storage = test_support::storage().await;
        seeded_user(&storage).await;

        let err = authenticate(&storage, &request("alice", "wrong"), 15)
            .await
            .err()
            .unwrap();
        assert_eq!(err.code, ErrorCode::AuthFailed);

        let err = authenticate(&storage, &request("bob", "Secret123"), 15)
            .await
            .err()
            .unwrap();
        assert_eq!(err.code, ErrorCode::AuthFailed);
    }

    #[tokio::test]
    async fn test_login_rejects_non_active_accounts() {
        let storage = test_support::storage().await;
        seeded_user(&storage).await;
        let alice = storage
            .get_user_by_username_or_email("alice")
            .await
            .unwrap()
            .unwrap();

        for status in [UserStatus::Suspended, UserStatus::Inactive] {
            test_support::set_status(&storage, alice.id, status).await;
            let err = authenticate(&storage, &request("alice", "Secret123"), 15)
                .await
                .err()
                .unwrap();
            assert_eq!(err.code, ErrorCode::AccountDisabled);
            assert_eq!(err.status, actix_web::http::StatusCode::FORBIDDEN);
        }

        // 停用账号不更新登录时间
        let stored = storage.get_user_by_id(alice.id).await.unwrap().unwrap();
        assert!(stored.last_login.is_none());
    }
}
