/*!
 * JWT 认证中间件
 *
 * 验证 `Authorization: Bearer <token>` 中的 access token，
 * 通过后把当前用户放入请求扩展，供后续处理程序读取。
 *
 * ```rust,ignore
 * web::scope("/api/v1/courses")
 *     .wrap(RequireJWT)
 *     .route("", web::get().to(list_courses))
 * ```
 *
 * 用户信息按用户 ID 缓存，禁用或重置密码时调用 [`RequireJWT::invalidate_user`]。
 */

use crate::cache::ObjectCache;
use crate::config::AppConfig;
use crate::models::users::entities;
use crate::models::ErrorCode;
use crate::storage::Storage;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, error, info};

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Clone)]
pub struct RequireJWT;

fn user_cache_key(user_id: i64) -> String {
    format!("user:{user_id}")
}

enum AuthFailure {
    Unauthorized(&'static str),
    Disabled,
    Internal(&'static str),
}

// 提取并验证 JWT access token，返回当前用户
async fn extract_and_validate_jwt(req: &ServiceRequest) -> Result<entities::User, AuthFailure> {
    let token = req
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthFailure::Unauthorized("Missing or invalid Authorization header"))?;

    let claims = crate::utils::jwt::JwtUtils::verify_access_token(token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        AuthFailure::Unauthorized("Invalid or expired token")
    })?;

    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| AuthFailure::Unauthorized("Invalid user ID in token"))?;

    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone());

    let cached = match &cache {
        Some(cache) => cache.get_json::<entities::User>(&user_cache_key(user_id)).await,
        None => None,
    };

    let user = match cached {
        Some(user) => user,
        None => {
            let storage = req
                .app_data::<web::Data<Arc<dyn Storage>>>()
                .map(|data| data.get_ref().clone())
                .ok_or(AuthFailure::Internal("Storage not found in app data"))?;

            let user = storage
                .get_user_by_id(user_id)
                .await
                .map_err(|e| {
                    error!("Failed to load user {} for token: {}", user_id, e);
                    AuthFailure::Internal("Failed to retrieve user")
                })?
                .ok_or(AuthFailure::Unauthorized("User not found"))?;

            if let Some(cache) = &cache {
                cache
                    .insert_json(
                        user_cache_key(user_id),
                        &user,
                        AppConfig::get().cache.default_ttl,
                    )
                    .await;
            }
            user
        }
    };

    if user.status != entities::UserStatus::Active {
        return Err(AuthFailure::Disabled);
    }

    Ok(user)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 预检请求直接放行
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(HttpResponse::NoContent().finish().map_into_right_body()));
            }

            match extract_and_validate_jwt(&req).await {
                Ok(user) => {
                    debug!("JWT authentication successful for ID: {}", user.id);
                    req.extensions_mut().insert(user);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(failure) => {
                    let (status, code, message) = match failure {
                        AuthFailure::Unauthorized(msg) => {
                            (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, msg)
                        }
                        AuthFailure::Disabled => (
                            StatusCode::FORBIDDEN,
                            ErrorCode::AccountDisabled,
                            "Account is not active",
                        ),
                        AuthFailure::Internal(msg) => (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            ErrorCode::InternalServerError,
                            msg,
                        ),
                    };
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        message
                    );
                    Ok(req.into_response(
                        create_error_response(status, code, message).map_into_right_body(),
                    ))
                }
            }
        })
    }
}

// 辅助函数：从请求中提取用户信息
impl RequireJWT {
    /// 从请求扩展中提取当前用户
    /// 此函数应该在应用了RequireJWT中间件的路由处理程序中使用
    pub fn extract_user_claims(req: &actix_web::HttpRequest) -> Option<entities::User> {
        req.extensions().get::<entities::User>().cloned()
    }

    /// 从请求扩展中提取用户ID
    pub fn extract_user_id(req: &actix_web::HttpRequest) -> Option<i64> {
        req.extensions().get::<entities::User>().map(|user| user.id)
    }

    /// 用户信息变更后清除缓存
    pub async fn invalidate_user(cache: &dyn ObjectCache, user_id: i64) {
        cache.remove(&user_cache_key(user_id)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::object_cache::moka::MokaCacheWrapper;
    use crate::models::users::entities::{UserRole, UserStatus};
    use crate::storage::sea_orm_storage::test_support;
    use actix_web::{App, HttpRequest, test};

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match RequireJWT::extract_user_id(&req) {
            Some(id) => HttpResponse::Ok().body(id.to_string()),
            None => HttpResponse::InternalServerError().finish(),
        }
    }

    #[actix_web::test]
    async fn test_bearer_token_flow() {
        let storage = test_support::storage().await;
        let user = test_support::user(&storage, "teacher1", UserRole::Teacher, None).await;
        let storage: Arc<dyn Storage> = Arc::new(storage);
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(100, 60));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .app_data(web::Data::new(cache.clone()))
                .service(
                    web::scope("/p")
                        .wrap(RequireJWT)
                        .route("/me", web::get().to(whoami)),
                ),
        )
        .await;

        // 缺少 token
        let resp = test::call_service(&app, test::TestRequest::get().uri("/p/me").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        // refresh token 不能当作 access token
        let pair = user.generate_token_pair(None).unwrap();
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/p/me")
                .insert_header(("Authorization", format!("Bearer {}", pair.refresh_token)))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/p/me")
                .insert_header(("Authorization", format!("Bearer {}", pair.access_token)))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert_eq!(body, user.id.to_string());
    }

    #[actix_web::test]
    async fn test_non_active_user_is_rejected() {
        let storage = Arc::new(test_support::storage().await);
        let cached_user = test_support::user(&storage, "student1", UserRole::Student, None).await;
        let stored_user = test_support::user(&storage, "student2", UserRole::Student, None).await;
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(100, 60));

        // 缓存中的用户已被停用
        let mut deactivated = cached_user.clone();
        deactivated.status = UserStatus::Inactive;
        cache
            .insert_json(user_cache_key(cached_user.id), &deactivated, 60)
            .await;
        // 未缓存，数据库中已暂停
        test_support::set_status(&storage, stored_user.id, UserStatus::Suspended).await;

        let dyn_storage: Arc<dyn Storage> = storage.clone();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(dyn_storage))
                .app_data(web::Data::new(cache.clone()))
                .service(
                    web::scope("/p")
                        .wrap(RequireJWT)
                        .route("/me", web::get().to(whoami)),
                ),
        )
        .await;

        for user in [&cached_user, &stored_user] {
            let pair = user.generate_token_pair(None).unwrap();
            let resp = test::call_service(
                &app,
                test::TestRequest::get()
                    .uri("/p/me")
                    .insert_header(("Authorization", format!("Bearer {}", pair.access_token)))
                    .to_request(),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN);
            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body["code"], ErrorCode::AccountDisabled as i32);
        }
    }
}
