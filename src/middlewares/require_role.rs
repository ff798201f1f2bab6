/*!
 * 角色门禁中间件
 *
 * 放在 [`RequireJWT`](super::RequireJWT) 内层使用：当前用户的角色属于给定集合才放行，
 * 否则返回 403。未经过认证的请求返回 401。
 *
 * ```rust,ignore
 * web::scope("/api/v1/audit-logs")
 *     .wrap(RequireRole::new_any(UserRole::manager_roles()))
 *     .wrap(RequireJWT)
 *     .route("", web::get().to(list_audit_logs))
 * ```
 *
 * 细粒度的权限（课程教师、院系主管）由各服务自行判断，这里只做粗筛。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::models::{
    ErrorCode,
    users::entities::{User, UserRole},
};

use super::create_error_response;

#[derive(Clone)]
pub struct RequireRole {
    allowed: Rc<[UserRole]>,
}

impl RequireRole {
    /// 允许列表中的任一角色
    pub fn new_any(roles: &[&UserRole]) -> Self {
        Self {
            allowed: roles.iter().map(|role| (*role).clone()).collect(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            allowed: self.allowed.clone(),
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    allowed: Rc<[UserRole]>,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
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
        let allowed = self.allowed.clone();

        Box::pin(async move {
            let caller = req
                .extensions()
                .get::<User>()
                .map(|user| (user.id, user.role.clone()));

            let (status, code, message) = match caller {
                Some((_, role)) if allowed.contains(&role) => {
                    return Ok(srv.call(req).await?.map_into_left_body());
                }
                Some((user_id, role)) => {
                    info!(
                        "User {} with role {} denied on {}, allowed roles: {:?}",
                        user_id,
                        role,
                        req.path(),
                        allowed
                    );
                    (StatusCode::FORBIDDEN, ErrorCode::Forbidden, "Access denied.")
                }
                None => {
                    info!("Role check on {} without an authenticated user", req.path());
                    (
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::Unauthorized,
                        "Authentication required",
                    )
                }
            };

            Ok(req.into_response(create_error_response(status, code, message).map_into_right_body()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middlewares::RequireJWT;
    use crate::storage::{Storage, sea_orm_storage::test_support};
    use actix_web::{App, HttpResponse, test, web};
    use std::sync::Arc;

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[actix_web::test]
    async fn test_staff_scope_rejects_students() {
        let storage = test_support::storage().await;
        let student = test_support::user(&storage, "s1", UserRole::Student, None).await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, None).await;
        let storage: Arc<dyn Storage> = Arc::new(storage);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .service(
                    web::scope("/staff")
                        .wrap(RequireRole::new_any(UserRole::staff_roles()))
                        .wrap(RequireJWT)
                        .route("", web::get().to(ok)),
                )
                .service(
                    web::scope("/open")
                        .wrap(RequireRole::new_any(UserRole::staff_roles()))
                        .route("", web::get().to(ok)),
                ),
        )
        .await;

        let bearer = |user: &User| {
            let pair = user.generate_token_pair(None).unwrap();
            format!("Bearer {}", pair.access_token)
        };

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/staff")
                .insert_header(("Authorization", bearer(&student)))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::Forbidden as i32);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/staff")
                .insert_header(("Authorization", bearer(&teacher)))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        // 没有经过 JWT 的请求
        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/open").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
