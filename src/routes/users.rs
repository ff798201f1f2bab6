use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::{CreateUserRequest, ResetPasswordRequest};
use crate::services::UserService;
use crate::utils::SafeIDI64;

// 懒加载的全局 UserService 实例
static USER_SERVICE: Lazy<UserService> = Lazy::new(UserService::new_lazy);

pub async fn create_user(
    req: HttpRequest,
    user_data: web::Json<CreateUserRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.create_user(user_data.into_inner(), &req).await
}

pub async fn get_user(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.get_user(user_id.0, &req).await
}

pub async fn reset_password(
    req: HttpRequest,
    user_id: SafeIDI64,
    reset_data: web::Json<ResetPasswordRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .reset_password(user_id.0, reset_data.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/users")
            .wrap(middlewares::RequireJWT)
            .route("/{id}", web::get().to(get_user))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::manager_roles()))
                    .route("", web::post().to(create_user))
                    .route("/{id}/reset-password", web::post().to(reset_password)),
            ),
    );
}
