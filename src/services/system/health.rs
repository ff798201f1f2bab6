use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode, web};
use chrono::{DateTime, Utc};

use super::SystemService;
use crate::models::{ApiResponse, AppStartTime, ErrorCode, system::responses::HealthResponse};
use crate::storage::Storage;

pub(crate) async fn build_health(
    storage: Option<&dyn Storage>,
    started_at: DateTime<Utc>,
    ai_configured: bool,
) -> HealthResponse {
    let database = match storage {
        Some(storage) => storage.ping().await,
        None => false,
    };
    HealthResponse {
        status: if database { "ok" } else { "degraded" }.to_string(),
        database,
        ai_configured,
        uptime_seconds: Utc::now().signed_duration_since(started_at).num_seconds(),
        started_at,
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// 健康检查，数据库不可用时返回 503
pub async fn health(service: &SystemService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let started_at = request
        .app_data::<web::Data<AppStartTime>>()
        .map(|t| t.start_datetime)
        .unwrap_or_else(Utc::now);
    let storage = service.get_storage(request).ok();
    let ai_configured = service.get_config().ai_enabled();

    let health = build_health(storage.as_deref(), started_at, ai_configured).await;
    if health.database {
        Ok(HttpResponse::Ok().json(ApiResponse::success(health, "Service is healthy")))
    } else {
        Ok(HttpResponse::build(StatusCode::SERVICE_UNAVAILABLE).json(ApiResponse::error(
            ErrorCode::ServiceUnavailable,
            health,
            "Database is unavailable",
        )))
    }
}
