use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::EduSystemError;
use crate::models::ErrorCode;

// 统一的API响应结构
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "api.ts")]
pub struct ApiResponse<T: TS> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T: TS> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: Some(data),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error(code: ErrorCode, data: T, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: Some(data),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// 错误到 HTTP 状态码与业务码的映射
pub fn error_status(err: &EduSystemError) -> (StatusCode, ErrorCode) {
    match err {
        EduSystemError::Validation(_) | EduSystemError::DateParse(_) => {
            (StatusCode::BAD_REQUEST, ErrorCode::BadRequest)
        }
        EduSystemError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
        EduSystemError::Conflict(_) => (StatusCode::CONFLICT, ErrorCode::Conflict),
        EduSystemError::Authentication(_) => (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized),
        EduSystemError::Authorization(_) => (StatusCode::FORBIDDEN, ErrorCode::Forbidden),
        EduSystemError::AiRefusal(_) => (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::AiRefused),
        EduSystemError::AiRequest(_) => (StatusCode::BAD_GATEWAY, ErrorCode::AiRequestFailed),
        EduSystemError::AiParse(_) => (StatusCode::BAD_GATEWAY, ErrorCode::AiParseFailed),
        EduSystemError::AiNotConfigured(_) => {
            (StatusCode::SERVICE_UNAVAILABLE, ErrorCode::AiNotConfigured)
        }
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalServerError,
        ),
    }
}

/// 将错误转换为统一的错误响应
///
/// 内部错误只返回简短描述，详情写入日志。
pub fn error_response(err: &EduSystemError) -> HttpResponse {
    ApiError::from(err.clone()).into_response()
}

/// 服务层错误：HTTP 状态码与业务码一起决定
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message: String,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn unauthorized(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, message)
    }

    pub fn forbidden(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, code, message)
    }

    pub fn not_found(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message)
    }

    pub fn conflict(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, code, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalServerError,
            message,
        )
    }

    pub fn into_response(self) -> HttpResponse {
        if self.status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("{}", self.message);
            return HttpResponse::build(self.status)
                .json(ApiResponse::error_empty(self.code, "Internal server error"));
        }
        HttpResponse::build(self.status).json(ApiResponse::error_empty(self.code, self.message))
    }
}

impl From<EduSystemError> for ApiError {
    fn from(err: EduSystemError) -> Self {
        let (status, code) = error_status(&err);
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            err.format_simple()
        } else {
            err.message().to_string()
        };
        Self::new(status, code, message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:?}): {}", self.status, self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            error_status(&EduSystemError::not_found("x")).0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(&EduSystemError::conflict("x")).0,
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(&EduSystemError::ai_refusal("x")),
            (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::AiRefused)
        );
        assert_eq!(
            error_status(&EduSystemError::ai_not_configured("x")).0,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            error_status(&EduSystemError::database_operation("x")).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_from_domain_error() {
        let err = ApiError::from(EduSystemError::conflict("course code exists"));
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.message, "course code exists");

        let resp = ApiError::from(EduSystemError::database_operation("disk full")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_success_envelope() {
        let resp = ApiResponse::success(5_i32, "ok");
        assert_eq!(resp.code, 0);
        let json = serde_json::to_value(&ApiResponse::success_empty("done")).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["message"], "done");
    }
}
