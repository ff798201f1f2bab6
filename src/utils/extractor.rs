//! 路径参数提取器
//!
//! 路径中的 ID 必须是正整数，否则直接返回 400 统一响应。

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};
use std::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

/// 解析路径中的正整数 ID
pub(crate) fn parse_positive_id(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
}

fn invalid_id_error(param: &str) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::BadRequest,
        format!("Invalid path parameter: {param}"),
    ));
    InternalError::from_response(format!("invalid {param}"), response).into()
}

/// 定义从指定路径参数读取 i64 ID 的提取器
#[macro_export]
macro_rules! define_safe_i64_extractor {
    ($name:ident, $param:literal) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name(pub i64);

        impl actix_web::FromRequest for $name {
            type Error = actix_web::Error;
            type Future = std::future::Ready<Result<Self, Self::Error>>;

            fn from_request(
                req: &actix_web::HttpRequest,
                _: &mut actix_web::dev::Payload,
            ) -> Self::Future {
                std::future::ready($crate::utils::extractor::extract_id(req, $param).map($name))
            }
        }
    };
}

#[doc(hidden)]
pub fn extract_id(req: &HttpRequest, param: &str) -> Result<i64, actix_web::Error> {
    parse_positive_id(req.match_info().get(param)).ok_or_else(|| invalid_id_error(param))
}

/// 通用 `{id}` 参数
#[derive(Debug, Clone, Copy)]
pub struct SafeIDI64(pub i64);

impl FromRequest for SafeIDI64 {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(extract_id(req, "id").map(SafeIDI64))
    }
}

define_safe_i64_extractor!(SafeCourseIdI64, "course_id");
define_safe_i64_extractor!(SafeEnrollmentIdI64, "enrollment_id");
define_safe_i64_extractor!(SafeAssignmentIdI64, "assignment_id");
define_safe_i64_extractor!(SafeSubmissionIdI64, "submission_id");
define_safe_i64_extractor!(SafeQuizIdI64, "quiz_id");
define_safe_i64_extractor!(SafeStudentIdI64, "student_id");
define_safe_i64_extractor!(SafeNotificationIdI64, "notification_id");

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_parse_positive_id() {
        assert_eq!(parse_positive_id(Some("42")), Some(42));
        assert_eq!(parse_positive_id(Some(" 7 ")), Some(7));
        assert_eq!(parse_positive_id(Some("0")), None);
        assert_eq!(parse_positive_id(Some("-3")), None);
        assert_eq!(parse_positive_id(Some("abc")), None);
        assert_eq!(parse_positive_id(None), None);
    }

    #[actix_web::test]
    async fn test_extract_from_match_info() {
        let req = TestRequest::default()
            .param("course_id", "12")
            .to_http_request();
        let id = SafeCourseIdI64::extract(&req).await.unwrap();
        assert_eq!(id.0, 12);

        let req = TestRequest::default().param("id", "x1").to_http_request();
        let err = SafeIDI64::extract(&req).await.unwrap_err();
        assert_eq!(
            err.error_response().status(),
            actix_web::http::StatusCode::BAD_REQUEST
        );
    }
}
