//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_edusystem_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum EduSystemError {
            $($variant(String),)*
        }

        impl EduSystemError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(EduSystemError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(EduSystemError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(EduSystemError::$variant(msg) => msg,)*
                }
            }
        }

        paste::paste! {
            impl EduSystemError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        EduSystemError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_edusystem_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    Io("E006", "IO Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Serialization("E009", "Serialization Error"),
    Conflict("E010", "Resource Conflict"),
    DateParse("E011", "Date Parse Error"),
    Authentication("E012", "Authentication Error"),
    Authorization("E013", "Authorization Error"),
    AiRequest("E014", "AI Request Error"),
    AiRefusal("E015", "AI Refusal"),
    AiParse("E016", "AI Response Parse Error"),
    AiNotConfigured("E017", "AI Not Configured"),
}

impl EduSystemError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// AI 生成失败时是否可以使用兜底内容
    ///
    /// 拒答与未配置不属于可兜底的失败。
    pub fn is_ai_recoverable(&self) -> bool {
        matches!(
            self,
            EduSystemError::AiRequest(_) | EduSystemError::AiParse(_)
        )
    }
}

impl fmt::Display for EduSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for EduSystemError {}

impl From<sea_orm::DbErr> for EduSystemError {
    fn from(err: sea_orm::DbErr) -> Self {
        EduSystemError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for EduSystemError {
    fn from(err: std::io::Error) -> Self {
        EduSystemError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for EduSystemError {
    fn from(err: serde_json::Error) -> Self {
        EduSystemError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for EduSystemError {
    fn from(err: chrono::ParseError) -> Self {
        EduSystemError::DateParse(err.to_string())
    }
}

impl From<reqwest::Error> for EduSystemError {
    fn from(err: reqwest::Error) -> Self {
        EduSystemError::AiRequest(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EduSystemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(EduSystemError::cache_connection("test").code(), "E001");
        assert_eq!(EduSystemError::validation("test").code(), "E007");
        assert_eq!(EduSystemError::conflict("test").code(), "E010");
        assert_eq!(EduSystemError::ai_refusal("test").code(), "E015");
        assert_eq!(EduSystemError::ai_not_configured("test").code(), "E017");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            EduSystemError::ai_parse("test").error_type(),
            "AI Response Parse Error"
        );
        assert_eq!(
            EduSystemError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_error_message() {
        let err = EduSystemError::validation("Invalid input");
        assert_eq!(err.message(), "Invalid input");
    }

    #[test]
    fn test_ai_recoverable() {
        assert!(EduSystemError::ai_request("timeout").is_ai_recoverable());
        assert!(EduSystemError::ai_parse("garbage").is_ai_recoverable());
        assert!(!EduSystemError::ai_refusal("sorry").is_ai_recoverable());
        assert!(!EduSystemError::ai_not_configured("no key").is_ai_recoverable());
        assert!(!EduSystemError::not_found("x").is_ai_recoverable());
    }

    #[test]
    fn test_format_simple() {
        let err = EduSystemError::conflict("Course code already exists");
        let formatted = err.format_simple();
        assert!(formatted.contains("Resource Conflict"));
        assert!(formatted.contains("Course code already exists"));
    }
}
