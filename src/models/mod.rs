//! 数据模型定义
//!
//! 业务实体、请求与响应结构，以及统一的业务错误码。

pub mod ai;
pub mod audit_logs;
pub mod auth;
pub mod common;
pub mod courses;
pub mod departments;
pub mod enrollments;
pub mod assignments;
pub mod grades;
pub mod notifications;
pub mod quizzes;
pub mod submissions;
pub mod system;
pub mod users;

pub use common::{
    ApiError, ApiResponse, ApiResult, PaginatedResponse, PaginationInfo, PaginationQuery,
};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误码
///
/// 0 表示成功，其余按业务域分段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,
    ServiceUnavailable = 1503,

    // 认证
    AuthFailed = 2000,
    RefreshTokenInvalid = 2001,
    AccountDisabled = 2002,

    // 用户
    UserNotFound = 3000,
    UserNameInvalid = 3001,
    UserEmailInvalid = 3002,
    UserPasswordInvalid = 3003,
    UserNameAlreadyExists = 3004,
    UserEmailAlreadyExists = 3005,
    UserCreationFailed = 3006,
    UserRoleNotAllowed = 3007,

    // 院系
    DepartmentNotFound = 3100,
    DepartmentAlreadyExists = 3101,

    // 课程
    CourseNotFound = 4000,
    CourseAlreadyExists = 4001,
    CoursePermissionDenied = 4002,
    StudyPlanInvalid = 4003,

    // 选课
    EnrollmentNotFound = 4100,
    EnrollmentAlreadyExists = 4101,
    NotEnrolled = 4102,

    // 作业与提交
    AssignmentNotFound = 5000,
    AssignmentInvalid = 5001,
    AssignmentDeadlinePassed = 5002,
    SubmissionNotFound = 5100,
    SubmissionAlreadyExists = 5101,
    ScoreOutOfRange = 5102,

    // 测验
    QuizNotFound = 5200,
    QuizInvalid = 5201,
    QuizNotPublished = 5202,

    // 成绩
    GradeInvalid = 6000,

    // 通知
    NotificationNotFound = 6100,

    // AI 生成
    AiRequestFailed = 7000,
    AiRefused = 7001,
    AiParseFailed = 7002,
    AiNotConfigured = 7003,
}
