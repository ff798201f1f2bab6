use super::entities::{UserProfile, UserRole};
use serde::Deserialize;
use ts_rs::TS;

// 用户创建请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    #[serde(default)]
    pub profile: UserProfile,
    /// 主管教师创建时可省略，默认为其所在院系
    pub department_id: Option<i64>,
}

// 重置密码请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

// 存储层创建参数（密码已哈希）
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub department_id: Option<i64>,
}
