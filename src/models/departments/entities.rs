use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 院系
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "department.ts")]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub code: String,
    /// 院系负责人（主管教师）
    pub head_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
