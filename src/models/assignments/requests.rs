use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::pagination::deserialize_optional_i64;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct CreateAssignmentRequest {
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    #[serde(default = "default_max_score")]
    pub max_score: f64,
    pub deadline: Option<chrono::DateTime<chrono::Utc>>,
}

pub(crate) fn default_max_score() -> f64 {
    100.0
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentListParams {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub course_id: Option<i64>,
}

// 存储层创建参数
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub course_id: i64,
    pub created_by: i64,
    pub title: String,
    pub description: Option<String>,
    pub max_score: f64,
    pub deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub ai_generated: bool,
}
