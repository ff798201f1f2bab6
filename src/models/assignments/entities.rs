use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 作业
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct Assignment {
    pub id: i64,
    pub course_id: i64,
    pub created_by: i64,
    pub title: String,
    pub description: Option<String>,
    pub max_score: f64,
    pub deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub ai_generated: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Assignment {
    /// 指定时间点是否已过截止时间
    pub fn is_past_deadline(&self, at: chrono::DateTime<chrono::Utc>) -> bool {
        self.deadline.is_some_and(|deadline| at > deadline)
    }
}
