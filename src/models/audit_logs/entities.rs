use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 审计动作
pub mod actions {
    pub const USER_CREATE: &str = "user.create";
    pub const USER_RESET_PASSWORD: &str = "user.reset_password";
    pub const DEPARTMENT_CREATE: &str = "department.create";
    pub const COURSE_CREATE: &str = "course.create";
    pub const STUDY_PLAN_UPDATE: &str = "course.study_plan_update";
    pub const GRADE_RECORD: &str = "grade.record";
    pub const AI_GENERATE: &str = "ai.generate";
}

// 审计日志
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "audit_log.ts")]
pub struct AuditLog {
    pub id: i64,
    pub actor_id: Option<i64>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<i64>,
    pub details: Option<serde_json::Value>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub actor_id: Option<i64>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<i64>,
    pub details: Option<serde_json::Value>,
}

impl NewAuditLog {
    pub fn new(actor_id: i64, action: &str, entity_type: &str, entity_id: Option<i64>) -> Self {
        Self {
            actor_id: Some(actor_id),
            action: action.to_string(),
            entity_type: entity_type.to_string(),
            entity_id,
            details: None,
        }
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
