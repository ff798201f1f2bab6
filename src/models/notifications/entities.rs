use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 通知类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "notification.ts")]
pub enum NotificationKind {
    Enrollment,
    AssignmentPublished,
    SubmissionGraded,
    GradeRecorded,
    StudyPlanPublished,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NotificationKind::Enrollment => "enrollment",
            NotificationKind::AssignmentPublished => "assignment_published",
            NotificationKind::SubmissionGraded => "submission_graded",
            NotificationKind::GradeRecorded => "grade_recorded",
            NotificationKind::StudyPlanPublished => "study_plan_published",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enrollment" => Ok(NotificationKind::Enrollment),
            "assignment_published" => Ok(NotificationKind::AssignmentPublished),
            "submission_graded" => Ok(NotificationKind::SubmissionGraded),
            "grade_recorded" => Ok(NotificationKind::GradeRecorded),
            "study_plan_published" => Ok(NotificationKind::StudyPlanPublished),
            _ => Err(format!("Invalid notification kind: {s}")),
        }
    }
}

// 通知
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "notification.ts")]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub content: Option<String>,
    pub reference_type: Option<String>,
    pub reference_id: Option<i64>,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// 新建通知（服务层构造，存储层写入）
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub content: Option<String>,
    pub reference_type: Option<String>,
    pub reference_id: Option<i64>,
}

impl NewNotification {
    pub fn new(user_id: i64, kind: NotificationKind, title: impl Into<String>) -> Self {
        Self {
            user_id,
            kind,
            title: title.into(),
            content: None,
            reference_type: None,
            reference_id: None,
        }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn reference(mut self, reference_type: &str, reference_id: i64) -> Self {
        self.reference_type = Some(reference_type.to_string());
        self.reference_id = Some(reference_id);
        self
    }
}
