use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 学习计划中的一周
///
/// 所有列表字段在对外输出时都已补齐，不会缺失。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct StudyPlanWeek {
    pub week: u32,
    pub title: String,
    pub objectives: Vec<String>,
    pub topics: Vec<String>,
    pub readings: Vec<String>,
    pub activities: Vec<String>,
    pub assessments: Vec<String>,
    pub outcomes: Vec<String>,
}

impl StudyPlanWeek {
    pub fn empty(week: u32) -> Self {
        Self {
            week,
            title: format!("Week {week}"),
            objectives: Vec::new(),
            topics: Vec::new(),
            readings: Vec::new(),
            activities: Vec::new(),
            assessments: Vec::new(),
            outcomes: Vec::new(),
        }
    }
}

// 课程
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct Course {
    pub id: i64,
    pub department_id: i64,
    pub instructor_id: i64,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub credits: i32,
    pub study_plan: Vec<StudyPlanWeek>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
