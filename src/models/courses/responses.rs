use serde::Serialize;
use ts_rs::TS;

use super::entities::{Course, StudyPlanWeek};
use crate::models::PaginationInfo;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseListResponse {
    pub items: Vec<Course>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct StudyPlanResponse {
    pub course_id: i64,
    pub weeks: Vec<StudyPlanWeek>,
}
