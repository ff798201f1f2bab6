use serde::Serialize;
use ts_rs::TS;

use super::entities::Grade;

/// 带课程信息的成绩
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct CourseGrade {
    #[serde(flatten)]
    #[ts(flatten)]
    pub grade: Grade,
    pub course_code: String,
    pub course_title: String,
    pub credits: i32,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct StudentGradesResponse {
    pub student_id: i64,
    pub grades: Vec<CourseGrade>,
    pub total_credits: i32,
    pub gpa: f64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct CourseGradesResponse {
    pub course_id: i64,
    pub items: Vec<Grade>,
}
