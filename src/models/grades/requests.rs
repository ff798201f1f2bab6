use serde::Deserialize;
use ts_rs::TS;

/// 录入课程成绩
///
/// `numeric` 与 `letter` 至少提供一个；缺少等级时由分数换算。
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct RecordGradeRequest {
    pub student_id: i64,
    pub course_id: i64,
    pub numeric: Option<f64>,
    pub letter: Option<String>,
    pub comment: Option<String>,
}
