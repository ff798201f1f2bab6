use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::PaginationQuery;
use crate::models::common::pagination::deserialize_optional_i64;

// 创建课程请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CreateCourseRequest {
    pub department_id: i64,
    pub instructor_id: i64,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default = "default_credits")]
    pub credits: i32,
}

fn default_credits() -> i32 {
    3
}

// 课程列表查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub department_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub instructor_id: Option<i64>,
    pub search: Option<String>,
}

// 课程列表查询（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct CourseListQuery {
    pub page: u64,
    pub size: u64,
    pub department_id: Option<i64>,
    pub instructor_id: Option<i64>,
    /// 只返回该学生已选的课程
    pub student_id: Option<i64>,
    pub search: Option<String>,
}

// 手动编写学习计划
//
// 接受与 AI 输出相同的结构（数组，或包裹在 weeks 等字段下的对象）。
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct UpdateStudyPlanRequest {
    #[ts(type = "unknown")]
    pub weeks: serde_json::Value,
}

// 存储层创建参数
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub department_id: i64,
    pub instructor_id: i64,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub credits: i32,
}
