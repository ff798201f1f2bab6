use serde::Deserialize;
use ts_rs::TS;

use super::entities::QuizQuestion;
use crate::models::common::pagination::deserialize_optional_i64;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct CreateQuizRequest {
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<QuizQuestion>,
    pub time_limit_minutes: Option<i32>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct QuizListParams {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub course_id: Option<i64>,
}

/// 作答请求
///
/// `answers` 可以是按题号排列的数组，也可以是以题号为键的对象。
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct SubmitAttemptRequest {
    pub answers: serde_json::Value,
}

// 存储层创建参数
#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub course_id: i64,
    pub created_by: i64,
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<QuizQuestion>,
    pub time_limit_minutes: Option<i32>,
    pub ai_generated: bool,
}
