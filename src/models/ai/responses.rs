use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// AI 生成结果
///
/// `fallback` 为 true 时 `result` 是静态兜底内容，`fallback_reason` 记录失败原因。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "ai.ts")]
pub struct GenerationResponse<T: TS> {
    pub generation_id: String,
    pub course_id: i64,
    pub fallback: bool,
    pub fallback_reason: Option<String>,
    pub cached: bool,
    /// 保存后的记录 id（学习计划保存时为课程 id）
    pub saved_id: Option<i64>,
    pub result: T,
}
