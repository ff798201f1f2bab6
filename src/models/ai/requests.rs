use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "ai.ts")]
pub struct GenerateStudyPlanRequest {
    /// 周数，超出配置范围时会被截断
    pub weeks: Option<u32>,
    pub focus: Option<String>,
    #[serde(default)]
    pub save: bool,
    /// 兜底内容默认不保存
    #[serde(default)]
    pub save_fallback: bool,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "ai.ts")]
pub struct GenerateQuizRequest {
    pub count: Option<u32>,
    pub difficulty: Option<String>,
    pub topic: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "ai.ts")]
pub struct GenerateAssignmentRequest {
    pub topic: String,
    pub week: Option<u32>,
    pub deadline: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub save: bool,
}
