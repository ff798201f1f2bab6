use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::quizzes::entities::QuizQuestion;

/// 生成内容的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "ai.ts")]
pub enum GenerationKind {
    StudyPlan,
    Quiz,
    Assignment,
}

impl GenerationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationKind::StudyPlan => "study_plan",
            GenerationKind::Quiz => "quiz",
            GenerationKind::Assignment => "assignment",
        }
    }
}

/// AI 生成的测验
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "ai.ts")]
pub struct GeneratedQuiz {
    pub title: String,
    pub questions: Vec<QuizQuestion>,
}

/// AI 生成的作业
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "ai.ts")]
pub struct GeneratedAssignment {
    pub title: String,
    pub description: String,
    pub max_score: f64,
    pub rubric: Vec<String>,
    pub deliverables: Vec<String>,
}

impl GeneratedAssignment {
    /// 拼接为可保存的作业说明
    pub fn full_description(&self) -> String {
        let mut text = self.description.clone();
        if !self.deliverables.is_empty() {
            text.push_str("\n\nDeliverables:");
            for item in &self.deliverables {
                text.push_str("\n- ");
                text.push_str(item);
            }
        }
        if !self.rubric.is_empty() {
            text.push_str("\n\nRubric:");
            for item in &self.rubric {
                text.push_str("\n- ");
                text.push_str(item);
            }
        }
        text
    }
}
