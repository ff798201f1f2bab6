use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 测验题目
///
/// `options` 为空时按文本作答判分。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct QuizQuestion {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    /// 学生视图中为空并省略
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub correct_answer: String,
    #[serde(default = "default_points")]
    pub points: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

fn default_points() -> f64 {
    1.0
}

// 测验
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct Quiz {
    pub id: i64,
    pub course_id: i64,
    pub created_by: i64,
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<QuizQuestion>,
    pub time_limit_minutes: Option<i32>,
    pub published: bool,
    pub ai_generated: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Quiz {
    /// 总分
    pub fn max_score(&self) -> f64 {
        self.questions.iter().map(|q| q.points).sum()
    }

    /// 去掉答案与解析，供学生查看
    pub fn redacted(mut self) -> Self {
        for question in &mut self.questions {
            question.correct_answer.clear();
            question.explanation = None;
        }
        self
    }
}

// 测验作答记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct QuizAttempt {
    pub id: i64,
    pub quiz_id: i64,
    pub student_id: i64,
    /// 原始作答 JSON
    pub answers: serde_json::Value,
    pub score: f64,
    pub max_score: f64,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_hides_answers() {
        let quiz = Quiz {
            id: 1,
            course_id: 1,
            created_by: 1,
            title: "Q".into(),
            description: None,
            questions: vec![QuizQuestion {
                question: "2+2?".into(),
                options: vec!["3".into(), "4".into()],
                correct_answer: "B".into(),
                points: 2.0,
                explanation: Some("arithmetic".into()),
            }],
            time_limit_minutes: None,
            published: true,
            ai_generated: false,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert_eq!(quiz.max_score(), 2.0);

        let json = serde_json::to_value(quiz.redacted()).unwrap();
        let question = &json["questions"][0];
        assert!(question.get("correct_answer").is_none());
        assert!(question.get("explanation").is_none());
        assert_eq!(question["options"][1], "4");
    }
}
