//! 规范化模型输出
//!
//! 模型输出的字段名和结构并不稳定，这里接受常见的别名与包装形式，
//! 补齐缺失字段，保证调用方拿到的结构总是完整的。
//! 返回 `None` 表示结构完全不可用。

use serde_json::{Map, Value};

use crate::models::ai::entities::{GeneratedAssignment, GeneratedQuiz};
use crate::models::courses::entities::StudyPlanWeek;
use crate::models::quizzes::entities::QuizQuestion;

const PLAN_WRAPPER_KEYS: &[&str] = &["weeks", "studyPlan", "study_plan", "plan"];
const QUIZ_WRAPPER_KEYS: &[&str] = &["questions", "quiz", "items"];
const DEFAULT_MAX_SCORE: f64 = 100.0;

/// 按别名顺序取第一个存在且非 null 的字段
fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|v| !v.is_null())
}

fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    field(obj, keys).and_then(value_to_text)
}

fn value_to_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

/// 字符串包装为单元素列表，非字符串元素转为 JSON 文本
fn list_field(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    match field(obj, keys) {
        None => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter_map(value_to_text).collect(),
        Some(other) => value_to_text(other).into_iter().collect(),
    }
}

/// 数字或 "Week 3" 这样的字符串
fn number_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    match field(obj, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let digits: String = s
                .chars()
                .skip_while(|c| !c.is_ascii_digit())
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

fn unwrap_list<'a>(value: &'a Value, wrapper_keys: &[&str]) -> Option<Vec<&'a Value>> {
    match value {
        Value::Array(items) => Some(items.iter().collect()),
        Value::Object(obj) => match field(obj, wrapper_keys) {
            Some(Value::Array(items)) => Some(items.iter().collect()),
            Some(inner @ Value::Object(_)) => unwrap_list(inner, wrapper_keys),
            _ => None,
        },
        _ => None,
    }
}

// ---------- 学习计划 ----------

/// 规范化学习计划
///
/// 接受裸数组、用 `weeks` 等键包装的数组，或单个周对象。结果按周次排序。
pub fn normalize_study_plan(value: &Value) -> Option<Vec<StudyPlanWeek>> {
    let items = match unwrap_list(value, PLAN_WRAPPER_KEYS) {
        Some(items) => items,
        // 单个周对象
        None if value.is_object() => vec![value],
        None => return None,
    };

    let mut weeks: Vec<StudyPlanWeek> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| normalize_week(item, index as u32 + 1))
        .collect();

    weeks.sort_by_key(|w| w.week);
    Some(weeks)
}

fn normalize_week(item: &Value, position: u32) -> Option<StudyPlanWeek> {
    let obj = match item {
        Value::Object(obj) => obj,
        // 只有标题的周
        Value::String(s) if !s.trim().is_empty() => {
            let mut week = StudyPlanWeek::empty(position);
            week.title = s.trim().to_string();
            return Some(week);
        }
        _ => return None,
    };

    let week = number_field(obj, &["week", "weekNumber", "week_number", "number"])
        .filter(|n| *n >= 1.0)
        .map(|n| n as u32)
        .unwrap_or(position);

    Some(StudyPlanWeek {
        week,
        title: text_field(obj, &["title", "theme", "name"]).unwrap_or_else(|| format!("Week {week}")),
        objectives: list_field(obj, &["objectives", "learningObjectives", "learning_objectives", "goals"]),
        topics: list_field(obj, &["topics", "topic", "content"]),
        readings: list_field(obj, &["readings", "reading", "resources"]),
        activities: list_field(obj, &["activities", "activity"]),
        assessments: list_field(obj, &["assessments", "assessment"]),
        outcomes: list_field(obj, &["outcomes", "learningOutcomes", "learning_outcomes"]),
    })
}

// ---------- 测验 ----------

/// 规范化测验，没有可用题目时返回 `None`
pub fn normalize_quiz(value: &Value, default_title: &str) -> Option<GeneratedQuiz> {
    let items = unwrap_list(value, QUIZ_WRAPPER_KEYS)?;

    let questions: Vec<QuizQuestion> = items.into_iter().filter_map(normalize_question).collect();
    if questions.is_empty() {
        return None;
    }

    let title = value
        .as_object()
        .and_then(|obj| text_field(obj, &["title", "name"]))
        .unwrap_or_else(|| default_title.to_string());

    Some(GeneratedQuiz { title, questions })
}

fn normalize_question(item: &Value) -> Option<QuizQuestion> {
    let obj = item.as_object()?;
    let question = text_field(obj, &["question", "text", "prompt"])?;

    let options = match field(obj, &["options", "choices", "answers"]) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(value_to_text)
            .map(|s| strip_option_label(&s))
            .collect(),
        // {"A": "...", "B": "..."}
        Some(Value::Object(map)) => map
            .values()
            .filter_map(value_to_text)
            .map(|s| strip_option_label(&s))
            .collect(),
        _ => Vec::new(),
    };

    let correct_answer =
        text_field(obj, &["correct_answer", "answer", "correctAnswer", "correct"]).unwrap_or_default();

    let points = number_field(obj, &["points", "score"])
        .filter(|p| *p > 0.0)
        .unwrap_or(1.0);

    Some(QuizQuestion {
        question,
        options,
        correct_answer,
        points,
        explanation: text_field(obj, &["explanation", "rationale"]),
    })
}

/// 去掉选项前的 "A. " / "B) " / "(C) " 标记
fn strip_option_label(option: &str) -> String {
    let trimmed = option.trim();
    let mut chars = trimmed.chars();
    let stripped = match (chars.next(), chars.next(), chars.next()) {
        (Some('('), Some(l), Some(')')) if l.is_ascii_alphabetic() => Some(&trimmed[3..]),
        (Some(l), Some('.' | ')' | ':'), Some(' ')) if l.is_ascii_alphabetic() => Some(&trimmed[2..]),
        _ => None,
    };
    match stripped.map(str::trim) {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => trimmed.to_string(),
    }
}

// ---------- 作业 ----------

/// 规范化作业，接受对象或数组的第一个元素
pub fn normalize_assignment(value: &Value, topic: &str) -> Option<GeneratedAssignment> {
    let obj = match value {
        Value::Object(obj) => match field(obj, &["assignment"]) {
            Some(Value::Object(inner)) => inner,
            _ => obj,
        },
        Value::Array(items) => items.first()?.as_object()?,
        _ => return None,
    };

    let rubric = match field(obj, &["rubric", "criteria", "grading"]) {
        Some(Value::Array(items)) => items.iter().filter_map(rubric_item).collect(),
        Some(other) => rubric_item(other).into_iter().collect(),
        None => Vec::new(),
    };

    Some(GeneratedAssignment {
        title: text_field(obj, &["title", "name"]).unwrap_or_else(|| format!("Assignment: {topic}")),
        description: text_field(obj, &["description", "instructions", "prompt", "task"])
            .unwrap_or_default(),
        max_score: number_field(obj, &["max_score", "maxScore", "points", "total_points"])
            .filter(|s| *s > 0.0)
            .unwrap_or(DEFAULT_MAX_SCORE),
        rubric,
        deliverables: list_field(obj, &["deliverables", "deliverable", "submission"]),
    })
}

// {"criterion": "...", "points": 20} -> "... (20 pts)"
fn rubric_item(item: &Value) -> Option<String> {
    match item {
        Value::Object(obj) => {
            let name = text_field(obj, &["criterion", "name", "title", "description"])?;
            match number_field(obj, &["points", "weight", "score"]) {
                Some(points) => Some(format!("{name} ({points} pts)")),
                None => Some(name),
            }
        }
        other => value_to_text(other),
    }
}
