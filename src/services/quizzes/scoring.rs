//! 测验判分
//!
//! 作答可以是按题号排列的数组，也可以是以题号（从 0 开始）为键的对象。
//! 选择题既可以回答选项字母，也可以回答选项原文，比较时忽略大小写与多余空白。

use serde_json::Value;

use crate::models::quizzes::entities::QuizQuestion;

/// 小写并合并空白
fn canonical(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// "B"、"b)"、"(B)"、"B." 这样的选项字母
fn option_letter(text: &str) -> Option<usize> {
    let trimmed = text
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(['.', ')', ':']);
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Some((c.to_ascii_uppercase() as u8 - b'A') as usize)
        }
        _ => None,
    }
}

/// 把作答或标准答案解析为选项下标
pub(crate) fn option_index(question: &QuizQuestion, text: &str) -> Option<usize> {
    if question.options.is_empty() {
        return None;
    }
    if let Some(index) = option_letter(text).filter(|i| *i < question.options.len()) {
        return Some(index);
    }
    let wanted = canonical(text);
    question
        .options
        .iter()
        .position(|option| canonical(option) == wanted)
}

fn answer_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn is_correct(question: &QuizQuestion, answer: &str) -> bool {
    if question.correct_answer.trim().is_empty() || answer.trim().is_empty() {
        return false;
    }
    match (
        option_index(question, answer),
        option_index(question, &question.correct_answer),
    ) {
        (Some(given), Some(expected)) => given == expected,
        _ => canonical(answer) == canonical(&question.correct_answer),
    }
}

/// 第 `index` 题的作答
fn answer_at(answers: &Value, index: usize) -> Option<String> {
    match answers {
        Value::Array(items) => items.get(index).and_then(answer_text),
        Value::Object(map) => map.get(&index.to_string()).and_then(answer_text),
        _ => None,
    }
}

/// 返回 (得分, 总分)
pub fn score_attempt(questions: &[QuizQuestion], answers: &Value) -> (f64, f64) {
    let max_score = questions.iter().map(|q| q.points).sum();
    let score = questions
        .iter()
        .enumerate()
        .filter(|(index, question)| {
            answer_at(answers, *index).is_some_and(|answer| is_correct(question, &answer))
        })
        .map(|(_, question)| question.points)
        .sum();
    (score, max_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(options: &[&str], correct: &str, points: f64) -> QuizQuestion {
        QuizQuestion {
            question: "?".into(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_answer: correct.into(),
            points,
            explanation: None,
        }
    }

    #[test]
    fn test_letter_and_text_answers() {
        let q = question(&["Paris", "Rome", "Berlin"], "A", 1.0);
        assert!(is_correct(&q, "A"));
        assert!(is_correct(&q, "a)"));
        assert!(is_correct(&q, "  paris "));
        assert!(!is_correct(&q, "B"));
        assert!(!is_correct(&q, "Rome"));

        // 标准答案是选项原文
        let q = question(&["Heap sort", "Merge sort"], "merge  sort", 1.0);
        assert!(is_correct(&q, "B"));
        assert!(is_correct(&q, "Merge Sort"));
    }

    #[test]
    fn test_free_text_question() {
        let q = question(&[], "Ownership", 2.0);
        assert!(is_correct(&q, "ownership"));
        assert!(!is_correct(&q, "borrowing"));
        assert!(!is_correct(&question(&[], "", 1.0), ""));
    }

    #[test]
    fn test_score_array_and_object_answers() {
        let questions = vec![
            question(&["1", "2"], "B", 2.0),
            question(&["x", "y"], "A", 3.0),
            question(&[], "42", 5.0),
        ];
        assert_eq!(score_attempt(&questions, &json!(["B", "B", 42])), (7.0, 10.0));
        assert_eq!(score_attempt(&questions, &json!({"1": "x", "2": "42"})), (8.0, 10.0));
        assert_eq!(score_attempt(&questions, &json!("B")), (0.0, 10.0));
    }
}
