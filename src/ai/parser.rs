//! 从模型输出中恢复 JSON
//!
//! 模型经常在 JSON 前后附带说明文字、包在 markdown 代码块里，或因长度限制被截断。
//! 依次尝试以下策略，第一个成功的结果即为输出：
//!
//! 1. 整段文本直接解析
//! 2. 逐个提取 ``` 代码块
//! 3. 括号匹配（识别字符串与转义）找到第一个完整的 `[...]` / `{...}`
//! 4. 从第一个左括号到最后一个同类右括号，逐步向前收缩结尾；仍失败时补齐未闭合的括号
//!
//! 都失败时，文本含拒答措辞返回 `AiRefusal`，否则返回 `AiParse`。

use serde_json::Value;

use crate::errors::{EduSystemError, Result};

// 截断修复最多尝试的切分点
const MAX_REPAIR_ATTEMPTS: usize = 200;
// 括号匹配最多尝试的起点
const MAX_BALANCED_STARTS: usize = 64;

const REFUSAL_MARKERS: &[&str] = &[
    "i'm sorry",
    "i am sorry",
    "i apologize",
    "i cannot",
    "i can't",
    "i can not",
    "i am unable",
    "i'm unable",
    "i won't",
    "i will not",
    "as an ai",
    "i must decline",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    Direct,
    Fenced,
    Balanced,
    Trimmed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedJson {
    pub value: Value,
    pub strategy: ParseStrategy,
}

pub fn parse_json_response(text: &str) -> Result<ParsedJson> {
    let trimmed = text.trim().trim_start_matches('\u{feff}');
    if trimmed.is_empty() {
        return Err(EduSystemError::ai_parse("The model returned an empty answer"));
    }

    let found = decode(trimmed)
        .map(|v| (v, ParseStrategy::Direct))
        .or_else(|| {
            fenced_blocks(trimmed)
                .into_iter()
                .find_map(|block| decode(block.trim()))
                .map(|v| (v, ParseStrategy::Fenced))
        })
        .or_else(|| first_balanced(trimmed).map(|v| (v, ParseStrategy::Balanced)))
        .or_else(|| trim_longest(trimmed).map(|v| (v, ParseStrategy::Trimmed)));

    if let Some((value, strategy)) = found {
        tracing::debug!("AI 输出解析成功，策略: {:?}", strategy);
        return Ok(ParsedJson { value, strategy });
    }

    if looks_like_refusal(trimmed) {
        return Err(EduSystemError::ai_refusal(format!(
            "The model declined the request: {}",
            snippet(trimmed)
        )));
    }

    Err(EduSystemError::ai_parse(format!(
        "No JSON could be recovered from the model output: {}",
        snippet(trimmed)
    )))
}

// 只接受对象或数组
fn decode(candidate: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(v @ (Value::Array(_) | Value::Object(_))) => Some(v),
        _ => None,
    }
}

/// 依次取出代码块内容，未闭合的代码块取到文本末尾
fn fenced_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("```") {
        let after = &rest[start + 3..];
        // 跳过语言标记，如 ```json
        let tag_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(after.len());
        let body = &after[tag_len..];

        match body.find("```") {
            Some(end) => {
                blocks.push(&body[..end]);
                rest = &body[end + 3..];
            }
            None => {
                blocks.push(body);
                break;
            }
        }
    }

    blocks
}

enum Span {
    Closed(usize),
    /// 到文本末尾仍未闭合，后面的括号都嵌套在其中
    Unclosed,
    Mismatch,
}

/// 从 `start` 处的左括号开始找到匹配的右括号位置
fn balanced_end(text: &str, start: usize) -> Span {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.pop() != Some(c) {
                    return Span::Mismatch;
                }
                if stack.is_empty() {
                    return Span::Closed(start + i);
                }
            }
            _ => {}
        }
    }

    Span::Unclosed
}

/// 第一个可解析的顶层括号片段
///
/// 外层括号未闭合（输出被截断）时不取其内部片段，交给截断修复处理。
fn first_balanced(text: &str) -> Option<Value> {
    let starts = text
        .char_indices()
        .filter(|(_, c)| *c == '{' || *c == '[')
        .map(|(i, _)| i)
        .take(MAX_BALANCED_STARTS);

    for start in starts {
        match balanced_end(text, start) {
            Span::Closed(end) => {
                if let Some(value) = decode(&text[start..=end]) {
                    return Some(value);
                }
            }
            Span::Unclosed => return None,
            Span::Mismatch => {}
        }
    }
    None
}

fn trim_longest(text: &str) -> Option<Value> {
    let obj = text.find('{');
    let arr = text.find('[');
    // 先试最早出现的括号类型
    let order = match (obj, arr) {
        (Some(o), Some(a)) if a < o => [('[', ']'), ('{', '}')],
        _ => [('{', '}'), ('[', ']')],
    };

    order.iter().find_map(|&(open, close)| {
        let start = text.find(open)?;
        let body = &text[start..];

        // 收缩结尾到每一个更早的同类右括号
        let shrunk = body
            .char_indices()
            .filter(|(_, c)| *c == close)
            .map(|(i, _)| i)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .find_map(|end| decode(&body[..=end]));
        if shrunk.is_some() {
            return shrunk;
        }

        // 输出被截断：在右括号处切断并补齐
        body.char_indices()
            .filter(|(_, c)| *c == '}' || *c == ']')
            .map(|(i, _)| i)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .take(MAX_REPAIR_ATTEMPTS)
            .find_map(|end| close_truncated(&body[..=end]).and_then(|s| decode(&s)))
    })
}

/// 为截断的前缀补齐未闭合的括号，停在字符串内部时放弃
fn close_truncated(prefix: &str) -> Option<String> {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in prefix.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.pop() != Some(c) {
                    return None;
                }
            }
            _ => {}
        }
    }

    if in_string {
        return None;
    }

    let mut repaired = prefix.trim_end().trim_end_matches(',').to_string();
    while let Some(c) = stack.pop() {
        repaired.push(c);
    }
    Some(repaired)
}

fn looks_like_refusal(text: &str) -> bool {
    let lower = text.to_lowercase().replace('\u{2019}', "'");
    REFUSAL_MARKERS.iter().any(|marker| lower.contains(marker))
}

fn snippet(text: &str) -> String {
    let mut s: String = text.chars().take(160).collect();
    if s.len() < text.len() {
        s.push('…');
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(text: &str) -> ParsedJson {
        parse_json_response(text).unwrap()
    }

    #[test]
    fn test_direct_json() {
        let parsed = parse(r#"  [{"week": 1, "title": "Intro"}]  "#);
        assert_eq!(parsed.strategy, ParseStrategy::Direct);
        assert_eq!(parsed.value, json!([{"week": 1, "title": "Intro"}]));
    }

    #[test]
    fn test_json_fence() {
        let text = "Here is your plan:\n```json\n[{\"week\": 1}]\n```\nGood luck!";
        let parsed = parse(text);
        assert_eq!(parsed.strategy, ParseStrategy::Fenced);
        assert_eq!(parsed.value, json!([{"week": 1}]));
    }

    #[test]
    fn test_second_fence_used_when_first_invalid() {
        let text = "```\nnot json\n```\nand\n```\n{\"weeks\": []}\n```";
        let parsed = parse(text);
        assert_eq!(parsed.strategy, ParseStrategy::Fenced);
        assert_eq!(parsed.value, json!({"weeks": []}));
    }

    #[test]
    fn test_prefixed_and_suffixed_text() {
        let text = r#"Sure! {"title": "Quiz", "questions": []} Let me know if you need more."#;
        let parsed = parse(text);
        assert_eq!(parsed.strategy, ParseStrategy::Balanced);
        assert_eq!(parsed.value["title"], "Quiz");
    }

    #[test]
    fn test_brackets_inside_strings() {
        let text = r#"Output: {"title": "Sets {A} and [B]", "note": "quote \" here"} done"#;
        let parsed = parse(text);
        assert_eq!(parsed.value["title"], "Sets {A} and [B]");
    }

    #[test]
    fn test_truncated_array_is_repaired() {
        let text = r#"[{"week": 1, "title": "A"}, {"week": 2, "title": "B"}, {"week": 3, "tit"#;
        let parsed = parse(text);
        assert_eq!(parsed.strategy, ParseStrategy::Trimmed);
        assert_eq!(parsed.value.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_truncated_object_is_repaired() {
        let text = "```json\n{\"weeks\": [{\"week\": 1, \"topics\": [\"x\"]}, {\"week\": 2, \"topics\": [\"y\"";
        let parsed = parse(text);
        assert_eq!(parsed.value["weeks"][0]["week"], 1);
    }

    #[test]
    fn test_trailing_garbage_bracket() {
        let text = r#"[{"week": 1}] ] trailing"#;
        let parsed = parse(text);
        assert_eq!(parsed.value, json!([{"week": 1}]));
    }

    #[test]
    fn test_refusal_detected() {
        let err = parse_json_response("I'm sorry, but I can't help with that request.").unwrap_err();
        assert!(matches!(err, EduSystemError::AiRefusal(_)));

        let err = parse_json_response("As an AI language model I am unable to do this").unwrap_err();
        assert!(matches!(err, EduSystemError::AiRefusal(_)));
    }

    #[test]
    fn test_unparseable_text() {
        let err = parse_json_response("Week one covers basics; week two covers more.").unwrap_err();
        assert!(matches!(err, EduSystemError::AiParse(_)));

        let err = parse_json_response("   ").unwrap_err();
        assert!(matches!(err, EduSystemError::AiParse(_)));
    }

    #[test]
    fn test_scalar_json_is_not_accepted() {
        let err = parse_json_response("42").unwrap_err();
        assert!(matches!(err, EduSystemError::AiParse(_)));
    }
}
