//! Gemini `generateContent` 客户端

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::client::{CompletionClient, CompletionRequest};
use crate::config::AiConfig;
use crate::errors::{EduSystemError, Result};

pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_output_tokens: u32,
    structured_output: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &AiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout.max(1)))
            .build()
            .map_err(|e| EduSystemError::ai_request(format!("创建 HTTP 客户端失败: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.trim().to_string(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            structured_output: config.structured_output,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

/// 候选因内容策略被终止的 finishReason
const BLOCKED_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
    "IMAGE_SAFETY",
];

/// 从响应体中取出文本
///
/// 提示词被拦截或候选因内容策略终止时视为拒答。
pub(crate) fn extract_text(response: GenerateContentResponse) -> Result<String> {
    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(EduSystemError::ai_refusal(format!(
            "The model blocked the prompt: {reason}"
        )));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| EduSystemError::ai_request("The model returned no candidates"))?;

    if let Some(reason) = candidate
        .finish_reason
        .as_deref()
        .filter(|reason| BLOCKED_FINISH_REASONS.contains(reason))
    {
        return Err(EduSystemError::ai_refusal(format!(
            "The model stopped generating: {reason}"
        )));
    }

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(EduSystemError::ai_parse("The model returned an empty answer"));
    }

    if candidate.finish_reason.as_deref() == Some("MAX_TOKENS") {
        warn!("Gemini 输出达到 token 上限，结果可能被截断");
    }

    Ok(text)
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(EduSystemError::ai_not_configured(
                "AI generation is not configured (missing API key)",
            ));
        }

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
                response_mime_type: (self.structured_output || request.json_mode)
                    .then_some("application/json"),
            },
        };

        debug!("调用 Gemini 模型 {}", self.model);

        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EduSystemError::ai_request(format!("Gemini request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            let detail: String = detail.chars().take(300).collect();
            return Err(EduSystemError::ai_request(format!(
                "Gemini returned {status}: {detail}"
            )));
        }

        let parsed = resp
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| EduSystemError::ai_request(format!("Invalid Gemini response: {e}")))?;

        extract_text(parsed)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let resp = response(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "[{\"week\": 1"}, {"text": "}]"}]},
                "finishReason": "STOP"
            }]
        }));
        assert_eq!(extract_text(resp).unwrap(), "[{\"week\": 1}]");
    }

    #[test]
    fn test_block_reason_is_refusal() {
        let resp = response(serde_json::json!({
            "candidates": [],
            "promptFeedback": {"blockReason": "SAFETY"}
        }));
        assert!(matches!(extract_text(resp), Err(EduSystemError::AiRefusal(_))));
    }

    #[test]
    fn test_blocked_finish_is_refusal() {
        for reason in ["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII", "RECITATION"] {
            let resp = response(serde_json::json!({
                "candidates": [{"finishReason": reason}]
            }));
            assert!(
                matches!(extract_text(resp), Err(EduSystemError::AiRefusal(_))),
                "{reason} should be a refusal"
            );
        }

        // 正常结束但没有内容仍是解析问题
        let resp = response(serde_json::json!({
            "candidates": [{"finishReason": "STOP"}]
        }));
        assert!(matches!(extract_text(resp), Err(EduSystemError::AiParse(_))));
    }

    #[test]
    fn test_empty_candidates_is_request_error() {
        let resp = response(serde_json::json!({}));
        assert!(matches!(extract_text(resp), Err(EduSystemError::AiRequest(_))));
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let config = AiConfig::default();
        let client = GeminiClient::new(&config).unwrap();
        let err = client
            .complete(&CompletionRequest::new("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, EduSystemError::AiNotConfigured(_)));
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: "hi" }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.5,
                max_output_tokens: 100,
                response_mime_type: Some("application/json"),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 100);
    }
}
