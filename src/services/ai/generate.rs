use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::ai::{CompletionClient, CompletionRequest, parse_json_response};
use crate::cache::ObjectCache;
use crate::config::AppConfig;
use crate::models::{
    ApiError, ApiResult,
    ai::{entities::GenerationKind, responses::GenerationResponse},
    audit_logs::entities::{NewAuditLog, actions},
    users::entities::User,
};
use crate::services::audit;
use crate::storage::Storage;

/// 一次生成的结果
#[derive(Debug)]
pub(crate) struct Generation<T> {
    pub result: T,
    /// 退回兜底内容时的失败原因
    pub fallback_reason: Option<String>,
    pub cached: bool,
}

impl<T> Generation<T> {
    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

/// 写审计日志并组装响应
pub(crate) async fn finish<T: ts_rs::TS>(
    storage: &dyn Storage,
    actor: &User,
    course_id: i64,
    kind: GenerationKind,
    model: &str,
    generation: Generation<T>,
    saved_id: Option<i64>,
) -> GenerationResponse<T> {
    let generation_id = uuid::Uuid::new_v4().to_string();
    audit(
        storage,
        NewAuditLog::new(actor.id, actions::AI_GENERATE, "course", Some(course_id)).details(
            serde_json::json!({
                "generation_id": generation_id,
                "kind": kind.as_str(),
                "model": model,
                "fallback": generation.is_fallback(),
                "cached": generation.cached,
                "saved_id": saved_id,
            }),
        ),
    )
    .await;

    GenerationResponse {
        generation_id,
        course_id,
        fallback: generation.is_fallback(),
        fallback_reason: generation.fallback_reason,
        cached: generation.cached,
        saved_id,
        result: generation.result,
    }
}

/// 缓存键：模型名、生成种类与提示词的 SHA-256
pub(crate) fn cache_key(model: &str, kind: GenerationKind, prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model.as_bytes());
    hasher.update([0u8]);
    hasher.update(kind.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(prompt.as_bytes());
    format!("ai:{}:{:x}", kind.as_str(), hasher.finalize())
}

/// 调用模型并规范化输出
///
/// 传输失败、解析失败或规范化后为空时返回 `fallback()`；
/// 拒答与未配置直接作为错误返回。只有真实生成的结果会写入缓存。
pub(crate) async fn run_generation<T, N, F>(
    client: &dyn CompletionClient,
    cache: Option<&dyn ObjectCache>,
    kind: GenerationKind,
    prompt: String,
    normalize: N,
    fallback: F,
) -> ApiResult<Generation<T>>
where
    T: Serialize + DeserializeOwned,
    N: FnOnce(&Value) -> Option<T>,
    F: FnOnce() -> T,
{
    let config = &AppConfig::get().ai;
    let cache = cache.filter(|_| config.cache_results);
    let key = cache_key(client.model_name(), kind, &prompt);

    if let Some(cache) = cache
        && let Some(result) = cache.get_json::<T>(&key).await
    {
        debug!("AI {} served from cache", kind.as_str());
        return Ok(Generation {
            result,
            fallback_reason: None,
            cached: true,
        });
    }

    let request = CompletionRequest::new(prompt).json_mode(config.structured_output);
    let parsed = match client.complete(&request).await {
        Ok(text) => parse_json_response(&text),
        Err(e) => Err(e),
    };

    let reason = match parsed {
        Ok(parsed) => {
            debug!("AI {} parsed via {:?}", kind.as_str(), parsed.strategy);
            match normalize(&parsed.value) {
                Some(result) => {
                    if let Some(cache) = cache {
                        cache.insert_json(key, &result, config.cache_ttl).await;
                    }
                    info!("AI {} generated with {}", kind.as_str(), client.model_name());
                    return Ok(Generation {
                        result,
                        fallback_reason: None,
                        cached: false,
                    });
                }
                None => "The model output did not contain usable content".to_string(),
            }
        }
        Err(e) if e.is_ai_recoverable() => e.message().to_string(),
        Err(e) => return Err(ApiError::from(e)),
    };

    warn!("AI {} fell back to static content: {}", kind.as_str(), reason);
    Ok(Generation {
        result: fallback(),
        fallback_reason: Some(reason),
        cached: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::object_cache::moka::MokaCacheWrapper;
    use crate::errors::EduSystemError;
    use crate::models::ErrorCode;
    use crate::services::ai::test_client::ScriptedClient;

    fn first_number(value: &Value) -> Option<i64> {
        value.as_array()?.first()?.as_i64()
    }

    #[tokio::test]
    async fn test_parses_and_caches() {
        let client = ScriptedClient::reply("Here you go:\n```json\n[7, 8]\n```");
        let cache = MokaCacheWrapper::with_settings(100, 60);
        let cache: &dyn ObjectCache = &cache;

        let first = run_generation(
            &client,
            Some(cache),
            GenerationKind::Quiz,
            "prompt".to_string(),
            first_number,
            || 0,
        )
        .await
        .unwrap();
        assert_eq!(first.result, 7);
        assert!(!first.cached);
        assert!(!first.is_fallback());

        let second = run_generation(
            &client,
            Some(cache),
            GenerationKind::Quiz,
            "prompt".to_string(),
            first_number,
            || 0,
        )
        .await
        .unwrap();
        assert_eq!(second.result, 7);
        assert!(second.cached);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_recoverable_failures_fall_back() {
        let client = ScriptedClient::new(vec![
            Err(EduSystemError::ai_request("connection reset")),
            Ok("no json at all".to_string()),
            Ok(r#"{"unexpected": true}"#.to_string()),
        ]);

        for _ in 0..3 {
            let generation = run_generation(
                &client,
                None,
                GenerationKind::StudyPlan,
                "p".to_string(),
                first_number,
                || -1,
            )
            .await
            .unwrap();
            assert_eq!(generation.result, -1);
            assert!(generation.is_fallback());
        }
    }

    #[tokio::test]
    async fn test_refusal_is_an_error() {
        let client = ScriptedClient::reply("I'm sorry, but I cannot help with that request.");
        let err = run_generation(
            &client,
            None,
            GenerationKind::Assignment,
            "p".to_string(),
            first_number,
            || 0,
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::AiRefused);
        assert_eq!(err.status, actix_web::http::StatusCode::UNPROCESSABLE_ENTITY);

        let client = ScriptedClient::new(vec![Err(EduSystemError::ai_not_configured("no key"))]);
        let err = run_generation(
            &client,
            None,
            GenerationKind::Assignment,
            "p".to_string(),
            first_number,
            || 0,
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::AiNotConfigured);
    }

    #[test]
    fn test_cache_key_depends_on_model() {
        let a = cache_key("m1", GenerationKind::Quiz, "x");
        let b = cache_key("m2", GenerationKind::Quiz, "x");
        assert_ne!(a, b);
        assert_eq!(a, cache_key("m1", GenerationKind::Quiz, "x"));
        assert!(a.starts_with("ai:quiz:"));
    }
}
