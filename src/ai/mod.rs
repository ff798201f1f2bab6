//! AI 辅助生成
//!
//! - `client`: 补全接口抽象
//! - `gemini`: Gemini `generateContent` 实现
//! - `prompts`: 提示词构造
//! - `parser`: 从模型自由文本中恢复 JSON
//! - `normalize`: 把松散 JSON 规范化为业务结构
//! - `fallback`: 生成失败时的静态兜底内容

pub mod client;
pub mod fallback;
pub mod gemini;
pub mod normalize;
pub mod parser;
pub mod prompts;

pub use client::{CompletionClient, CompletionRequest, SharedCompletionClient};
pub use gemini::GeminiClient;
pub use parser::{ParseStrategy, ParsedJson, parse_json_response};
