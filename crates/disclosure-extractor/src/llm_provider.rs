//! LLM backend abstraction (spec §4.3, §6). One trait, one concrete HTTP
//! implementation — the same split the teacher uses for
//! `ml_client::provider::{MLProvider, HttpMLProvider}` over its own model
//! backends.

use async_trait::async_trait;
use disclosure_core::TransformError;
use std::time::Duration;

/// One page of a multimodal (PDF) invocation, base64-encoded PNG bytes.
#[derive(Debug, Clone)]
pub struct ImagePage {
    pub page_number: u32,
    pub base64_png: String,
}

/// A single request to the LLM. `images` is empty for text-only prompts.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub images: Vec<ImagePage>,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, request: LlmRequest) -> Result<String, TransformError>;

    fn backend_name(&self) -> &'static str;
}

#[derive(Debug, Clone)]
pub struct HttpLlmConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl HttpLlmConfig {
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var("DISCLOSURE_LLM_ENDPOINT")
                .unwrap_or_else(|_| "https://api.anthropic.com/v1/messages".to_string()),
            api_key: std::env::var("DISCLOSURE_LLM_API_KEY").unwrap_or_default(),
            model: std::env::var("DISCLOSURE_LLM_MODEL").unwrap_or_else(|_| "claude-3-5-sonnet".to_string()),
            timeout: Duration::from_secs(60),
        }
    }
}

/// reqwest-backed provider, mirroring `ml_client::HttpMLProvider`'s thin
/// delegation over a shared client.
pub struct HttpLlmProvider {
    client: reqwest::Client,
    config: HttpLlmConfig,
}

impl HttpLlmProvider {
    pub fn new(config: HttpLlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to build LLM http client");
        Self { client, config }
    }
}

#[async_trait]
impl LlmProvider for HttpLlmProvider {
    async fn complete(&self, request: LlmRequest) -> Result<String, TransformError> {
        let mut content = vec![serde_json::json!({"type": "text", "text": request.user_prompt})];
        for page in &request.images {
            content.push(serde_json::json!({
                "type": "image",
                "source": {
                    "type": "base64",
                    "media_type": "image/png",
                    "data": page.base64_png,
                }
            }));
        }

        let body = serde_json::json!({
            "model": self.config.model,
            "system": request.system_prompt,
            "max_tokens": 4096,
            "messages": [{"role": "user", "content": content}],
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("x-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|_| TransformError::LlmTimeout)?;

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TransformError::JsonParse(e.to_string()))?;

        payload
            .get("content")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("text"))
            .and_then(|t| t.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| TransformError::JsonParse("LLM response missing content[0].text".to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "anthropic_http"
    }
}
