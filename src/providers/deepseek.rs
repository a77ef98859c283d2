// DeepSeek direct-API adapter (chat completions)

use async_trait::async_trait;
use reqwest::Response;
use serde_json::{json, Value};

use super::{chat_payload, field_present, ProviderAdapter, RequestContext};
use crate::error::ProxyError;
use crate::upstream::UpstreamClient;

const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";

/// Model used when the caller omits one.
pub const DEFAULT_MODEL: &str = "deepseek-chat";

pub struct DeepSeekAdapter {
    api_key: String,
    base_url: String,
}

impl DeepSeekAdapter {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEEPSEEK_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }
}

#[async_trait]
impl ProviderAdapter for DeepSeekAdapter {
    fn id(&self) -> &'static str {
        "deepseek"
    }

    fn display_name(&self) -> &'static str {
        "DeepSeek"
    }

    fn remediation(&self) -> &'static str {
        "Check your DeepSeek API key at https://platform.deepseek.com/api_keys"
    }

    // model is optional here; only messages are required
    fn validate(&self, body: &Value) -> Result<(), ProxyError> {
        if !field_present(body, "messages") {
            return Err(ProxyError::validation("Messages are required"));
        }
        Ok(())
    }

    fn build_payload(&self, body: &Value) -> Value {
        let model = body
            .get("model")
            .filter(|m| !m.is_null())
            .cloned()
            .unwrap_or_else(|| json!(DEFAULT_MODEL));
        chat_payload(model, body)
    }

    async fn send(
        &self,
        client: &UpstreamClient,
        _ctx: &RequestContext,
        _body: &Value,
        payload: Value,
    ) -> Result<Response, reqwest::Error> {
        client
            .http()
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
    }
}
