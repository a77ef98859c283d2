// OpenRouter adapter (chat completions)

use async_trait::async_trait;
use reqwest::Response;
use serde_json::Value;

use super::{chat_payload, field_present, ProviderAdapter, RequestContext};
use crate::error::ProxyError;
use crate::upstream::UpstreamClient;

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai";

/// Referer reported when the caller sends no Origin header.
const PORTAL_REFERER: &str = "https://ingenieriaartistica369.github.io";
const PORTAL_TITLE: &str = "MultiplesIA Portal";

pub struct OpenRouterAdapter {
    api_key: String,
    base_url: String,
}

impl OpenRouterAdapter {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: OPENROUTER_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }
}

#[async_trait]
impl ProviderAdapter for OpenRouterAdapter {
    fn id(&self) -> &'static str {
        "openrouter"
    }

    fn display_name(&self) -> &'static str {
        "OpenRouter"
    }

    fn remediation(&self) -> &'static str {
        "Check your OpenRouter API key in environment variables"
    }

    fn validate(&self, body: &Value) -> Result<(), ProxyError> {
        if !field_present(body, "model") || !field_present(body, "messages") {
            return Err(ProxyError::validation("Model and messages are required"));
        }
        Ok(())
    }

    fn build_payload(&self, body: &Value) -> Value {
        chat_payload(body.get("model").cloned().unwrap_or(Value::Null), body)
    }

    async fn send(
        &self,
        client: &UpstreamClient,
        ctx: &RequestContext,
        _body: &Value,
        payload: Value,
    ) -> Result<Response, reqwest::Error> {
        let referer = ctx.origin.as_deref().unwrap_or(PORTAL_REFERER);
        client
            .http()
            .post(format!("{}/api/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", referer)
            .header("X-Title", PORTAL_TITLE)
            .json(&payload)
            .send()
            .await
    }

    async fn verify_key(
        &self,
        client: &UpstreamClient,
        key: &str,
    ) -> Result<bool, ProxyError> {
        let response = client
            .http()
            .get(format!("{}/api/v1/auth/key", self.base_url))
            .bearer_auth(key)
            .send()
            .await
            .map_err(|e| ProxyError::Upstream {
                message: format!("OpenRouter key check failed: {}", e),
                note: self.remediation().to_string(),
            })?;
        Ok(response.status().is_success())
    }
}
