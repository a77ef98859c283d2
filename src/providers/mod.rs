// Provider adapters - one per upstream AI service

pub mod deepseek;
pub mod gemini;
pub mod openrouter;

use async_trait::async_trait;
use reqwest::Response;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::ProxyError;
use crate::upstream::UpstreamClient;

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u64 = 2000;

/// Inbound-request details an adapter may need beyond the JSON body.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// `Origin` header of the caller, forwarded to providers that want a
    /// referer (OpenRouter ranks apps by it).
    pub origin: Option<String>,
}

/// One upstream provider: field validation, payload shaping and the
/// outbound call. Response normalization is shared by the driver below.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Registry key; also the path segment and the `provider` value
    /// accepted by `/api/keys/validate`.
    fn id(&self) -> &'static str;

    /// Human-facing name used in synthesized error messages.
    fn display_name(&self) -> &'static str;

    /// Remediation hint attached to every failure envelope.
    fn remediation(&self) -> &'static str;

    /// Reject requests missing required fields before any network call.
    fn validate(&self, body: &Value) -> Result<(), ProxyError>;

    /// Shape the provider-specific outbound payload.
    fn build_payload(&self, body: &Value) -> Value;

    /// Issue the outbound call with provider-specific auth.
    async fn send(
        &self,
        client: &UpstreamClient,
        ctx: &RequestContext,
        body: &Value,
        payload: Value,
    ) -> Result<Response, reqwest::Error>;

    /// Credential liveness probe used by `/api/keys/validate`. Providers
    /// without a cheap authenticated endpoint keep the default.
    async fn verify_key(
        &self,
        _client: &UpstreamClient,
        _key: &str,
    ) -> Result<bool, ProxyError> {
        Err(ProxyError::validation("Unsupported provider"))
    }
}

/// Startup-built map from provider id to its adapter.
pub struct ProviderRegistry {
    adapters: HashMap<&'static str, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    pub fn from_config(config: &AppConfig) -> Self {
        let adapters: Vec<Arc<dyn ProviderAdapter>> = vec![
            Arc::new(openrouter::OpenRouterAdapter::new(
                config.openrouter_api_key.clone(),
            )),
            Arc::new(gemini::GeminiAdapter::new(config.gemini_api_key.clone())),
            Arc::new(deepseek::DeepSeekAdapter::new(
                config.deepseek_api_key.clone(),
            )),
        ];

        let mut map = HashMap::new();
        for adapter in adapters {
            map.insert(adapter.id(), adapter);
        }
        Self { adapters: map }
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.get(id).cloned()
    }
}

/// Driver shared by every chat endpoint:
/// validate -> build payload -> send -> normalize.
pub async fn execute(
    adapter: &dyn ProviderAdapter,
    client: &UpstreamClient,
    ctx: &RequestContext,
    body: &Value,
) -> Result<Value, ProxyError> {
    adapter.validate(body)?;
    let payload = adapter.build_payload(body);

    let response = adapter
        .send(client, ctx, body, payload)
        .await
        .map_err(|e| transport_error(adapter, &e))?;

    normalize(adapter, response).await
}

fn transport_error(adapter: &dyn ProviderAdapter, err: &reqwest::Error) -> ProxyError {
    if err.is_timeout() {
        ProxyError::UpstreamTimeout {
            provider: adapter.display_name().to_string(),
            note: adapter.remediation().to_string(),
        }
    } else {
        ProxyError::Upstream {
            message: format!("{} request failed: {}", adapter.display_name(), err),
            note: adapter.remediation().to_string(),
        }
    }
}

/// Fold the provider response into the uniform envelope: non-success
/// status becomes a failure carrying the provider's own error message
/// when present, success is merged into `{"success": true, ...}`.
async fn normalize(adapter: &dyn ProviderAdapter, response: Response) -> Result<Value, ProxyError> {
    let status = response.status();
    let data: Value = response.json().await.unwrap_or_else(|_| json!({}));

    if !status.is_success() {
        let message = data
            .pointer("/error/message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!("{} error: {}", adapter.display_name(), status.as_u16())
            });
        tracing::warn!(
            "{} upstream returned {}: {}",
            adapter.display_name(),
            status,
            message
        );
        return Err(ProxyError::Upstream {
            message,
            note: adapter.remediation().to_string(),
        });
    }

    let mut envelope = Map::new();
    envelope.insert("success".to_string(), Value::Bool(true));
    if let Some(fields) = data.as_object() {
        for (key, value) in fields {
            envelope.insert(key.clone(), value.clone());
        }
    }
    Ok(Value::Object(envelope))
}

/// Chat-completions payload shared by the OpenAI-compatible providers.
pub(crate) fn chat_payload(model: Value, body: &Value) -> Value {
    json!({
        "model": model,
        "messages": body.get("messages").cloned().unwrap_or(Value::Null),
        "temperature": body
            .get("temperature")
            .cloned()
            .unwrap_or_else(|| json!(DEFAULT_TEMPERATURE)),
        "max_tokens": body
            .get("max_tokens")
            .cloned()
            .unwrap_or_else(|| json!(DEFAULT_MAX_TOKENS)),
        "stream": false
    })
}

/// Truthiness check matching the validation contract: a field counts as
/// present when it exists and is neither null nor an empty string.
pub(crate) fn field_present(body: &Value, field: &str) -> bool {
    match body.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_payload_fills_defaults() {
        let body = json!({ "messages": [{"role": "user", "content": "hi"}] });
        let payload = chat_payload(json!("deepseek-chat"), &body);
        assert_eq!(payload["model"], "deepseek-chat");
        assert_eq!(payload["temperature"], json!(0.7));
        assert_eq!(payload["max_tokens"], json!(2000));
        assert_eq!(payload["stream"], json!(false));
    }

    #[test]
    fn chat_payload_respects_caller_values() {
        let body = json!({
            "messages": [],
            "temperature": 0.2,
            "max_tokens": 512
        });
        let payload = chat_payload(json!("m"), &body);
        assert_eq!(payload["temperature"], json!(0.2));
        assert_eq!(payload["max_tokens"], json!(512));
    }

    #[test]
    fn field_present_rejects_null_and_empty() {
        let body = json!({ "a": null, "b": "", "c": "x", "d": [], "e": 0 });
        assert!(!field_present(&body, "a"));
        assert!(!field_present(&body, "b"));
        assert!(!field_present(&body, "missing"));
        assert!(field_present(&body, "c"));
        assert!(field_present(&body, "d"));
        assert!(field_present(&body, "e"));
    }

    #[test]
    fn registry_resolves_all_three_providers() {
        let registry = ProviderRegistry::from_config(&AppConfig::default());
        for id in ["openrouter", "gemini", "deepseek"] {
            assert!(registry.get(id).is_some(), "missing adapter: {}", id);
        }
        assert!(registry.get("krea").is_none());
    }
}
