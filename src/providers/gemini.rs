// Google Gemini adapter (generateContent)

use async_trait::async_trait;
use reqwest::Response;
use serde_json::{json, Value};

use super::{field_present, ProviderAdapter, RequestContext, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::error::ProxyError;
use crate::upstream::UpstreamClient;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Model probed by the key-liveness check; a metadata GET, so it costs
/// no tokens.
const KEY_CHECK_MODEL: &str = "gemini-1.5-flash";

pub struct GeminiAdapter {
    api_key: String,
    base_url: String,
}

impl GeminiAdapter {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn id(&self) -> &'static str {
        "gemini"
    }

    fn display_name(&self) -> &'static str {
        "Gemini"
    }

    fn remediation(&self) -> &'static str {
        "Check your Google AI Studio API key"
    }

    fn validate(&self, body: &Value) -> Result<(), ProxyError> {
        // model is interpolated into the URL path, so it must be a string
        let model_ok = body
            .get("model")
            .and_then(Value::as_str)
            .is_some_and(|m| !m.is_empty());
        if !model_ok || !field_present(body, "contents") {
            return Err(ProxyError::validation("Model and contents are required"));
        }
        Ok(())
    }

    fn build_payload(&self, body: &Value) -> Value {
        let generation_config = body.get("generationConfig").cloned().unwrap_or_else(|| {
            json!({
                "temperature": DEFAULT_TEMPERATURE,
                "maxOutputTokens": DEFAULT_MAX_TOKENS
            })
        });
        json!({
            "contents": body.get("contents").cloned().unwrap_or(Value::Null),
            "generationConfig": generation_config
        })
    }

    async fn send(
        &self,
        client: &UpstreamClient,
        _ctx: &RequestContext,
        body: &Value,
        payload: Value,
    ) -> Result<Response, reqwest::Error> {
        let model = body.get("model").and_then(Value::as_str).unwrap_or_default();
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        client
            .http()
            .post(url)
            // Gemini auth rides in the query string, not a header
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
    }

    async fn verify_key(
        &self,
        client: &UpstreamClient,
        key: &str,
    ) -> Result<bool, ProxyError> {
        let url = format!("{}/v1beta/models/{}", self.base_url, KEY_CHECK_MODEL);
        let response = client
            .http()
            .get(url)
            .query(&[("key", key)])
            .send()
            .await
            .map_err(|e| ProxyError::Upstream {
                message: format!("Gemini key check failed: {}", e),
                note: self.remediation().to_string(),
            })?;
        Ok(response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::execute;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn rejects_missing_model_or_contents() {
        let adapter = GeminiAdapter::new("k".into());
        for body in [
            json!({}),
            json!({ "model": "gemini-1.5-flash" }),
            json!({ "contents": [] }),
            json!({ "model": 42, "contents": [] }),
        ] {
            let err = adapter.validate(&body).unwrap_err();
            assert_eq!(err.to_string(), "Model and contents are required");
        }
    }

    #[test]
    fn default_generation_config_applied_when_omitted() {
        let adapter = GeminiAdapter::new("k".into());
        let payload = adapter.build_payload(&json!({
            "model": "gemini-1.5-flash",
            "contents": [{"role": "user", "parts": [{"text": "hi"}]}]
        }));
        assert_eq!(payload["generationConfig"]["temperature"], json!(0.7));
        assert_eq!(payload["generationConfig"]["maxOutputTokens"], json!(2000));
    }

    #[test]
    fn caller_generation_config_passes_through() {
        let adapter = GeminiAdapter::new("k".into());
        let payload = adapter.build_payload(&json!({
            "model": "gemini-1.5-flash",
            "contents": [],
            "generationConfig": { "temperature": 0.1, "maxOutputTokens": 64 }
        }));
        assert_eq!(payload["generationConfig"]["temperature"], json!(0.1));
        assert_eq!(payload["generationConfig"]["maxOutputTokens"], json!(64));
    }

    #[tokio::test]
    async fn key_rides_in_query_and_model_in_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(query_param("key", "g-key"))
            .and(body_partial_json(json!({
                "generationConfig": { "temperature": 0.7, "maxOutputTokens": 2000 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "hola" }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = GeminiAdapter::new("g-key".into()).with_base_url(server.uri());
        let client = UpstreamClient::new(5);
        let body = json!({
            "model": "gemini-1.5-flash",
            "contents": [{"role": "user", "parts": [{"text": "hola"}]}]
        });

        let result = execute(&adapter, &client, &RequestContext::default(), &body)
            .await
            .unwrap();
        assert_eq!(result["success"], json!(true));
        assert!(result["candidates"].is_array());
    }

    #[tokio::test]
    async fn verify_key_maps_http_status_to_bool() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1beta/models/gemini-1.5-flash"))
            .and(query_param("key", "good"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "models/gemini-1.5-flash" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1beta/models/gemini-1.5-flash"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let adapter = GeminiAdapter::new(String::new()).with_base_url(server.uri());
        let client = UpstreamClient::new(5);
        assert!(adapter.verify_key(&client, "good").await.unwrap());
        assert!(!adapter.verify_key(&client, "bad").await.unwrap());
    }
}
