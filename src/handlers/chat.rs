// Chat endpoints - thin wrappers dispatching into the adapter registry

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use serde_json::Value;
use tracing::debug;

use crate::error::ProxyError;
use crate::providers::{self, RequestContext};
use crate::server::AppState;

pub async fn openrouter(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ProxyError> {
    proxy_chat(&state, "openrouter", &headers, body).await
}

pub async fn gemini(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ProxyError> {
    proxy_chat(&state, "gemini", &headers, body).await
}

pub async fn deepseek(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ProxyError> {
    proxy_chat(&state, "deepseek", &headers, body).await
}

async fn proxy_chat(
    state: &AppState,
    provider: &str,
    headers: &HeaderMap,
    body: Value,
) -> Result<Json<Value>, ProxyError> {
    let adapter = state
        .providers
        .get(provider)
        .ok_or_else(|| ProxyError::Internal(format!("no adapter registered for {}", provider)))?;

    debug!(
        "Proxying request to {} (model: {})",
        provider,
        body.get("model").and_then(|v| v.as_str()).unwrap_or("-")
    );

    let ctx = RequestContext {
        origin: headers
            .get(header::ORIGIN)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string),
    };

    let result = providers::execute(adapter.as_ref(), &state.upstream, &ctx, &body).await?;
    Ok(Json(result))
}
