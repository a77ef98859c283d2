// Krea image endpoint - an explicit stub, no real image backend

use axum::http::{header, HeaderMap};
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use super::iso_timestamp;
use crate::error::ProxyError;

const DEFAULT_IMAGE_MODEL: &str = "krea-image-v1";

/// Placeholder generator. Requires a bearer-style credential to be
/// present (its value is not verified) and synthesizes a deterministic
/// placeholder image URL from the prompt. Never calls a real provider.
pub async fn generate_stub(
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ProxyError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|raw| raw.strip_prefix("Bearer ").unwrap_or(raw).trim())
        .filter(|t| !t.is_empty());
    if token.is_none() {
        return Err(ProxyError::GoogleAuthRequired);
    }

    let action = body.get("action").and_then(Value::as_str).filter(|a| !a.is_empty());
    let prompt = body.get("prompt").and_then(Value::as_str).filter(|p| !p.is_empty());
    let (_action, prompt) = match (action, prompt) {
        (Some(a), Some(p)) => (a, p),
        _ => return Err(ProxyError::validation("Action and prompt are required")),
    };

    let model = body
        .get("model")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_IMAGE_MODEL);

    let preview: String = prompt.chars().take(30).collect();
    let url = format!(
        "https://via.placeholder.com/512x512/3b82f6/ffffff?text={}",
        urlencoding::encode(&preview)
    );

    info!("Serving Krea placeholder (no image backend is wired up)");

    Ok(Json(json!({
        "success": true,
        "result": {
            "url": url,
            "prompt": prompt,
            "model": model
        },
        "metadata": {
            "generatedAt": iso_timestamp(),
            "estimatedTokens": (prompt.len() as f64) / 4.0,
            "requiresAuth": true
        }
    })))
}
