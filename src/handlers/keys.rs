// Key-liveness endpoint

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::iso_timestamp;
use crate::error::ProxyError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct ValidateKeyRequest {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

/// Probes the named provider with the supplied key and reports a boolean
/// verdict. A failed probe (network, not auth) keeps the
/// `{"error", "valid": false}` shape the frontend expects.
pub async fn validate(
    State(state): State<AppState>,
    Json(request): Json<ValidateKeyRequest>,
) -> Result<Response, ProxyError> {
    let provider = request.provider.filter(|p| !p.is_empty());
    let key = request.key.filter(|k| !k.is_empty());
    let (provider, key) = match (provider, key) {
        (Some(p), Some(k)) => (p, k),
        _ => return Err(ProxyError::validation("Provider and key are required")),
    };

    let adapter = state
        .providers
        .get(&provider)
        .ok_or_else(|| ProxyError::validation("Unsupported provider"))?;

    match adapter.verify_key(&state.upstream, &key).await {
        Ok(valid) => {
            let message = if valid {
                format!("{} key is valid", adapter.display_name())
            } else {
                format!("Invalid {} key", adapter.display_name())
            };
            Ok(Json(json!({
                "valid": valid,
                "message": message,
                "provider": provider,
                "timestamp": iso_timestamp()
            }))
            .into_response())
        }
        // Adapters without a probe endpoint surface as a 400
        Err(err @ ProxyError::Validation(_)) => Err(err),
        Err(err) => {
            error!("Key validation against {} failed: {}", provider, err);
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string(), "valid": false })),
            )
                .into_response())
        }
    }
}
