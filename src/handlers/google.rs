// Google ID-token endpoint - verification is SIMULATED

use axum::Json;
use serde_json::{json, Value};
use tracing::warn;

use super::iso_timestamp;
use crate::error::ProxyError;

/// Accepts any non-empty `idToken` and reports it verified WITHOUT any
/// cryptographic check. The response note and the warning log keep the
/// gap visible; do not treat this endpoint as authentication.
pub async fn verify_google_stub(Json(body): Json<Value>) -> Result<Json<Value>, ProxyError> {
    let id_token = body
        .get("idToken")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty());
    if id_token.is_none() {
        return Err(ProxyError::validation("ID token required"));
    }

    warn!("verify-google is a stub: reporting success without verifying the ID token");

    Ok(Json(json!({
        "verified": true,
        "timestamp": iso_timestamp(),
        "note": "Token verification simulated. In production, verify the ID token cryptographically."
    })))
}
