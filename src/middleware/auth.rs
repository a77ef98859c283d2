// API key gate

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::config::CredentialSet;
use crate::error::ProxyError;
use crate::server::AppState;

/// The gate decision itself, kept free of HTTP machinery.
///
/// Permissive mode only waives a *missing* credential; a key that is
/// supplied but wrong is rejected in every mode.
pub fn check_api_key(
    supplied: Option<&str>,
    credentials: &CredentialSet,
    permissive: bool,
) -> Result<(), ProxyError> {
    match supplied {
        None if permissive => Ok(()),
        None => Err(ProxyError::MissingApiKey),
        Some(key) if credentials.contains(key) => Ok(()),
        Some(_) => Err(ProxyError::InvalidApiKey),
    }
}

/// Middleware applied to the gated routes (the three chat adapters and
/// the key-validation endpoint).
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ProxyError> {
    let supplied = extract_api_key(&request);
    check_api_key(
        supplied.as_deref(),
        &state.credentials,
        state.config.environment.is_permissive(),
    )?;
    Ok(next.run(request).await)
}

/// Caller credential from the `x-api-key` header, falling back to the
/// `apiKey` query parameter. Empty values count as absent.
fn extract_api_key(request: &Request) -> Option<String> {
    let header_key = request
        .headers()
        .get("x-api-key")
        .and_then(|h| h.to_str().ok())
        .filter(|key| !key.is_empty())
        .map(str::to_string);
    if header_key.is_some() {
        return header_key;
    }

    request
        .uri()
        .query()
        .and_then(query_api_key)
        .filter(|key| !key.is_empty())
}

fn query_api_key(query: &str) -> Option<String> {
    for pair in query.split('&') {
        let mut parts = pair.splitn(2, '=');
        if parts.next() == Some("apiKey") {
            let raw = parts.next().unwrap_or("");
            return Some(
                urlencoding::decode(raw)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| raw.to_string()),
            );
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> CredentialSet {
        CredentialSet::from_keys(["sk-or-1", "AIza-2"])
    }

    #[test]
    fn missing_key_rejected_unless_permissive() {
        assert!(check_api_key(None, &creds(), true).is_ok());
        let err = check_api_key(None, &creds(), false).unwrap_err();
        assert!(matches!(err, ProxyError::MissingApiKey));
    }

    #[test]
    fn wrong_key_rejected_even_in_permissive_mode() {
        let err = check_api_key(Some("sk-wrong"), &creds(), true).unwrap_err();
        assert!(matches!(err, ProxyError::InvalidApiKey));
        let err = check_api_key(Some("sk-wrong"), &creds(), false).unwrap_err();
        assert!(matches!(err, ProxyError::InvalidApiKey));
    }

    #[test]
    fn known_key_accepted() {
        assert!(check_api_key(Some("sk-or-1"), &creds(), false).is_ok());
        assert!(check_api_key(Some("AIza-2"), &creds(), false).is_ok());
    }

    #[test]
    fn query_parameter_is_parsed_and_decoded() {
        assert_eq!(query_api_key("apiKey=sk-1"), Some("sk-1".to_string()));
        assert_eq!(
            query_api_key("foo=bar&apiKey=sk%2D2"),
            Some("sk-2".to_string())
        );
        assert_eq!(query_api_key("foo=bar"), None);
    }
}
