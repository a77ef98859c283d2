// CORS layer restricted to the portal's origins

use axum::http::header::{HeaderName, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Builds the CORS layer from the configured allow-list. Entries may
/// contain a single `*` wildcard (e.g. `https://*.github.io`); everything
/// else is matched exactly. Credentials stay enabled, which rules out the
/// blanket `Any` origin.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let patterns: Vec<String> = allowed_origins.to_vec();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .map(|o| origin_allowed(o, &patterns))
                .unwrap_or(false)
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static("x-api-key"),
        ])
        .allow_credentials(true)
}

fn origin_allowed(origin: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| {
        match pattern.split_once('*') {
            // The wildcard may only stand in for a host label, never a
            // path segment.
            Some((prefix, suffix)) => origin
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(suffix))
                .is_some_and(|label| !label.is_empty() && !label.contains('/')),
            None => origin == pattern,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> Vec<String> {
        vec![
            "http://localhost:8000".to_string(),
            "https://*.github.io".to_string(),
        ]
    }

    #[test]
    fn exact_origins_match() {
        assert!(origin_allowed("http://localhost:8000", &patterns()));
        assert!(!origin_allowed("http://localhost:9000", &patterns()));
    }

    #[test]
    fn wildcard_matches_subdomains_only() {
        assert!(origin_allowed("https://someone.github.io", &patterns()));
        assert!(!origin_allowed("https://github.io", &patterns()));
        assert!(!origin_allowed("http://someone.github.io", &patterns()));
        assert!(!origin_allowed("https://evil.example/x.github.io", &patterns()));
    }
}
