use std::collections::HashSet;
use std::env;
use std::str::FromStr;

/// Runtime mode. Development relaxes the API-key gate so the frontend
/// demo can talk to a local proxy without configured keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// `APP_ENV` wins; `NODE_ENV` is honored for parity with the previous
    /// deployment so existing env files keep working.
    fn from_env() -> Self {
        let raw = env::var("APP_ENV")
            .or_else(|_| env::var("NODE_ENV"))
            .unwrap_or_else(|_| "development".to_string());
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_permissive(self) -> bool {
        matches!(self, Self::Development)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Window length in seconds.
    pub window_secs: u64,
    /// Requests allowed per client IP inside one window.
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 15 * 60,
            max_requests: 100,
        }
    }
}

/// Immutable process configuration, built once in `main` and passed into
/// the server state. Nothing outside this module reads `std::env`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub environment: Environment,
    /// Provider keys; empty string when unset so a misconfigured proxy
    /// still boots and surfaces the failure as an upstream 401.
    pub openrouter_api_key: String,
    pub gemini_api_key: String,
    pub deepseek_api_key: String,
    pub allowed_origins: Vec<String>,
    pub rate_limit: RateLimitConfig,
    pub upstream_timeout_secs: u64,
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:8000".to_string(),
        "http://127.0.0.1:8000".to_string(),
        "https://ingenieriaartistica369.github.io".to_string(),
        "https://*.github.io".to_string(),
    ]
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            environment: Environment::Development,
            openrouter_api_key: String::new(),
            gemini_api_key: String::new(),
            deepseek_api_key: String::new(),
            allowed_origins: default_allowed_origins(),
            rate_limit: RateLimitConfig::default(),
            upstream_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let allowed_origins = match env::var("ALLOWED_ORIGINS") {
            Ok(raw) => raw
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            Err(_) => defaults.allowed_origins,
        };

        Self {
            port: env_or("PORT", defaults.port),
            environment: Environment::from_env(),
            openrouter_api_key: env::var("OPENROUTER_API_KEY").unwrap_or_default(),
            gemini_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            deepseek_api_key: env::var("DEEPSEEK_API_KEY").unwrap_or_default(),
            allowed_origins,
            rate_limit: RateLimitConfig {
                window_secs: env_or("RATE_LIMIT_WINDOW_SECS", defaults.rate_limit.window_secs),
                max_requests: env_or("RATE_LIMIT_MAX_REQUESTS", defaults.rate_limit.max_requests),
            },
            upstream_timeout_secs: env_or("UPSTREAM_TIMEOUT_SECS", defaults.upstream_timeout_secs),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// The inbound-caller allow-list is derived from the configured
    /// provider keys, mirroring how the portal hands its users the same
    /// keys it proxies with.
    pub fn credential_set(&self) -> CredentialSet {
        CredentialSet::from_keys([
            self.openrouter_api_key.as_str(),
            self.gemini_api_key.as_str(),
            self.deepseek_api_key.as_str(),
        ])
    }
}

/// Set of valid caller credentials, fixed for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct CredentialSet {
    keys: HashSet<String>,
}

impl CredentialSet {
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            keys: keys
                .into_iter()
                .filter(|key| !key.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_set_skips_unset_keys() {
        let config = AppConfig {
            openrouter_api_key: "sk-or-1".to_string(),
            ..AppConfig::default()
        };
        let creds = config.credential_set();
        assert!(creds.contains("sk-or-1"));
        assert!(!creds.contains(""));
        assert!(!creds.contains("sk-other"));
    }

    #[test]
    fn credential_set_empty_when_nothing_configured() {
        assert!(AppConfig::default().credential_set().is_empty());
    }

    #[test]
    fn default_rate_limit_matches_deployment() {
        let limits = RateLimitConfig::default();
        assert_eq!(limits.window_secs, 900);
        assert_eq!(limits.max_requests, 100);
    }
}
