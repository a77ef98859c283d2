// Shared outbound HTTP client

use reqwest::Client;
use std::time::Duration;

/// One `reqwest::Client` for every provider call, carrying the global
/// per-request timeout. Adapters compose their own requests on top of it
/// so auth placement (bearer header vs. query key) stays per-provider.
pub struct UpstreamClient {
    http: Client,
}

impl UpstreamClient {
    pub fn new(timeout_secs: u64) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("multiplesia-proxy/", env!("CARGO_PKG_VERSION")))
            .build()
            // Builder only fails on TLS backend misconfiguration; fall
            // back to a default client rather than dying at startup.
            .unwrap_or_else(|_| Client::new());

        Self { http }
    }

    pub fn http(&self) -> &Client {
        &self.http
    }
}
