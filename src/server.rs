// Axum server - state, routing and lifecycle

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::{AppConfig, CredentialSet};
use crate::handlers;
use crate::middleware::{auth_middleware, cors_layer, rate_limit_middleware, RateLimiter};
use crate::providers::ProviderRegistry;
use crate::upstream::UpstreamClient;

/// Shared application state; everything request handlers need, built
/// once at startup. Cloning is cheap (Arcs and a Copy instant).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub credentials: Arc<CredentialSet>,
    pub providers: Arc<ProviderRegistry>,
    pub upstream: Arc<UpstreamClient>,
    pub limiter: Arc<RateLimiter>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let credentials = Arc::new(config.credential_set());
        let providers = Arc::new(ProviderRegistry::from_config(&config));
        let upstream = Arc::new(UpstreamClient::new(config.upstream_timeout_secs));
        let limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));
        Self {
            config: Arc::new(config),
            credentials,
            providers,
            upstream,
            limiter,
            started_at: Instant::now(),
        }
    }
}

/// Route table. The rate limiter covers the whole `/api` scope; the API
/// key gate only the chat adapters and the key-validation endpoint.
pub fn build_router(state: AppState) -> Router {
    let gated = Router::new()
        .route("/openrouter", post(handlers::chat::openrouter))
        .route("/gemini", post(handlers::chat::gemini))
        .route("/deepseek", post(handlers::chat::deepseek))
        .route("/keys/validate", post(handlers::keys::validate))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let open = Router::new()
        .route("/health", get(handlers::system::health))
        .route("/stats", get(handlers::system::stats))
        .route("/krea", post(handlers::krea::generate_stub))
        .route("/verify-google", post(handlers::google::verify_google_stub));

    let api = gated
        .merge(open)
        .layer(from_fn_with_state(state.clone(), rate_limit_middleware));

    Router::new()
        .nest("/api", api)
        .fallback(handlers::system::endpoint_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.allowed_origins))
        .with_state(state)
}

/// Running server handle; dropping the sender stops nothing, call
/// `stop` for a graceful shutdown.
pub struct AxumServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl AxumServer {
    pub async fn start(config: AppConfig) -> anyhow::Result<(Self, tokio::task::JoinHandle<()>)> {
        let state = AppState::new(config);
        let addr = state.config.bind_address();

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind address {}", addr))?;
        info!("MultiplesIA proxy listening on http://{}", addr);

        // Reclaim rate-limit buckets of idle clients once per window.
        let limiter = state.limiter.clone();
        let sweep_every = limiter.window();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(sweep_every);
            tick.tick().await; // first tick fires immediately
            loop {
                tick.tick().await;
                limiter.purge_expired();
            }
        });

        let app = build_router(state);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let serve = axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Proxy server stopped listening");
            });

            if let Err(e) = serve.await {
                error!("Server error: {}", e);
            }
        });

        Ok((Self { shutdown_tx: Some(shutdown_tx) }, handle))
    }

    pub fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
