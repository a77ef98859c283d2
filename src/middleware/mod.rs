// Axum middleware for the proxy

pub mod auth;
pub mod cors;
pub mod rate_limit;

pub use auth::auth_middleware;
pub use cors::cors_layer;
pub use rate_limit::{rate_limit_middleware, RateLimiter};
