// Per-IP rate limiter (fixed window)

use dashmap::DashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::config::RateLimitConfig;
use crate::error::ProxyError;
use crate::server::AppState;

#[derive(Debug, Clone, Copy)]
struct WindowSlot {
    window_start: Instant,
    count: u32,
}

/// Fixed-window counter per client IP. The window resets lazily on the
/// first request after it elapses; `purge_expired` reclaims buckets of
/// clients that stopped calling.
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    buckets: DashMap<IpAddr, WindowSlot>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            buckets: DashMap::new(),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(Duration::from_secs(config.window_secs), config.max_requests)
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Counts one request for `ip`; true while the window budget holds.
    pub fn check(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut slot = self.buckets.entry(ip).or_insert(WindowSlot {
            window_start: now,
            count: 0,
        });
        if now.duration_since(slot.window_start) >= self.window {
            slot.window_start = now;
            slot.count = 0;
        }
        slot.count += 1;
        slot.count <= self.max_requests
    }

    /// Drops buckets whose window has fully elapsed.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.buckets
            .retain(|_, slot| now.duration_since(slot.window_start) < self.window);
    }

    #[cfg(test)]
    fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

/// Middleware on everything under `/api`.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ProxyError> {
    let ip = client_ip(&request);
    if !state.limiter.check(ip) {
        tracing::warn!("Rate limit exceeded for {}", ip);
        return Err(ProxyError::RateLimited);
    }
    Ok(next.run(request).await)
}

/// Edge deployments (Vercel/Railway) put the real client address in
/// x-forwarded-for; fall back to the socket peer.
fn client_ip(request: &Request) -> IpAddr {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
    {
        if let Some(ip) = forwarded
            .split(',')
            .next()
            .and_then(|first| first.trim().parse().ok())
        {
            return ip;
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn allows_up_to_cap_then_rejects() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 3);
        for _ in 0..3 {
            assert!(limiter.check(ip(1)));
        }
        assert!(!limiter.check(ip(1)));
        assert!(!limiter.check(ip(1)));
    }

    #[test]
    fn counters_are_per_ip() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        assert!(limiter.check(ip(1)));
        assert!(!limiter.check(ip(1)));
        assert!(limiter.check(ip(2)));
    }

    #[test]
    fn window_elapse_resets_the_count() {
        let limiter = RateLimiter::new(Duration::from_millis(80), 2);
        assert!(limiter.check(ip(1)));
        assert!(limiter.check(ip(1)));
        assert!(!limiter.check(ip(1)));

        sleep(Duration::from_millis(100));
        assert!(limiter.check(ip(1)));
    }

    #[test]
    fn purge_drops_only_expired_buckets() {
        let limiter = RateLimiter::new(Duration::from_millis(80), 5);
        limiter.check(ip(1));
        sleep(Duration::from_millis(100));
        limiter.check(ip(2));

        limiter.purge_expired();
        assert_eq!(limiter.bucket_count(), 1);
    }
}
