use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use configs::RateLimitConfig;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::errors::ApiError;

#[derive(Debug)]
pub struct TokenBucket {
    capacity: u64,
    tokens: u64,
    refill_rate: u64, // tokens per second
    last_refill: Instant,
}

impl TokenBucket {
    pub fn new(capacity: u64, refill_rate: u64) -> Self {
        Self { capacity, tokens: capacity, refill_rate, last_refill: Instant::now() }
    }

    pub fn try_acquire(&mut self) -> bool {
        self.refill();
        if self.tokens == 0 {
            return false;
        }
        self.tokens -= 1;
        debug!(remaining = self.tokens, "rate limit token acquired");
        true
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        let tokens_to_add = (elapsed.as_secs_f64() * self.refill_rate as f64) as u64;
        // 不足一个令牌时 last_refill 保持不变
        if tokens_to_add > 0 {
            self.tokens = self.tokens.saturating_add(tokens_to_add).min(self.capacity);
            self.last_refill = now;
        }
    }
}

/// Process-wide token bucket shared by every request.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    bucket: Arc<Mutex<TokenBucket>>,
    enabled: bool,
}

impl RateLimiter {
    pub fn new(requests_per_second: u64, burst: u64, enabled: bool) -> Self {
        Self { bucket: Arc::new(Mutex::new(TokenBucket::new(burst, requests_per_second))), enabled }
    }

    pub fn from_config(cfg: &RateLimitConfig) -> Self {
        Self::new(cfg.requests_per_second, cfg.burst, cfg.enabled)
    }

    pub fn disabled() -> Self { Self::new(1, 1, false) }

    pub async fn check_rate_limit(&self) -> bool {
        if !self.enabled {
            return true;
        }
        self.bucket.lock().await.try_acquire()
    }
}

/// Middleware: 429 `{"error":"Too many requests"}` once the bucket is empty.
pub async fn enforce_rate_limit(State(limiter): State<RateLimiter>, req: Request, next: Next) -> Response {
    if limiter.check_rate_limit().await {
        return next.run(req).await;
    }
    warn!(event = "rate_limited", method = %req.method(), path = %req.uri().path(), "request rejected by rate limiter");
    ApiError::new(StatusCode::TOO_MANY_REQUESTS, "Too many requests").into_response()
}
