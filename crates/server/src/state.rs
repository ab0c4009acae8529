use service::books::BookService;

use crate::rate_limit::RateLimiter;

/// Shared handler state, built once at startup and cloned per request.
#[derive(Clone)]
pub struct ServerState {
    pub books: BookService,
    pub rate_limit: RateLimiter,
}
