pub mod books;

use axum::{middleware, routing::get, Json, Router};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::errors::{handle_panic, ApiError};
use crate::openapi::ApiDoc;
use crate::rate_limit::{enforce_rate_limit, RateLimiter};
use crate::state::ServerState;

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn fallback() -> ApiError {
    ApiError::not_found("Not found")
}

/// Build the application router with boundary layers applied.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let limiter = state.rate_limit.clone();
    with_boundary_layers(app_routes(state), cors, limiter)
}

/// Routes without boundary layers: health, docs, the book collection and the
/// JSON 404 fallback.
pub fn app_routes(state: ServerState) -> Router {
    let book_routes: Router<ServerState> = Router::new()
        .route("/books", get(books::list).post(books::create))
        .route("/books/:id", get(books::get).put(books::update).delete(books::delete));

    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(book_routes)
        .fallback(fallback)
        .with_state(state)
}

/// Tracing outermost, then CORS, then the rate limiter, then the panic
/// boundary closest to handlers.
pub fn with_boundary_layers(router: Router, cors: CorsLayer, limiter: RateLimiter) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    // 每次请求创建 span，包含方法和路径，级别 INFO
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    // 响应时记录状态码与耗时
                    .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                    .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
            )
            .layer(cors)
            .layer(middleware::from_fn_with_state(limiter, enforce_rate_limit))
            .layer(CatchPanicLayer::custom(handle_panic)),
    )
}
