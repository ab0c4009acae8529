use std::{net::SocketAddr, path::Path, sync::Arc};

use configs::{AppConfig, StoreBackend};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use service::books::{BookRepository, BookRules, BookService, InMemoryBookStore, SeaOrmBookRepository};
use service::runtime;

use crate::rate_limit::RateLimiter;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Pick the book store named by `[store]` and wire it with the configured year range.
async fn build_repository(cfg: &AppConfig) -> anyhow::Result<Arc<dyn BookRepository>> {
    let rules = BookRules::new(cfg.books.min_year, cfg.books.max_year);
    match cfg.store.backend {
        StoreBackend::Memory => match &cfg.store.snapshot_path {
            Some(path) => {
                runtime::ensure_data_dir(Path::new(path)).await?;
                let store = InMemoryBookStore::with_snapshot(path.as_str(), rules).await?;
                info!(backend = "memory", snapshot = %path, "book store ready");
                Ok(Arc::new(store))
            }
            None => {
                info!(backend = "memory", "book store ready (volatile)");
                Ok(Arc::new(InMemoryBookStore::new(rules)))
            }
        },
        StoreBackend::Database => {
            let db = models::db::connect_with_config(&cfg.database).await?;
            models::db::migrate(&db).await?;
            info!(backend = "database", "book store ready");
            Ok(Arc::new(SeaOrmBookRepository::new(db, rules)))
        }
    }
}

/// Build the shared handler state from configuration.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<ServerState> {
    let repo = build_repository(cfg).await?;
    let rate_limit = RateLimiter::from_config(&cfg.rate_limit);
    if cfg.rate_limit.enabled {
        info!(
            requests_per_second = cfg.rate_limit.requests_per_second,
            burst = cfg.rate_limit.burst,
            "rate limiting enabled"
        );
    }
    Ok(ServerState { books: BookService::new(repo), rate_limit })
}

fn load_bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(event = "signal_error", error = %e, "failed to listen for Ctrl+C");
        return;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, draining connections");
}

/// Serve an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: ServerState, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = routes::build_router(state, build_cors());
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}

/// Public entry: build the store, bind, and serve until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg).await?;
    let addr = load_bind_addr(&cfg)?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "starting bookshelf server");
    serve(listener, state, shutdown_signal()).await
}
