use std::net::SocketAddr;

use axum::{routing::get, Router};
use configs::{AppConfig, StoreBackend};
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::{rate_limit::RateLimiter, routes, startup};

struct TestApp {
    base_url: String,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn spawn_router(app: Router) -> anyhow::Result<TestApp> {
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });
    Ok(TestApp { base_url: format!("http://{}:{}", addr.ip(), addr.port()) })
}

async fn start_with(cfg: AppConfig) -> anyhow::Result<TestApp> {
    let state = startup::build_state(&cfg).await?;
    spawn_router(routes::build_router(state, CorsLayer::very_permissive())).await
}

async fn start_server() -> anyhow::Result<TestApp> {
    start_with(AppConfig::default()).await
}

fn temp_dir(tag: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("bookshelf-{tag}-{}", Uuid::new_v4()))
}

async fn error_message(res: reqwest::Response) -> anyhow::Result<String> {
    let body: Value = res.json().await?;
    Ok(body["error"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn e2e_health_and_openapi() -> anyhow::Result<()> {
    let app = start_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(app.url("/health")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({"status": "ok"}));

    let res = client.get(app.url("/api-docs/openapi.json")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let doc: Value = res.json().await?;
    assert!(doc["paths"]["/books/{id}"].is_object());
    Ok(())
}

#[tokio::test]
async fn e2e_book_lifecycle() -> anyhow::Result<()> {
    let app = start_server().await?;
    let client = reqwest::Client::new();

    let res = client.post(app.url("/books")).json(&json!({"title": "Dune", "author": "Herbert"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    assert_eq!(res.json::<Value>().await?, json!({"id": 1, "title": "Dune", "author": "Herbert"}));

    let res = client.get(app.url("/books/1")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["title"], "Dune");

    let res = client
        .put(app.url("/books/1"))
        .json(&json!({"title": "Dune Messiah", "author": "Herbert"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({"id": 1, "title": "Dune Messiah", "author": "Herbert"}));

    let res = client.delete(app.url("/books/1")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    assert!(res.bytes().await?.is_empty());

    let res = client.get(app.url("/books/1")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    assert_eq!(error_message(res).await?, "Book not found");

    let res = client.delete(app.url("/books/1")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_list_is_ordered_and_ids_ignored() -> anyhow::Result<()> {
    let app = start_server().await?;
    let client = reqwest::Client::new();

    for title in ["A", "B", "C"] {
        let res = client
            .post(app.url("/books"))
            .json(&json!({"id": 42, "title": title, "author": "X"}))
            .send()
            .await?;
        assert_eq!(res.status(), HttpStatusCode::CREATED);
    }
    client.delete(app.url("/books/2")).send().await?;

    let books: Vec<Value> = client.get(app.url("/books")).send().await?.json().await?;
    let ids: Vec<i64> = books.iter().filter_map(|b| b["id"].as_i64()).collect();
    assert_eq!(ids, vec![1, 3]);

    let res = client.post(app.url("/books")).json(&json!({"title": "D", "author": "X"})).send().await?;
    assert_eq!(res.json::<Value>().await?["id"], 4);
    Ok(())
}

#[tokio::test]
async fn e2e_validation_failure_leaves_collection_untouched() -> anyhow::Result<()> {
    let app = start_server().await?;
    let client = reqwest::Client::new();

    let res = client.post(app.url("/books")).json(&json!({"title": "", "author": "Herbert"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert!(error_message(res).await?.contains("title"));

    let res = client
        .post(app.url("/books"))
        .json(&json!({"title": " ", "author": "", "year": 99, "isbn": "12"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let msg = error_message(res).await?;
    for field in ["title", "author", "isbn", "year"] {
        assert!(msg.contains(field), "missing {field} in {msg}");
    }

    let books: Vec<Value> = client.get(app.url("/books")).send().await?.json().await?;
    assert!(books.is_empty());
    Ok(())
}

#[tokio::test]
async fn e2e_rejects_bad_requests_before_the_store() -> anyhow::Result<()> {
    let app = start_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(app.url("/books"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(error_message(res).await?, "Invalid request body");

    let res = client.get(app.url("/books/abc")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(error_message(res).await?, "Invalid book id");

    let res = client.put(app.url("/books/1.5")).json(&json!({"title": "A", "author": "B"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let res = client.get(app.url("/books/-1")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let res = client.get(app.url("/authors")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    assert_eq!(error_message(res).await?, "Not found");

    let res = client.put(app.url("/books/7")).json(&json!({"title": "", "author": ""})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_update_merges_optional_fields() -> anyhow::Result<()> {
    let app = start_server().await?;
    let client = reqwest::Client::new();

    client
        .post(app.url("/books"))
        .json(&json!({"title": "Dune", "author": "Herbert", "isbn": "0441172717", "year": 1965}))
        .send()
        .await?;

    let res = client
        .put(app.url("/books/1"))
        .json(&json!({"title": "Dune", "author": "Frank Herbert", "year": 1966}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(
        res.json::<Value>().await?,
        json!({"id": 1, "title": "Dune", "author": "Frank Herbert", "isbn": "0441172717", "year": 1966})
    );
    Ok(())
}

#[tokio::test]
async fn e2e_panicking_handler_returns_500_and_server_survives() -> anyhow::Result<()> {
    let state = startup::build_state(&AppConfig::default()).await?;
    let router = routes::app_routes(state).route(
        "/boom",
        get(|| async {
            if true {
                panic!("handler blew up");
            }
            "unreachable"
        }),
    );
    let app = spawn_router(routes::with_boundary_layers(router, CorsLayer::very_permissive(), RateLimiter::disabled())).await?;
    let client = reqwest::Client::new();

    let res = client.get(app.url("/boom")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_message(res).await?, "Internal server error");

    let res = client.get(app.url("/health")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn e2e_snapshot_survives_restart() -> anyhow::Result<()> {
    let dir = temp_dir("snapshot");
    let mut cfg = AppConfig::default();
    cfg.store.snapshot_path = Some(dir.join("books.json").to_string_lossy().into_owned());
    let client = reqwest::Client::new();

    let first = start_with(cfg.clone()).await?;
    client.post(first.url("/books")).json(&json!({"title": "Dune", "author": "Herbert"})).send().await?;

    let second = start_with(cfg).await?;
    let books: Vec<Value> = client.get(second.url("/books")).send().await?.json().await?;
    assert_eq!(books, vec![json!({"id": 1, "title": "Dune", "author": "Herbert"})]);

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}

#[tokio::test]
async fn e2e_database_backend_on_sqlite() -> anyhow::Result<()> {
    let dir = temp_dir("sqlite");
    std::fs::create_dir_all(&dir)?;
    let mut cfg = AppConfig::default();
    cfg.store.backend = StoreBackend::Database;
    cfg.database.url = format!("sqlite://{}?mode=rwc", dir.join("books.db").display());
    cfg.database.max_connections = 2;
    let app = start_with(cfg).await?;
    let client = reqwest::Client::new();

    let res = client
        .post(app.url("/books"))
        .json(&json!({"title": "Dune", "author": "Herbert", "year": 1965}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    assert_eq!(res.json::<Value>().await?, json!({"id": 1, "title": "Dune", "author": "Herbert", "year": 1965}));

    let res = client.delete(app.url("/books/1")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    let res = client.get(app.url("/books/1")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}

#[tokio::test]
async fn e2e_rate_limit_rejects_requests_beyond_burst() -> anyhow::Result<()> {
    let mut cfg = AppConfig::default();
    cfg.rate_limit.enabled = true;
    cfg.rate_limit.requests_per_second = 1;
    cfg.rate_limit.burst = 2;
    let app = start_with(cfg).await?;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let res = client.get(app.url("/books")).send().await?;
        assert_eq!(res.status(), HttpStatusCode::OK);
    }
    let res = client.get(app.url("/books")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::TOO_MANY_REQUESTS);
    assert_eq!(error_message(res).await?, "Too many requests");
    Ok(())
}
