#![cfg(test)]
use sea_orm::DatabaseConnection;
use models::db::{connect_with_config, migrate, DatabaseConfig};

/// Fresh, migrated SQLite database per test so ids start at 1 and tests never
/// see each other's rows.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let path = std::env::temp_dir().join(format!("service_books_{}.db", uuid::Uuid::new_v4()));
    let cfg = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        max_connections: 4,
        min_connections: 1,
        acquire_timeout_secs: 10,
        ..DatabaseConfig::default()
    };
    let db = connect_with_config(&cfg).await?;
    migrate(&db).await?;
    Ok(db)
}
