
use sea_orm::DatabaseConnection;

use crate::db::{connect_with_config, migrate, DatabaseConfig};

/// Fresh SQLite database file with migrations applied.
pub async fn setup_test_db() -> anyhow::Result<DatabaseConnection> {
    let path = std::env::temp_dir().join(format!("models_books_{}.db", uuid::Uuid::new_v4()));
    let cfg = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        max_connections: 1,
        ..DatabaseConfig::default()
    };
    let db = connect_with_config(&cfg).await?;
    migrate(&db).await?;
    Ok(db)
}
