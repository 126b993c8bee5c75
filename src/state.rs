use crate::config::AppConfig;
use anyhow::Context;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&config.database_url)
            .await
            .with_context(|| format!("connect to database {}", config.database_url))?;

        let state = Self::from_parts(db, config);
        state.migrate().await?;
        Ok(state)
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

#[cfg(test)]
impl AppState {
    /// Fresh in-memory database with the schema applied. A single pooled
    /// connection keeps the memory database alive for the whole test.
    pub async fn for_tests() -> Self {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        Self::with_test_config(db, "sqlite::memory:").await
    }

    /// File database shared by several pooled connections, for tests that
    /// need writers racing each other.
    pub async fn for_tests_on_file(path: &std::path::Path, max_connections: u32) -> Self {
        use sqlx::sqlite::SqliteConnectOptions;

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let db = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .expect("file sqlite");
        Self::with_test_config(db, &path.display().to_string()).await
    }

    async fn with_test_config(db: SqlitePool, database_url: &str) -> Self {
        use crate::config::SessionConfig;

        let config = Arc::new(AppConfig {
            database_url: database_url.into(),
            session: SessionConfig {
                secret: "test".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: 5,
                cookie_secure: false,
            },
            public_base_url: "http://localhost:8080".into(),
            reset_token_ttl_minutes: 60,
            tariff_inr_per_kwh: 8.0,
            static_dir: "static".into(),
        });

        let state = Self::from_parts(db, config);
        state.migrate().await.expect("migrations apply");
        state
    }
}
