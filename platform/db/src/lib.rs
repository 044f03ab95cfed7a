//! Connection settings and pool construction shared by the server and tests.

use std::{sync::Arc, time::Duration};

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Shared connection pool handle.
pub type DbPool = Arc<DatabaseConnection>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database url missing (set {0})")]
    MissingUrl(String),
    #[error("failed to connect: {0}")]
    Connect(#[from] DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Environment-driven connection settings.
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_url_key")]
    env_key: String,
    url: Option<String>,
    #[serde(default = "default_max_connections")]
    max_connections: u32,
}

fn default_url_key() -> String {
    "DATABASE_URL".to_string()
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            env_key: default_url_key(),
            url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl DatabaseSettings {
    /// Reads `DATABASE_URL` and `DATABASE_MAX_CONNECTIONS`.
    pub fn from_env() -> Self {
        let settings = Self::default();
        let url = std::env::var(&settings.env_key).ok();
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        Self {
            url,
            max_connections,
            ..settings
        }
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn database_url(&self) -> DbResult<&str> {
        self.url
            .as_deref()
            .ok_or_else(|| DbError::MissingUrl(self.env_key.clone()))
    }

    fn is_sqlite(&self) -> bool {
        self.url
            .as_deref()
            .map(|url| url.starts_with("sqlite:"))
            .unwrap_or(false)
    }
}

pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let url = settings.database_url()?;
    let mut options = ConnectOptions::new(url.to_string());
    // An in-memory SQLite database lives and dies with a single connection.
    let max_connections = if settings.is_sqlite() {
        1
    } else {
        settings.max_connections
    };
    options
        .max_connections(max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    let conn = Database::connect(options).await?;
    info!(
        backend = ?conn.get_database_backend(),
        max_connections,
        "database connected"
    );
    Ok(Arc::new(conn))
}

/// Round-trips a trivial statement; used by health checks.
pub async fn ping(pool: &DatabaseConnection) -> bool {
    let backend = pool.get_database_backend();
    pool.execute(Statement::from_string(backend, "SELECT 1".to_string()))
        .await
        .is_ok()
}
