use config::Config;
use log::*;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::sync::Arc;
use tokio::time::Duration;

pub mod config;
pub mod logging;

/// PostgreSQL schema holding every core_db table, including the session store.
pub const SCHEMA: &str = "core_db";

/// Connects the pool described by `config`, with `core_db` as the search path.
pub async fn init_database(config: &Config) -> Result<DatabaseConnection, DbErr> {
    debug!(
        "Connecting database pool (max {}, min {}, acquire timeout {}s)",
        config.db_max_connections, config.db_min_connections, config.db_acquire_timeout_secs,
    );

    let mut options = ConnectOptions::new(config.database_url());
    options
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .connect_timeout(Duration::from_secs(config.db_connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime_secs))
        .sqlx_logging(config.log_level_filter >= LevelFilter::Debug)
        .sqlx_logging_level(LevelFilter::Debug)
        .set_schema_search_path(SCHEMA);

    let db = Database::connect(options).await?;
    info!("Connected to database with search path '{SCHEMA}'");

    Ok(db)
}

/// Shared handler state: the connection pool plus the configuration that the
/// integration adapters and session layer read from.
#[derive(Clone)]
pub struct AppState {
    pub database_connection: Arc<DatabaseConnection>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, db: &Arc<DatabaseConnection>) -> Self {
        Self {
            database_connection: Arc::clone(db),
            config,
        }
    }

    pub fn db_conn_ref(&self) -> &DatabaseConnection {
        self.database_connection.as_ref()
    }
}
