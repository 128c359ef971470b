use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::debug;

use configs::DatabaseConfig;

pub const IN_MEMORY_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Build pool options from config.
///
/// An in-memory SQLite database lives and dies with its connection, so the
/// pool is pinned to exactly one connection that never idles out. An open
/// transaction holds that connection, and any other caller waits for it to
/// finish; the acquire timeout is capped at [`IN_MEMORY_ACQUIRE_TIMEOUT`] so
/// such a wait fails fast instead of stalling.
pub fn connect_options(cfg: &DatabaseConfig) -> ConnectOptions {
    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .sqlx_logging(cfg.sqlx_logging);
    if cfg.is_in_memory_sqlite() {
        let acquire = Duration::from_secs(cfg.acquire_timeout_secs).min(IN_MEMORY_ACQUIRE_TIMEOUT);
        opts.max_connections(1).min_connections(1).acquire_timeout(acquire);
    } else {
        opts.max_connections(cfg.max_connections)
            .min_connections(cfg.min_connections)
            .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs));
    }
    opts
}

pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let opts = connect_options(cfg);
    debug!(max_connections = ?opts.get_max_connections(), "connecting database");
    let db = Database::connect(opts).await?;
    Ok(db)
}
