use std::sync::Arc;

use anyhow::Context;
use common::metrics::{encode_metrics, PrometheusCounterSink};
use common::utils::logging::init_logging;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use prometheus::Registry;
use service::cake::{repo::SeaOrmCakeRepository, CakeService};
use tracing::{debug, error, info};

/// Prefer config.toml; fall back to environment-only settings when it is absent.
fn load_config() -> anyhow::Result<AppConfig> {
    match AppConfig::load_and_validate() {
        Ok(cfg) => Ok(cfg),
        Err(file_err) => {
            let cfg = AppConfig::from_env()
                .with_context(|| format!("no usable config file ({file_err}) and environment is incomplete"))?;
            Ok(cfg)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = load_config()?;
    init_logging(&cfg.logging);

    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await.context("apply migrations")?;
    info!("database ready");

    let registry = Registry::new();
    let counters = Arc::new(PrometheusCounterSink::new(&registry, &cfg.metrics.namespace)?);
    let cakes = CakeService::new(Arc::new(SeaOrmCakeRepository::new(db)), counters);

    let list = cakes.list().await.inspect_err(|e| error!(error = %e, code = e.code(), "cannot list cakes"))?;
    info!(count = list.len(), "cake catalogue loaded");

    debug!(metrics = %encode_metrics(&registry)?, "metrics snapshot");
    Ok(())
}
