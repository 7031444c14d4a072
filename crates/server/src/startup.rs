use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;

use common::oplog::{ElasticLog, OperationLog, TracingLog};
use configs::{AppConfig, LogFormat, LoggingConfig};
use migration::MigratorTrait;
use service::auth::HttpTokenIssuer;
use tokio::task::JoinHandle;
use tracing::info;

use crate::routes;
use crate::state::AppState;

pub fn init_logging(cfg: &LoggingConfig) {
    common::utils::logging::init_logging(cfg.format == LogFormat::Json);
}

/// Elasticsearch shipping when configured, plain tracing otherwise. The
/// returned handle belongs to the shipper task, if one was started.
pub fn build_oplog(cfg: &LoggingConfig) -> anyhow::Result<(Arc<dyn OperationLog>, Option<JoinHandle<()>>)> {
    match &cfg.elastic_url {
        Some(url) => {
            let (log, shipper) = ElasticLog::new(url, &cfg.elastic_index, cfg.elastic_buffer)
                .context("building elasticsearch client")?;
            info!(endpoint = %shipper.endpoint(), "shipping operation log to elasticsearch");
            Ok((Arc::new(log), Some(shipper.spawn())))
        }
        None => Ok((Arc::new(TracingLog), None)),
    }
}

/// Connect, migrate, and serve until the listener fails.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let (oplog, _shipper) = build_oplog(&cfg.logging)?;

    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await?;
    info!("database migrations applied");

    let issuer = HttpTokenIssuer::new(cfg.auth.token_url.clone(), Duration::from_secs(cfg.auth.timeout_secs))?;
    let state = AppState::new(db, oplog, Arc::new(issuer));
    let app = routes::build_router(state, Duration::from_secs(cfg.server.request_timeout_secs));

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting catering admin server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shipper_started_only_when_index_configured() -> anyhow::Result<()> {
        let (_, handle) = build_oplog(&LoggingConfig::default())?;
        assert!(handle.is_none());

        let cfg = LoggingConfig { elastic_url: Some("http://127.0.0.1:9".into()), ..LoggingConfig::default() };
        let (log, handle) = build_oplog(&cfg)?;
        log.log("startup", common::LogLevel::Warn, "shipper attached");
        let handle = handle.expect("shipper task spawned");
        assert!(!handle.is_finished());
        handle.abort();
        Ok(())
    }
}
