//! Operation log capability.
//!
//! Handlers, services and repositories report noteworthy outcomes through
//! [`OperationLog`] instead of a process-wide logger. The process builds one
//! implementation at startup and hands out `Arc<dyn OperationLog>` clones:
//!
//! - [`TracingLog`] turns entries into `tracing` events;
//! - [`ElasticLog`] does the same and additionally queues warn/error/fatal
//!   entries for an [`ElasticShipper`], which indexes them into Elasticsearch;
//! - [`RecordingLog`] keeps entries in memory for tests.
//!
//! Logging is best-effort. Nothing here returns an error to the caller.

use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }

    /// Levels that leave the process and end up in the search index.
    pub fn is_shipped(&self) -> bool {
        matches!(self, LogLevel::Warn | LogLevel::Error | LogLevel::Fatal)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = std::convert::Infallible;

    /// Unknown names fall back to `info`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            "fatal" => LogLevel::Fatal,
            _ => LogLevel::Info,
        })
    }
}

pub trait OperationLog: Send + Sync {
    fn log(&self, entity: &str, level: LogLevel, message: &str);
}

/// Emits every entry as a `tracing` event carrying an `entity` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl OperationLog for TracingLog {
    fn log(&self, entity: &str, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => debug!(entity, "{}", message),
            LogLevel::Info => info!(entity, "{}", message),
            LogLevel::Warn => warn!(entity, "{}", message),
            LogLevel::Error => error!(entity, "{}", message),
            // never terminates the process
            LogLevel::Fatal => error!(entity, fatal = true, "{}", message),
        }
    }
}

/// Document layout written to the index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogDocument {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
    pub fields: LogFields,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogFields {
    pub entity: String,
    pub level: LogLevel,
}

impl LogDocument {
    pub fn new(entity: &str, level: LogLevel, message: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            level,
            message: message.to_string(),
            fields: LogFields { entity: entity.to_string(), level },
        }
    }
}

/// Tracing plus a bounded queue towards Elasticsearch.
///
/// When the queue is full the entry is dropped (it has already been written
/// to tracing), so a slow or unreachable index never stalls a request.
pub struct ElasticLog {
    local: TracingLog,
    tx: mpsc::Sender<LogDocument>,
}

impl ElasticLog {
    /// Returns the log handle and the shipper that must be spawned to drain it.
    pub fn new(base_url: &str, index: &str, buffer: usize) -> Result<(Self, ElasticShipper), ShipError> {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let endpoint = format!("{}/{}/_doc", base_url.trim_end_matches('/'), index);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok((Self { local: TracingLog, tx }, ElasticShipper { rx, client, endpoint }))
    }
}

impl OperationLog for ElasticLog {
    fn log(&self, entity: &str, level: LogLevel, message: &str) {
        self.local.log(entity, level, message);
        if !level.is_shipped() {
            return;
        }
        if let Err(e) = self.tx.try_send(LogDocument::new(entity, level, message)) {
            warn!(entity, error = %e, "operation log entry not queued for shipping");
        }
    }
}

#[derive(Debug, Error)]
pub enum ShipError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("index rejected document with status {0}")]
    Status(u16),
}

pub struct ElasticShipper {
    rx: mpsc::Receiver<LogDocument>,
    client: reqwest::Client,
    endpoint: String,
}

impl ElasticShipper {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Drains the queue until every [`ElasticLog`] handle is dropped.
    pub async fn run(mut self) {
        while let Some(doc) = self.rx.recv().await {
            if let Err(e) = self.ship(&doc).await {
                warn!(endpoint = %self.endpoint, error = %e, "failed to ship operation log entry");
            }
        }
        debug!(endpoint = %self.endpoint, "operation log shipper stopped");
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn ship(&self, doc: &LogDocument) -> Result<(), ShipError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .query(&[("refresh", "true")])
            .json(doc)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ShipError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub entity: String,
    pub level: LogLevel,
    pub message: String,
}

/// In-memory log used by tests to assert on what was reported.
#[derive(Debug, Default)]
pub struct RecordingLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLog {
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn for_entity(&self, entity: &str) -> Vec<LogEntry> {
        self.entries().into_iter().filter(|e| e.entity == entity).collect()
    }
}

impl OperationLog for RecordingLog {
    fn log(&self, entity: &str, level: LogLevel, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(LogEntry { entity: entity.to_string(), level, message: message.to_string() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::net::Ipv4Addr;
    use std::sync::Arc;

    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
        routing::post,
        Json, Router,
    };
    use tokio::net::TcpListener;

    type Seen = Arc<Mutex<Vec<(String, Option<String>, serde_json::Value)>>>;

    async fn capture(
        State(seen): State<Seen>,
        Path(index): Path<String>,
        Query(query): Query<HashMap<String, String>>,
        Json(doc): Json<serde_json::Value>,
    ) -> StatusCode {
        seen.lock().unwrap().push((index, query.get("refresh").cloned(), doc));
        StatusCode::CREATED
    }

    async fn start_index_stub() -> (String, Seen) {
        let seen: Seen = Arc::default();
        let app = Router::new().route("/:index/_doc", post(capture)).with_state(seen.clone());
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (format!("http://{addr}"), seen)
    }

    #[test]
    fn level_names_parse_with_info_fallback() {
        assert_eq!("error".parse::<LogLevel>().unwrap(), LogLevel::Error);
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("fatal".parse::<LogLevel>().unwrap(), LogLevel::Fatal);
        assert_eq!("verbose".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert!(!LogLevel::Info.is_shipped());
        assert!(LogLevel::Fatal.is_shipped());
    }

    #[test]
    fn recording_log_keeps_order_and_entity() {
        let log = RecordingLog::default();
        log.log("controller", LogLevel::Error, "parse: invalid price");
        log.log("repository", LogLevel::Warn, "delete product: no rows");
        assert_eq!(log.entries().len(), 2);
        let ctrl = log.for_entity("controller");
        assert_eq!(ctrl.len(), 1);
        assert_eq!(ctrl[0].message, "parse: invalid price");
    }

    #[tokio::test]
    async fn ships_only_warn_and_above() {
        let (url, seen) = start_index_stub().await;
        let (log, shipper) = ElasticLog::new(&url, "catering-test", 16).unwrap();
        assert_eq!(shipper.endpoint(), format!("{url}/catering-test/_doc"));

        log.log("repository", LogLevel::Error, "insert failed");
        log.log("controller", LogLevel::Info, "product added");
        drop(log);
        shipper.run().await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (index, refresh, doc) = &seen[0];
        assert_eq!(index, "catering-test");
        assert_eq!(refresh.as_deref(), Some("true"));
        assert_eq!(doc["level"], "error");
        assert_eq!(doc["message"], "insert failed");
        assert_eq!(doc["fields"]["entity"], "repository");
    }

    #[tokio::test]
    async fn full_queue_drops_without_blocking() {
        let (url, seen) = start_index_stub().await;
        let (log, shipper) = ElasticLog::new(&url, "catering-test", 1).unwrap();
        for i in 0..3 {
            log.log("repository", LogLevel::Error, &format!("failure {i}"));
        }
        drop(log);
        shipper.run().await;
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unreachable_index_is_not_fatal() {
        let (log, shipper) = ElasticLog::new("http://127.0.0.1:9", "catering-test", 4).unwrap();
        log.log("controller", LogLevel::Fatal, "service: database gone");
        drop(log);
        shipper.run().await;
    }
}
