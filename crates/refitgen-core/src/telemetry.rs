//! Usage and error telemetry.
//!
//! Records are local only. [`RefitgenTelemetry`] appends one JSON object per
//! line to a daily file under `~/.refitgen/telemetry`. Nothing is uploaded.

// Internal imports (std, crate)
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::{
    error::{Error, Result},
    request::GenerationRequest,
};

// External imports (alphabetized)
use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

/// Setting this variable (to any value) disables telemetry
pub const TELEMETRY_DISABLED_ENV: &str = "REFITGEN_TELEMETRY_DISABLED";

/// Receives the outcome of a generation run
#[async_trait]
pub trait Telemetry: Send + Sync {
    /// Record a successful run and the options it used
    async fn log_feature_usage(&self, request: &GenerationRequest) -> Result<()>;

    /// Record a failed run
    async fn log_error(&self, error: &Error, request: &GenerationRequest) -> Result<()>;
}

/// Telemetry that records nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

#[async_trait]
impl Telemetry for NoopTelemetry {
    async fn log_feature_usage(&self, _request: &GenerationRequest) -> Result<()> {
        Ok(())
    }

    async fn log_error(&self, _error: &Error, _request: &GenerationRequest) -> Result<()> {
        Ok(())
    }
}

/// True when telemetry was switched off through the environment
pub fn disabled_by_env() -> bool {
    std::env::var_os(TELEMETRY_DISABLED_ENV).is_some()
}

/// A telemetry record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// Event ID
    pub id: String,

    pub event_type: EventType,

    pub timestamp: DateTime<Utc>,

    /// Identifies the invocation the event belongs to
    pub session_id: String,

    pub properties: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    FeatureUsage,
    Error,
}

impl TelemetryEvent {
    /// Create an event carrying host information
    pub fn new(event_type: EventType, session_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_type,
            timestamp: Utc::now(),
            session_id: session_id.into(),
            properties: BTreeMap::new(),
        }
        .with_property("os", std::env::consts::OS)
        .with_property("arch", std::env::consts::ARCH)
        .with_property("refitgen_version", env!("CARGO_PKG_VERSION"))
    }

    /// Add a property to the event
    #[must_use]
    pub fn with_property<T: Serialize>(mut self, key: &str, value: T) -> Self {
        let value = serde_json::to_value(value).unwrap_or_else(|e| {
            log::debug!("Failed to serialize telemetry property '{key}': {e}");
            serde_json::Value::String("[SERIALIZATION_ERROR]".to_string())
        });
        self.properties.insert(key.to_string(), value);
        self
    }
}

/// Writes telemetry events to daily JSONL files
#[derive(Debug, Clone)]
pub struct RefitgenTelemetry {
    log_dir: PathBuf,
    session_id: String,
    started: Instant,
}

impl Default for RefitgenTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl RefitgenTelemetry {
    /// Log to `~/.refitgen/telemetry`
    pub fn new() -> Self {
        let log_dir = dirs::home_dir()
            .map(|home| home.join(".refitgen").join("telemetry"))
            .unwrap_or_else(|| PathBuf::from(".refitgen").join("telemetry"));
        Self::with_directory(log_dir)
    }

    /// Log to `log_dir`
    pub fn with_directory(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            session_id: Uuid::new_v4().to_string(),
            started: Instant::now(),
        }
    }

    pub fn log_directory(&self) -> &Path {
        &self.log_dir
    }

    fn event(&self, event_type: EventType, request: &GenerationRequest) -> TelemetryEvent {
        TelemetryEvent::new(event_type, self.session_id.clone())
            .with_property("support_key", support_key())
            .with_property("duration_ms", self.started.elapsed().as_millis() as u64)
            .with_property("request", request)
    }

    /// Append `event` to today's log file
    pub async fn log(&self, event: &TelemetryEvent) -> Result<()> {
        fs::create_dir_all(&self.log_dir).await?;

        let date = Local::now().format("%Y-%m-%d");
        let log_file = self.log_dir.join(format!("{date}.jsonl"));

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .await?;

        let mut line = serde_json::to_string(event)?;
        line.push('\n');
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        log::debug!("Recorded {:?} event in {}", event.event_type, log_file.display());
        Ok(())
    }
}

#[async_trait]
impl Telemetry for RefitgenTelemetry {
    async fn log_feature_usage(&self, request: &GenerationRequest) -> Result<()> {
        self.log(&self.event(EventType::FeatureUsage, request)).await
    }

    async fn log_error(&self, error: &Error, request: &GenerationRequest) -> Result<()> {
        let event = self
            .event(EventType::Error, request)
            .with_property("error_kind", error.kind())
            .with_property("error_message", error.to_string())
            .with_property("exit_code", error.exit_code());
        self.log(&event).await
    }
}

/// Short identifier of the current user and machine, quoted in bug reports
pub fn support_key() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());
    support_key_for(&user, &host_name())
}

/// First seven hex digits of the name-based UUID of `user@host`
pub fn support_key_for(user: &str, host: &str) -> String {
    let id = Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{user}@{host}").as_bytes());
    id.simple().to_string()[..7].to_string()
}

fn host_name() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .ok()
        .or_else(|| {
            std::fs::read_to_string("/etc/hostname")
                .ok()
                .map(|name| name.trim().to_string())
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn read_events(dir: &Path) -> Vec<TelemetryEvent> {
        let mut events = Vec::new();
        let mut entries = fs::read_dir(dir).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            let content = fs::read_to_string(entry.path()).await.unwrap();
            for line in content.lines() {
                events.push(serde_json::from_str(line).unwrap());
            }
        }
        events
    }

    #[test]
    fn test_support_key_is_stable() {
        let key = support_key_for("alice", "build-01");
        assert_eq!(key.len(), 7);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key, support_key_for("alice", "build-01"));
        assert_ne!(key, support_key_for("bob", "build-01"));
    }

    #[test]
    fn test_event_has_host_properties() {
        let event = TelemetryEvent::new(EventType::FeatureUsage, "session")
            .with_property("answer", 42);
        assert_eq!(event.session_id, "session");
        assert_eq!(event.properties["os"], std::env::consts::OS);
        assert_eq!(event.properties["answer"], 42);
    }

    #[tokio::test]
    async fn test_feature_usage_is_appended() {
        let dir = tempdir().unwrap();
        let telemetry = RefitgenTelemetry::with_directory(dir.path().join("telemetry"));
        let mut request = GenerationRequest::new("petstore.json");
        request.interface_only = true;

        telemetry.log_feature_usage(&request).await.unwrap();
        telemetry.log_feature_usage(&request).await.unwrap();

        let events = read_events(telemetry.log_directory()).await;
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.event_type == EventType::FeatureUsage));
        assert_eq!(events[0].session_id, events[1].session_id);
        assert_ne!(events[0].id, events[1].id);
        assert_eq!(events[0].properties["request"]["input"], "petstore.json");
        assert_eq!(events[0].properties["request"]["interface_only"], true);
    }

    #[tokio::test]
    async fn test_error_event_carries_error_detail() {
        let dir = tempdir().unwrap();
        let telemetry = RefitgenTelemetry::with_directory(dir.path());
        let request = GenerationRequest::new("petstore.json");

        telemetry
            .log_error(&Error::openapi("Missing 'paths' object"), &request)
            .await
            .unwrap();

        let events = read_events(dir.path()).await;
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.event_type, EventType::Error);
        assert_eq!(event.properties["error_kind"], "openapi");
        assert_eq!(event.properties["exit_code"], 65);
        assert_eq!(
            event.properties["error_message"],
            "OpenAPI error: Missing 'paths' object"
        );
    }

    #[tokio::test]
    async fn test_unwritable_directory_reports_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").await.unwrap();

        let telemetry = RefitgenTelemetry::with_directory(blocker.join("telemetry"));
        let result = telemetry
            .log_feature_usage(&GenerationRequest::new("petstore.json"))
            .await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
