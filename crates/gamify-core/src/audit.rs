//! Audit trail sink. Appends happen after commit and are fire-and-forget:
//! a failing sink is logged and never undoes the operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("audit encode error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: String,
    pub event_name: String,
    pub tenant_id: String,
    pub actor_id: Option<String>,
    pub target_id: String,
    pub xp: i64,
    pub coins: i64,
    pub reason: String,
    pub at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        event_name: &str,
        tenant_id: &str,
        actor_id: Option<&str>,
        target_id: &str,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            event_name: event_name.to_string(),
            tenant_id: tenant_id.to_string(),
            actor_id: actor_id.map(str::to_string),
            target_id: target_id.to_string(),
            xp: 0,
            coins: 0,
            reason: String::new(),
            at,
        }
    }

    pub fn with_amounts(mut self, xp: i64, coins: i64) -> Self {
        self.xp = xp;
        self.coins = coins;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }
}

pub trait AuditSink: Send + Sync {
    fn append(&self, event: &AuditEvent) -> Result<(), AuditError>;
}

/// Emits audit events as structured `tracing` records.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn append(&self, event: &AuditEvent) -> Result<(), AuditError> {
        tracing::info!(
            target: "gamify::audit",
            event_id = %event.event_id,
            event = %event.event_name,
            tenant_id = %event.tenant_id,
            actor_id = ?event.actor_id,
            target_id = %event.target_id,
            xp = event.xp,
            coins = event.coins,
            reason = %event.reason,
            "audit"
        );
        Ok(())
    }
}

/// Appends one JSON object per line.
pub struct JsonlAuditSink {
    file: Mutex<File>,
}

impl JsonlAuditSink {
    pub fn open(path: &Path) -> Result<Self, AuditError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for JsonlAuditSink {
    fn append(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');
        let mut file = self.file.lock().unwrap_or_else(|p| p.into_inner());
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

/// Keeps events in memory; useful for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.event_name).collect()
    }
}

impl AuditSink for MemoryAuditSink {
    fn append(&self, event: &AuditEvent) -> Result<(), AuditError> {
        self.events
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jsonl_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let sink = JsonlAuditSink::open(&path).unwrap();
        let now = Utc::now();
        sink.append(
            &AuditEvent::new("points_awarded", "acme", Some("admin"), "u1", now)
                .with_amounts(10, 2)
                .with_reason("demo"),
        )
        .unwrap();
        sink.append(&AuditEvent::new("reward_purchased", "acme", Some("u1"), "u1", now))
            .unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = raw.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: AuditEvent = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.event_name, "points_awarded");
        assert_eq!(first.xp, 10);
        assert_eq!(first.coins, 2);
    }

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemoryAuditSink::new();
        let now = Utc::now();
        sink.append(&AuditEvent::new("a", "t", None, "u", now)).unwrap();
        sink.append(&AuditEvent::new("b", "t", None, "u", now)).unwrap();
        assert_eq!(sink.names(), vec!["a".to_string(), "b".to_string()]);
    }
}
