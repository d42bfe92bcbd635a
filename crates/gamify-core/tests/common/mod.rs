#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use gamify_core::audit::MemoryAuditSink;
use gamify_core::clock::ManualClock;
use gamify_core::model::{Actor, AwardOutcome, AwardRequest, LedgerEntry};
use gamify_core::notify::MemoryNotifier;
use gamify_core::{Engine, GamifyStore};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

pub const TENANT: &str = "acme";

/// Monday 2026-10-19 09:00 UTC.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()
}

pub struct Harness {
    pub engine: Engine,
    pub clock: Arc<ManualClock>,
    pub audit: Arc<MemoryAuditSink>,
    pub notifier: Arc<MemoryNotifier>,
}

pub fn harness() -> Harness {
    harness_with_store(GamifyStore::memory().unwrap())
}

pub fn harness_with_store(store: GamifyStore) -> Harness {
    let clock = Arc::new(ManualClock::new(t0()));
    let audit = Arc::new(MemoryAuditSink::new());
    let notifier = Arc::new(MemoryNotifier::new());
    let engine = Engine::new(store)
        .with_clock(clock.clone())
        .with_audit(audit.clone())
        .with_notifier(notifier.clone());
    Harness {
        engine,
        clock,
        audit,
        notifier,
    }
}

pub fn self_award(engine: &Engine, user: &str, xp: i64, coins: i64) -> AwardOutcome {
    engine
        .award_points(
            &Actor::member(user),
            &AwardRequest {
                tenant_id: TENANT.to_string(),
                target_user_id: None,
                xp_amount: xp,
                coin_amount: coins,
                reason: "test".to_string(),
                action_type: "manual".to_string(),
            },
        )
        .unwrap()
}

pub fn all_ledger(engine: &Engine, user: &str) -> Vec<LedgerEntry> {
    engine.ledger_history(TENANT, user, 10_000).unwrap()
}

/// In-memory sink for JSON log lines emitted on the current thread.
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl LogCapture {
    /// Parsed JSON log lines captured so far.
    pub fn lines(&self) -> Vec<serde_json::Value> {
        let raw = String::from_utf8(self.buf.lock().unwrap().clone()).unwrap();
        raw.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).expect("log line must be JSON"))
            .collect()
    }

    /// Captured lines whose message equals `message`.
    pub fn with_message(&self, message: &str) -> Vec<serde_json::Value> {
        self.lines()
            .into_iter()
            .filter(|v| v["fields"]["message"] == message)
            .collect()
    }
}

pub fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_max_level(tracing::Level::DEBUG)
        .json()
        .finish();
    (capture, tracing::subscriber::set_default(subscriber))
}
