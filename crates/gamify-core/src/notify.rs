//! Best-effort user notifications. Delivery problems are the notifier's
//! concern; the engine never waits on or fails because of them.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationKind {
    LevelUp { new_level: u32, bonus_coins: i64 },
    MissionCompleted { mission_id: i64, name: String },
    AchievementUnlocked { achievement_id: i64, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub tenant_id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub kind: NotificationKind,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: &Notification) {
        tracing::info!(
            target: "gamify::notify",
            tenant_id = %n.tenant_id,
            user_id = %n.user_id,
            kind = ?n.kind,
            "notification queued"
        );
    }
}

#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, n: &Notification) {
        self.sent
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(n.clone());
    }
}
