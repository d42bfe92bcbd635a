use crate::errors::GamifyError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GamifyConfig {
    /// SQLite database file.
    pub database: PathBuf,

    pub cache: CacheConfig,

    pub leaderboard: LeaderboardConfig,

    pub audit: AuditConfig,

    /// Fixed XP/coin grants per business action (e.g. `lead_created`).
    pub event_rewards: BTreeMap<String, EventReward>,
}

impl Default for GamifyConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("gamify.db"),
            cache: CacheConfig::default(),
            leaderboard: LeaderboardConfig::default(),
            audit: AuditConfig::default(),
            event_rewards: default_event_rewards(),
        }
    }
}

impl GamifyConfig {
    pub fn load(path: &Path) -> Result<Self, GamifyError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| GamifyError::Config(format!("{}: {e}", path.display())))?;
        Self::from_yaml(&raw)
            .map_err(|e| GamifyError::Config(format!("{}: {e}", path.display())))
    }

    /// Like [`GamifyConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, GamifyError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_yaml(raw: &str) -> Result<Self, GamifyError> {
        let cfg: Self =
            serde_yaml::from_str(raw).map_err(|e| GamifyError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), GamifyError> {
        if self.leaderboard.default_limit == 0
            || self.leaderboard.default_limit > self.leaderboard.max_limit
        {
            return Err(GamifyError::Config(format!(
                "leaderboard.default_limit must be in 1..={}",
                self.leaderboard.max_limit
            )));
        }
        for (action, reward) in &self.event_rewards {
            if reward.xp < 0 || reward.coins < 0 {
                return Err(GamifyError::Config(format!(
                    "event_rewards.{action}: amounts must be non-negative"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_seconds: u64,
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 120,
            max_entries: 10_000,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LeaderboardConfig {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct AuditConfig {
    /// Append audit events as JSON lines here; unset logs them via tracing.
    pub jsonl_path: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct EventReward {
    #[serde(default)]
    pub xp: i64,
    #[serde(default)]
    pub coins: i64,
}

pub fn default_event_rewards() -> BTreeMap<String, EventReward> {
    [
        ("lead_created", 10, 1),
        ("client_created", 25, 5),
        ("sale_closed", 50, 10),
        ("ticket_closed", 15, 2),
        ("daily_login", 5, 1),
    ]
    .into_iter()
    .map(|(action, xp, coins)| (action.to_string(), EventReward { xp, coins }))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let cfg = GamifyConfig::from_yaml("{}").unwrap();
        assert_eq!(cfg, GamifyConfig::default());
        assert_eq!(cfg.cache.ttl_seconds, 120);
        assert_eq!(cfg.event_rewards["sale_closed"], EventReward { xp: 50, coins: 10 });
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let cfg = GamifyConfig::from_yaml(
            r#"
database: /var/lib/crm/gamify.db
cache:
  ttl_seconds: 30
event_rewards:
  demo_booked: { xp: 20 }
"#,
        )
        .unwrap();
        assert_eq!(cfg.database, PathBuf::from("/var/lib/crm/gamify.db"));
        assert_eq!(cfg.cache.ttl_seconds, 30);
        assert!(cfg.cache.enabled);
        assert_eq!(cfg.leaderboard.max_limit, 100);
        assert_eq!(cfg.event_rewards.len(), 1);
        assert_eq!(cfg.event_rewards["demo_booked"], EventReward { xp: 20, coins: 0 });
    }

    #[test]
    fn negative_event_reward_is_rejected() {
        let err = GamifyConfig::from_yaml("event_rewards:\n  x: { xp: -1 }\n").unwrap_err();
        assert!(matches!(err, GamifyError::Config(_)));
    }

    #[test]
    fn default_limit_above_max_is_rejected() {
        let err = GamifyConfig::from_yaml("leaderboard: { default_limit: 500 }\n").unwrap_err();
        assert!(matches!(err, GamifyError::Config(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = GamifyConfig::load_or_default(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(cfg, GamifyConfig::default());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gamify.yaml");
        std::fs::write(&path, "leaderboard: { default_limit: 25 }\n").unwrap();
        let cfg = GamifyConfig::load(&path).unwrap();
        assert_eq!(cfg.leaderboard.default_limit, 25);
    }
}
