//! Domain types shared by the store and the engine operations.

use crate::errors::GamifyError;
use crate::level::LevelInfo;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ledger `action_type` tags written by the engine itself.
pub mod actions {
    pub const LEVEL_UP: &str = "level_up";
    pub const MISSION_COMPLETED: &str = "mission_completed";
    pub const ACHIEVEMENT_UNLOCKED: &str = "achievement_unlocked";
    pub const REWARD_PURCHASE: &str = "reward_purchase";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Member,
    Manager,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    /// Roles allowed to award points to other users.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::Manager | Self::Admin)
    }
}

impl FromStr for Role {
    type Err = GamifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" | "user" => Ok(Self::Member),
            "manager" => Ok(Self::Manager),
            "admin" => Ok(Self::Admin),
            other => Err(GamifyError::validation(format!("unknown role: {other}"))),
        }
    }
}

/// The user on whose behalf an operation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn member(user_id: impl Into<String>) -> Self {
        Self::new(user_id, Role::Member)
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self::new(user_id, Role::Admin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    Xp,
    Coins,
}

impl LedgerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xp => "xp",
            Self::Coins => "coins",
        }
    }
}

impl FromStr for LedgerKind {
    type Err = GamifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xp" => Ok(Self::Xp),
            "coins" => Ok(Self::Coins),
            other => Err(GamifyError::Database(format!("unknown ledger kind: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub tenant_id: String,
    pub user_id: String,
    pub total_xp: i64,
    pub current_level: u32,
    pub current_coins: i64,
    pub lifetime_coins: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileView {
    pub profile: Profile,
    pub level: LevelInfo,
}

/// Balances after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub total_xp: i64,
    pub current_level: u32,
    pub current_coins: i64,
    pub lifetime_coins: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub tenant_id: String,
    pub user_id: String,
    pub kind: LedgerKind,
    pub amount: i64,
    pub reason: String,
    pub action_type: String,
    pub awarded_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardRequest {
    pub tenant_id: String,
    /// `None` awards the actor themself.
    pub target_user_id: Option<String>,
    pub xp_amount: i64,
    pub coin_amount: i64,
    pub reason: String,
    pub action_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardOutcome {
    pub user_id: String,
    pub xp_awarded: i64,
    pub coins_awarded: i64,
    pub previous_level: u32,
    pub new_level: u32,
    pub leveled_up: bool,
    pub level_up_bonus: i64,
    pub totals: Totals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionType {
    Daily,
    Weekly,
    Monthly,
    OneTime,
}

impl MissionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::OneTime => "one_time",
        }
    }
}

impl fmt::Display for MissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissionType {
    type Err = GamifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "one_time" | "one-time" => Ok(Self::OneTime),
            other => Err(GamifyError::validation(format!(
                "unknown mission type: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub id: i64,
    pub tenant_id: String,
    pub name: String,
    pub description: Option<String>,
    pub mission_type: MissionType,
    pub target_count: i64,
    pub xp_reward: i64,
    pub coin_reward: i64,
    /// Business action that advances this mission automatically.
    pub trigger_action: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Mission {
    /// True when `now` falls inside the optional active window.
    pub fn window_contains(&self, now: DateTime<Utc>) -> bool {
        self.starts_at.map_or(true, |s| s <= now) && self.ends_at.map_or(true, |e| now <= e)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMission {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub mission_type: MissionType,
    pub target_count: i64,
    #[serde(default)]
    pub xp_reward: i64,
    #[serde(default)]
    pub coin_reward: i64,
    #[serde(default)]
    pub trigger_action: Option<String>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionStatus {
    pub mission: Mission,
    pub cycle_date: Option<NaiveDate>,
    pub current_count: i64,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub progress_percentage: f64,
    pub remaining_count: i64,
    pub can_complete: bool,
}

/// Missions available to a user, grouped by recurrence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionBoard {
    pub daily: Vec<MissionStatus>,
    pub weekly: Vec<MissionStatus>,
    pub monthly: Vec<MissionStatus>,
    pub one_time: Vec<MissionStatus>,
}

impl MissionBoard {
    pub fn len(&self) -> usize {
        self.daily.len() + self.weekly.len() + self.monthly.len() + self.one_time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &MissionStatus> {
        self.daily
            .iter()
            .chain(&self.weekly)
            .chain(&self.monthly)
            .chain(&self.one_time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionCompletion {
    pub mission_id: i64,
    pub progress: i64,
    pub target: i64,
    pub completed: bool,
    pub rewards_earned: Option<AwardOutcome>,
    pub cycle_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: i64,
    pub tenant_id: String,
    pub name: String,
    pub description: Option<String>,
    pub unlock_criteria: String,
    pub xp_reward: i64,
    pub coin_reward: i64,
    pub is_secret: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAchievement {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub unlock_criteria: String,
    #[serde(default)]
    pub xp_reward: i64,
    #[serde(default)]
    pub coin_reward: i64,
    #[serde(default)]
    pub is_secret: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementUnlock {
    pub achievement: Achievement,
    pub unlocked_at: DateTime<Utc>,
    /// `None` when the achievement carries no XP or coin reward.
    pub rewards: Option<AwardOutcome>,
}

/// Achievement as seen by one user. Locked secret achievements have their
/// name and description withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementStatus {
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_secret: bool,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
    pub xp_reward: i64,
    pub coin_reward: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardPeriod {
    #[default]
    AllTime,
    Monthly,
    Weekly,
}

impl LeaderboardPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllTime => "all_time",
            Self::Monthly => "monthly",
            Self::Weekly => "weekly",
        }
    }
}

impl FromStr for LeaderboardPeriod {
    type Err = GamifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all_time" | "all-time" | "all" => Ok(Self::AllTime),
            "monthly" | "month" => Ok(Self::Monthly),
            "weekly" | "week" => Ok(Self::Weekly),
            other => Err(GamifyError::validation(format!(
                "unknown leaderboard period: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Dense rank over `(total_xp, current_level)`.
    pub rank: u32,
    /// 1-based row position after the `updated_at` tiebreak.
    pub position: u32,
    pub user_id: String,
    pub total_xp: i64,
    pub current_level: u32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerRank {
    pub user_id: String,
    pub rank: u32,
    pub position: u32,
    pub total: u32,
    /// Share of ranked profiles strictly behind the viewer.
    pub percentile: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub period: LeaderboardPeriod,
    pub entries: Vec<LeaderboardEntry>,
    pub total_ranked: u32,
    pub viewer: Option<ViewerRank>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub id: i64,
    pub tenant_id: String,
    pub name: String,
    pub description: Option<String>,
    pub coin_cost: i64,
    /// `None` means unlimited.
    pub max_purchases_per_user: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReward {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub coin_cost: i64,
    #[serde(default)]
    pub max_purchases_per_user: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub purchase_id: i64,
    pub reward_id: i64,
    pub user_id: String,
    pub coin_cost_paid: i64,
    pub remaining_coins: i64,
    pub purchases_by_user: i64,
    pub purchased_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: i64,
    pub reward_id: i64,
    pub reward_name: String,
    pub coin_cost_paid: i64,
    pub purchased_at: DateTime<Utc>,
}

/// What a business event triggered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOutcome {
    pub action_type: String,
    pub award: Option<AwardOutcome>,
    pub missions: Vec<MissionCompletion>,
    pub achievement: Option<AchievementUnlock>,
}
