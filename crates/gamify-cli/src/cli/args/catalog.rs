//! Catalog administration and usage: missions, achievements, rewards.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use gamify_core::model::MissionType;

#[derive(clap::Args, Debug, Clone)]
pub struct MissionArgs {
    #[command(subcommand)]
    pub cmd: MissionSub,
}

#[derive(Subcommand, Debug, Clone)]
pub enum MissionSub {
    Create(MissionCreateArgs),
    /// Missions available to a user, grouped by type
    List {
        #[arg(long)]
        user: String,
    },
    /// Add progress toward a mission for the current cycle
    Complete {
        #[arg(long)]
        user: String,
        #[arg(long)]
        mission: i64,
        #[arg(long, default_value_t = 1)]
        amount: i64,
    },
    Disable {
        #[arg(long)]
        mission: i64,
    },
    Enable {
        #[arg(long)]
        mission: i64,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct MissionCreateArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub description: Option<String>,

    /// daily | weekly | monthly | one_time
    #[arg(long = "type")]
    pub mission_type: MissionType,

    #[arg(long)]
    pub target: i64,

    #[arg(long, default_value_t = 0)]
    pub xp: i64,

    #[arg(long, default_value_t = 0)]
    pub coins: i64,

    /// Business action that advances this mission automatically
    #[arg(long)]
    pub trigger: Option<String>,

    /// RFC 3339 start of the active window
    #[arg(long)]
    pub starts_at: Option<DateTime<Utc>>,

    /// RFC 3339 end of the active window
    #[arg(long)]
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct AchievementArgs {
    #[command(subcommand)]
    pub cmd: AchievementSub,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AchievementSub {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Criterion key matched on unlock (usually an action type)
        #[arg(long)]
        criteria: String,
        #[arg(long, default_value_t = 0)]
        xp: i64,
        #[arg(long, default_value_t = 0)]
        coins: i64,
        #[arg(long)]
        secret: bool,
    },
    List {
        #[arg(long)]
        user: String,
    },
    Unlock {
        #[arg(long)]
        user: String,
        #[arg(long)]
        criteria: String,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct RewardArgs {
    #[command(subcommand)]
    pub cmd: RewardSub,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RewardSub {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        cost: i64,
        /// Per-user purchase cap; unlimited when omitted
        #[arg(long)]
        max_per_user: Option<i64>,
    },
    List,
    Buy {
        #[arg(long)]
        user: String,
        #[arg(long)]
        reward: i64,
    },
    History {
        #[arg(long)]
        user: String,
    },
}
