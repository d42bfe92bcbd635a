use clap::{Parser, Subcommand};
use gamify_core::model::{LeaderboardPeriod, Role};
use std::path::PathBuf;

pub mod catalog;
pub mod common;
pub use catalog::*;
pub use common::*;

#[derive(Parser)]
#[command(
    name = "gamify",
    version,
    about = "Gamification engine for the CRM suite: XP, levels, coins, missions, achievements, leaderboards and rewards"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GlobalArgs {
    /// YAML config file; defaults apply when it does not exist
    #[arg(long, global = true, env = "GAMIFY_CONFIG", default_value = "gamify.yaml")]
    pub config: PathBuf,

    /// SQLite database path (overrides `database` from the config)
    #[arg(long, global = true, env = "GAMIFY_DB")]
    pub db: Option<PathBuf>,

    #[arg(long, global = true, env = "GAMIFY_TENANT", default_value = "default")]
    pub tenant: String,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the database schema (and optionally a starter config)
    Init(InitArgs),
    /// Provision, inspect or archive user profiles
    Profile(ProfileArgs),
    /// Award XP and/or coins
    Award(AwardArgs),
    /// Mission catalog and progress
    Mission(MissionArgs),
    /// Achievement catalog and unlocks
    Achievement(AchievementArgs),
    /// Tenant leaderboard
    Leaderboard(LeaderboardArgs),
    /// Reward catalog and purchases
    Reward(RewardArgs),
    /// Recent ledger entries for a user
    Ledger(LedgerArgs),
    /// Record a business event (lead_created, ticket_closed, ...)
    Event(EventArgs),
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct InitArgs {
    /// Also write a starter config to --config if it does not exist
    #[arg(long)]
    pub write_config: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub cmd: ProfileSub,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProfileSub {
    Provision {
        #[arg(long)]
        user: String,
    },
    Show {
        #[arg(long)]
        user: String,
    },
    Archive {
        #[arg(long)]
        user: String,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct AwardArgs {
    /// User performing the award
    #[arg(long)]
    pub actor: String,

    /// Role of the actor: member | manager | admin
    #[arg(long, default_value = "member")]
    pub role: Role,

    /// Recipient; defaults to the actor
    #[arg(long)]
    pub user: Option<String>,

    #[arg(long, default_value_t = 0)]
    pub xp: i64,

    #[arg(long, default_value_t = 0)]
    pub coins: i64,

    #[arg(long)]
    pub reason: String,

    #[arg(long = "action", default_value = "manual_award")]
    pub action_type: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct LeaderboardArgs {
    /// all_time | monthly | weekly
    #[arg(long, default_value = "all_time")]
    pub period: LeaderboardPeriod,

    #[arg(long)]
    pub limit: Option<u32>,

    /// Also report this user's rank when they are off the page
    #[arg(long)]
    pub viewer: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct LedgerArgs {
    #[arg(long)]
    pub user: String,

    #[arg(long, default_value_t = 20)]
    pub limit: u32,
}

#[derive(clap::Args, Debug, Clone)]
pub struct EventArgs {
    #[arg(long)]
    pub user: String,

    #[arg(long = "action")]
    pub action_type: String,
}

#[cfg(test)]
mod tests;
